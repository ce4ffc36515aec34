// ABOUTME: Splits a SQL byte stream into ';'-terminated statements
// ABOUTME: Ignores semicolons inside quotes and comments; drops line comments

use crate::error::SqlDumpError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    BlockComment,
}

/// Pulls one statement at a time from an async reader
///
/// A statement ends at the first `;` outside string literals, quoted
/// identifiers and comments. `--` and `#` line comments are removed;
/// `/* ... */` comments are kept because MySQL executes `/*! ... */`
/// blocks. Inside `'` and `"` strings a backslash escapes the next byte,
/// as in the server's default lexer, so `SHOW CREATE TABLE` text such as
/// `COMMENT 'it\'s'` stays in one piece. Backticks have no escapes.
pub struct StatementReader<R> {
    reader: R,
    line: String,
    pos: usize,
    current: String,
    state: ScanState,
    has_content: bool,
}

impl<R: AsyncBufRead + Unpin> StatementReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
            current: String::new(),
            state: ScanState::Normal,
            has_content: false,
        }
    }

    /// Next statement including its terminating `;`, or `None` at end of input
    ///
    /// Trailing whitespace and comments after the last statement are
    /// accepted. Any other text left without a terminating `;` is an error.
    pub async fn next_statement(&mut self) -> Result<Option<String>, SqlDumpError> {
        loop {
            if self.pos >= self.line.len() {
                self.line.clear();
                self.pos = 0;
                let read = self.reader.read_line(&mut self.line).await?;
                if read == 0 {
                    return self.finish();
                }
            }
            if let Some(statement) = self.scan_line() {
                return Ok(Some(statement));
            }
        }
    }

    fn finish(&mut self) -> Result<Option<String>, SqlDumpError> {
        let leftover = std::mem::take(&mut self.current);
        if self.has_content {
            self.has_content = false;
            let preview: String = leftover.trim().chars().take(80).collect();
            return Err(SqlDumpError::MalformedStatement(format!(
                "unterminated statement at end of input: {}",
                preview
            )));
        }
        Ok(None)
    }

    fn scan_line(&mut self) -> Option<String> {
        let bytes = self.line.as_bytes();
        let start = self.pos;
        let mut i = self.pos;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();
            match self.state {
                ScanState::Normal => match b {
                    b'\'' => {
                        self.state = ScanState::SingleQuote;
                        self.has_content = true;
                    }
                    b'"' => {
                        self.state = ScanState::DoubleQuote;
                        self.has_content = true;
                    }
                    b'`' => {
                        self.state = ScanState::Backtick;
                        self.has_content = true;
                    }
                    b'-' if next == Some(b'-')
                        && bytes
                            .get(i + 2)
                            .map_or(true, |c| c.is_ascii_whitespace()) =>
                    {
                        return self.skip_line_comment(start, i);
                    }
                    b'#' => return self.skip_line_comment(start, i),
                    b'/' if next == Some(b'*') => {
                        self.state = ScanState::BlockComment;
                        self.has_content = true;
                        i += 1;
                    }
                    b';' => {
                        self.current.push_str(&self.line[start..=i]);
                        self.pos = i + 1;
                        self.has_content = false;
                        return Some(std::mem::take(&mut self.current));
                    }
                    b if !b.is_ascii_whitespace() => self.has_content = true,
                    _ => {}
                },
                ScanState::SingleQuote | ScanState::DoubleQuote if b == b'\\' => {
                    // Skip the escaped byte
                    i += 1;
                }
                ScanState::SingleQuote => {
                    if b == b'\'' {
                        self.state = ScanState::Normal;
                    }
                }
                ScanState::DoubleQuote => {
                    if b == b'"' {
                        self.state = ScanState::Normal;
                    }
                }
                ScanState::Backtick => {
                    if b == b'`' {
                        self.state = ScanState::Normal;
                    }
                }
                ScanState::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        self.state = ScanState::Normal;
                        i += 1;
                    }
                }
            }
            i += 1;
        }

        self.current.push_str(&self.line[start..]);
        self.pos = self.line.len();
        None
    }

    /// Keep the text before a line comment and drop the rest of the line
    fn skip_line_comment(&mut self, start: usize, comment_at: usize) -> Option<String> {
        self.current.push_str(&self.line[start..comment_at]);
        self.current.push('\n');
        self.pos = self.line.len();
        None
    }
}

/// Strip leading newlines and surrounding whitespace
pub fn trim_statement(statement: &str) -> &str {
    statement.trim_start_matches('\n').trim()
}
