// ABOUTME: Fixed-capacity output buffer in front of any async writer
// ABOUTME: Flushes before a write that would overflow the remaining capacity

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Default buffer capacity: 1 MiB
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// Buffered destination for rendered dump text
///
/// Small writes are collected in memory and handed to the inner writer
/// only when the next write would not fit, or on [`BufferedSink::flush`].
/// Async writers cannot flush on drop, so owners must call `flush` on every
/// exit path.
pub struct BufferedSink<W> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin> BufferedSink<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
            bytes_written: 0,
        }
    }

    /// Bytes still free in the buffer
    pub fn available(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Bytes accepted so far, buffered or not
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Buffer `text`, flushing first when it does not fit
    ///
    /// Text larger than the whole buffer goes straight to the inner writer
    /// once the buffer has been drained.
    pub async fn write(&mut self, text: &str) -> std::io::Result<usize> {
        let bytes = text.as_bytes();
        if self.available() < bytes.len() {
            self.flush_buffer().await?;
        }
        if bytes.len() > self.capacity {
            self.inner.write_all(bytes).await?;
        } else {
            self.buffer.extend_from_slice(bytes);
        }
        self.bytes_written += bytes.len() as u64;
        Ok(bytes.len())
    }

    /// Push buffered bytes to the inner writer and flush it
    ///
    /// Calling this with an empty buffer is harmless.
    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.flush_buffer().await?;
        self.inner.flush().await
    }

    async fn flush_buffer(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush and hand back the inner writer
    pub async fn into_inner(mut self) -> std::io::Result<W> {
        self.flush().await?;
        Ok(self.inner)
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}
