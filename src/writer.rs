// ABOUTME: Streams formatted statements from the row loop to a background sink task
// ABOUTME: A single capacity-1 channel carries data and the completion marker in order

use crate::error::SqlDumpError;
use crate::sink::BufferedSink;
use anyhow::{Context, Result};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum WriterMessage {
    Data(String),
    Done,
}

/// Producer handle for the background sink writer
///
/// Text sent with [`RowWriter::send`] is written in send order. Because the
/// completion marker travels on the same channel as the data, the consumer
/// can only reach the final flush after writing everything sent before
/// [`RowWriter::finish`].
pub struct RowWriter<W> {
    tx: mpsc::Sender<WriterMessage>,
    task: JoinHandle<Result<BufferedSink<W>, SqlDumpError>>,
}

impl<W> RowWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Spawn the consumer task, which takes ownership of `sink`
    pub fn start(sink: BufferedSink<W>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(drain(sink, rx));
        Self { tx, task }
    }

    /// Hand one chunk of text to the consumer
    ///
    /// Waits while the previous chunk is still in the channel.
    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .send(WriterMessage::Data(text.into()))
            .await
            .map_err(|_| anyhow::anyhow!("Sink writer stopped before all rows were sent"))
    }

    /// Signal completion and wait for the flushed sink
    ///
    /// If the consumer already failed, its error is returned here.
    pub async fn finish(self) -> Result<BufferedSink<W>> {
        // A send failure means the consumer exited early; its result below says why.
        let _ = self.tx.send(WriterMessage::Done).await;
        drop(self.tx);

        let sink = self
            .task
            .await
            .context("Sink writer task panicked")?
            .context("Failed to write dump output")?;
        Ok(sink)
    }
}

async fn drain<W>(
    mut sink: BufferedSink<W>,
    mut rx: mpsc::Receiver<WriterMessage>,
) -> Result<BufferedSink<W>, SqlDumpError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        match message {
            WriterMessage::Data(text) => {
                if let Err(e) = sink.write(&text).await {
                    // Keep whatever reached the sink so far
                    let _ = sink.flush().await;
                    return Err(SqlDumpError::Io(e));
                }
            }
            WriterMessage::Done => break,
        }
    }
    // Reached on Done, or when every sender was dropped without it
    sink.flush().await?;
    Ok(sink)
}
