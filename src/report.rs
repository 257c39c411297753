//! Rendering of outcome lines and draining a dispatch stream into a sink.
//!
//! Both the command path (stdout) and the server path (response body) go
//! through [`render`], so the line format is identical on either side.

use clap::ValueEnum;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::request::Dispatched;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// `Response from …` / `Error … for …` lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text/plain; charset=utf-8",
            OutputFormat::Json => "application/x-ndjson",
        }
    }
}

/// One newline-terminated line for `dispatched`.
pub fn render(dispatched: &Dispatched, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{}\n", dispatched),
        OutputFormat::Json => format!("{}\n", dispatched.to_json()),
    }
}

/// Write every outcome to `sink` as it arrives. Returns the number written.
pub async fn write_report<S, W>(stream: S, sink: &mut W, format: OutputFormat) -> std::io::Result<usize>
where
    S: Stream<Item = Dispatched>,
    W: AsyncWrite + Unpin,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0;
    while let Some(dispatched) = stream.next().await {
        sink.write_all(render(&dispatched, format).as_bytes()).await?;
        sink.flush().await?;
        written += 1;
    }
    Ok(written)
}
