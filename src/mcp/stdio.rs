//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! stdout carries protocol frames only; logging goes to stderr.

use crate::mcp::server::{Exchange, McpServer};
use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Serve until `reader` reaches EOF or the writer fails. Requests are handled
/// concurrently; each exchange is written as a contiguous block of lines.
pub async fn serve<R, W>(server: McpServer, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<String>>();

    let read_loop = async move {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = tokio::select! {
                read = reader.read_until(b'\n', &mut buf) => read?,
                _ = tx.closed() => {
                    tracing::warn!("Output closed, no longer reading requests");
                    break;
                }
            };
            if read == 0 {
                tracing::info!("stdin closed, shutting down");
                break;
            }

            let line = match String::from_utf8(std::mem::take(&mut buf)) {
                Ok(line) => line,
                Err(e) => {
                    if tx.send(Exchange::parse_error(e).into_frames()).is_err() {
                        break;
                    }
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let server = server.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let frames = server.handle_message(&line).await.into_frames();
                if !frames.is_empty() && tx.send(frames).is_err() {
                    tracing::debug!("Dropping reply, output is closed");
                }
            });
        }
        // in-flight tasks hold their own senders; the write loop ends after the last one
        Ok::<(), std::io::Error>(())
    };

    let write_loop = async move {
        while let Some(frames) = rx.recv().await {
            for frame in frames {
                writer.write_all(frame.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            writer.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (read, write) = tokio::join!(read_loop, write_loop);
    write?;
    read?;
    Ok(())
}

pub async fn serve_stdio(server: McpServer) -> Result<()> {
    tracing::info!("Serving MCP over stdio");
    serve(server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
