//! Line-delimited JSON transport
//!
//! One JSON object per line in both directions: [`SessionCommand`]s in,
//! [`Frame`]s out. Lines that fail to parse are answered with a
//! `bad_command` rejection instead of ending the stream.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::pacer::Frame;
use crate::session::SessionCommand;

pub const BAD_COMMAND: &str = "bad_command";

/// Serialize a frame as one newline-terminated line
pub fn encode_frame(frame: &Frame) -> Result<String> {
    let mut line = serde_json::to_string(frame).context("encoding frame")?;
    line.push('\n');
    Ok(line)
}

/// Parse one command line; surrounding whitespace is ignored
pub fn decode_command(line: &str) -> Result<SessionCommand> {
    serde_json::from_str(line.trim()).with_context(|| format!("decoding command {:?}", line.trim()))
}

/// Forward commands read from `reader` until EOF or a closed session
///
/// Returns the number of commands forwarded.
pub async fn read_commands<R>(
    reader: R,
    commands: mpsc::Sender<SessionCommand>,
    frames: mpsc::Sender<Frame>,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await.context("reading command line")? {
        if line.trim().is_empty() {
            continue;
        }
        match decode_command(&line) {
            Ok(cmd) => {
                if commands.send(cmd).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "unparseable command");
                let frame = Frame::Rejected {
                    code: BAD_COMMAND.to_string(),
                    message: format!("{err:#}"),
                };
                if frames.send(frame).await.is_err() {
                    break;
                }
            }
        }
    }
    Ok(forwarded)
}

/// Spawn a task writing every frame to `writer` as a JSON line
///
/// The task ends when all frame senders are dropped; it yields the number
/// of lines written.
pub fn spawn_writer<W>(mut writer: W, mut frames: mpsc::Receiver<Frame>) -> JoinHandle<Result<u64>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut written = 0;
        while let Some(frame) = frames.recv().await {
            let line = encode_frame(&frame)?;
            writer.write_all(line.as_bytes()).await.context("writing frame")?;
            writer.flush().await.context("flushing frame")?;
            written += 1;
        }
        Ok(written)
    })
}
