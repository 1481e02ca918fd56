//! Native-messaging host loop: framed JSON over stdin/stdout.
//!
//! Chrome's native messaging frames every message with a 4-byte
//! little-endian length prefix. The host answers each download event with a
//! verdict; malformed frames get an `allow` response with an error message so
//! one bad frame never kills the channel. EOF on the reader ends the loop.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::intercept::{Decision, DownloadEvent, Interceptor};

/// Upper bound on one incoming frame. The browser side never sends more than
/// a header dump; anything bigger is a framing error.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostRequest {
    Download(DownloadEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResponse {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read one length-prefixed frame. `Ok(None)` on end of stream.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e).context("read frame length"),
    }
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_FRAME_BYTES {
        anyhow::bail!("frame of {len} bytes exceeds limit");
    }
    let mut body = vec![0u8; len as usize];
    reader
        .read_exact(&mut body)
        .await
        .context("read frame body")?;
    Ok(Some(body))
}

/// Write one length-prefixed JSON response.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &HostResponse,
) -> Result<()> {
    let body = serde_json::to_vec(response).context("serialize host response")?;
    writer
        .write_all(&(body.len() as u32).to_le_bytes())
        .await
        .context("write frame length")?;
    writer.write_all(&body).await.context("write frame body")?;
    writer.flush().await.context("flush host response")?;
    Ok(())
}

/// Serve download events until the reader reaches EOF.
pub async fn run_host<R, W>(
    interceptor: &Interceptor<'_>,
    reader: &mut R,
    writer: &mut W,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = read_frame(reader).await? {
        let response = match serde_json::from_slice::<HostRequest>(&frame) {
            Ok(HostRequest::Download(event)) => {
                let outcome = interceptor.handle(&event);
                HostResponse {
                    decision: outcome.decision,
                    command: outcome.command,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!("unreadable host frame, answering allow: {err}");
                HostResponse {
                    decision: Decision::Allow,
                    command: None,
                    error: Some(err.to_string()),
                }
            }
        };
        write_response(writer, &response).await?;
    }
    tracing::debug!("host channel closed");
    Ok(())
}
