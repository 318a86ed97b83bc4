//! Send a command to mpv over its JSON IPC socket.

use crate::config::{CommonArgs, ToolboxConfig};
use crate::utils::error::{Result, ToolError};
use clap::Parser;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

#[derive(Debug, Clone, Parser)]
#[command(name = "mpv-ipc", about = "Send a command to a running mpv instance")]
pub struct MpvIpcArgs {
    /// mpv command and its arguments, e.g. `cycle pause`
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub command: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Serialize)]
pub struct MpvRequest<'a> {
    pub command: &'a [String],
    pub request_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct MpvReply {
    #[serde(default)]
    pub request_id: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

pub async fn run(args: MpvIpcArgs, config: ToolboxConfig) -> Result<()> {
    let socket = &config.media.mpv_socket;
    if !socket.exists() {
        return Err(ToolError::not_found(format!(
            "mpv control socket {}",
            socket.display()
        )));
    }

    let stream = UnixStream::connect(socket).await?;
    let request_id = rand::thread_rng().gen_range(0..=1024);

    for reply in exchange(stream, &args.command, request_id).await? {
        println!("reply: {}", reply);
    }
    Ok(())
}

/// Write the request, half-close, read until EOF and return the `error`
/// field of every reply matching `request_id`.
pub async fn exchange<S>(mut stream: S, command: &[String], request_id: u32) -> Result<Vec<String>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_string(&MpvRequest {
        command,
        request_id,
    })?;
    payload.push('\n');

    stream.write_all(payload.as_bytes()).await?;
    stream.shutdown().await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;

    parse_replies(&String::from_utf8_lossy(&raw), request_id)
}

/// mpv interleaves events with replies; only matching replies are kept.
pub fn parse_replies(raw: &str, request_id: u32) -> Result<Vec<String>> {
    let mut replies = Vec::new();
    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        let reply: MpvReply = serde_json::from_str(line)?;
        if reply.request_id == Some(request_id) {
            replies.push(reply.error.unwrap_or_else(|| "unknown".to_string()));
        }
    }
    Ok(replies)
}
