//! Public share link for the local UI.
//!
//! The tunnel itself is an external program; this module only spawns it and
//! reports the public URL it prints.

use log::{debug, error, info, warn};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

const TUNNEL_PROGRAM: &str = "cloudflared";

/// Runs the tunnel client for the lifetime of the process.
///
/// Failure to start or an early exit is not fatal: the UI stays reachable
/// locally either way.
pub async fn share_task(local_addr: &str) {
    let url = format!("http://{local_addr}");

    let mut child = match Command::new(TUNNEL_PROGRAM)
        .args(["tunnel", "--url", url.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!("could not start {TUNNEL_PROGRAM} (is it installed?): {e}");
            return;
        }
    };

    // cloudflared announces the assigned hostname on stderr.
    let stderr = child.stderr.take().expect("stderr should be piped");
    let mut lines = BufReader::new(stderr).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(share_url) = extract_share_url(&line) {
            info!("public share link: {share_url}");
        } else {
            debug!("tunnel: {line}");
        }
    }

    match child.wait().await {
        Ok(status) => warn!("tunnel client exited ({status}), the UI is only reachable locally"),
        Err(e) => error!("failed to wait for tunnel client: {e}"),
    }
}

/// Picks the public tunnel URL out of one line of client output.
fn extract_share_url(line: &str) -> Option<&str> {
    let start = line.find("https://")?;
    let rest = &line[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '|')
        .unwrap_or(rest.len());
    let url = &rest[..end];

    url.contains("trycloudflare.com").then_some(url)
}
