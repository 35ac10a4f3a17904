use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::types::UpdateEvent;

/// Longest field line kept; anything past it is dropped up to the next line ending.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Incremental Server-Sent Events decoder.
///
/// Lines end on `\r\n`, `\n` or a lone `\r`. Only `data:` fields matter
/// here; `event:`, `id:`, `retry:` and comment lines are dropped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: String,
    after_cr: bool,
    oversized: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every payload completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut messages = Vec::new();

        for &byte in chunk {
            // The `\n` of a `\r\n` pair, possibly split across chunks.
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }

            match byte {
                b'\r' | b'\n' => {
                    self.after_cr = byte == b'\r';
                    if let Some(message) = self.end_line() {
                        messages.push(message);
                    }
                }
                _ if self.oversized => {}
                _ if self.line.len() >= MAX_LINE_BYTES => {
                    warn!("Dropping stream line longer than {} bytes", MAX_LINE_BYTES);
                    self.line.clear();
                    self.oversized = true;
                }
                _ => self.line.push(byte),
            }
        }

        messages
    }

    fn end_line(&mut self) -> Option<String> {
        if std::mem::take(&mut self.oversized) {
            return None;
        }
        let line = String::from_utf8_lossy(&self.line).into_owned();
        self.line.clear();
        self.process_line(&line)
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let mut message = std::mem::take(&mut self.data);
            message.pop();
            return Some(message);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data.push_str(value);
            self.data.push('\n');
        }

        None
    }
}

/// Listener for the dashboard push channel. Reconnects forever until the
/// receiving side is dropped or the task is aborted.
pub struct EventStream {
    client: Client,
    url: String,
    reconnect_delay: Duration,
}

impl EventStream {
    pub fn new(client: Client, url: String, reconnect_delay: Duration) -> Self {
        Self {
            client,
            url,
            reconnect_delay,
        }
    }

    pub fn spawn(self) -> (mpsc::Receiver<UpdateEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(256);

        let handle = tokio::spawn(async move {
            loop {
                match self.run_connection(&tx).await {
                    Ok(_) => warn!("Event stream closed, reconnecting..."),
                    Err(e) => error!("Event stream error: {}, reconnecting...", e),
                }

                if tx.is_closed() {
                    debug!("Event receiver dropped, stopping stream listener");
                    break;
                }
                tokio::time::sleep(self.reconnect_delay).await;
            }
        });

        (rx, handle)
    }

    async fn run_connection(&self, tx: &mpsc::Sender<UpdateEvent>) -> Result<()> {
        let resp = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("stream returned HTTP {}", resp.status()));
        }

        info!("Event stream connected: {}", self.url);

        let mut decoder = SseDecoder::new();
        let mut body = resp.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for payload in decoder.feed(&chunk) {
                match UpdateEvent::parse(&payload) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(e) => warn!("Skipping malformed stream message {:?}: {}", payload, e),
                }
            }
        }

        Ok(())
    }
}
