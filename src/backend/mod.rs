pub mod client;
pub mod stream;

pub use client::*;
pub use stream::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ContainerStatus, StatsSnapshot};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Body of `/api/refresh-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl RefreshResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn failure(message: Option<&str>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.map(str::to_string),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Read side of the dashboard backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn refresh_data(&self) -> Result<RefreshResponse, ApiError>;
    async fn container_status(&self) -> Result<Vec<ContainerStatus>, ApiError>;
    async fn trading_stats(&self) -> Result<StatsSnapshot, ApiError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Raw HTTP/1.1 response that closes the connection after `body`.
    pub fn response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        )
    }

    /// Local server answering the n-th connection with the n-th canned
    /// response; the last one repeats. An empty response just closes the socket.
    pub struct CannedServer {
        pub base_url: String,
        connections: Arc<AtomicUsize>,
    }

    impl CannedServer {
        pub async fn start(responses: Vec<String>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let connections = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&connections);

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    let canned = responses[n.min(responses.len() - 1)].clone();
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let _ = socket.write_all(canned.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
            });

            Self {
                base_url: format!("http://{}", addr),
                connections,
            }
        }

        pub fn connections(&self) -> usize {
            self.connections.load(Ordering::SeqCst)
        }
    }

    async fn read_request_head(socket: &mut TcpStream) {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
    }
}
