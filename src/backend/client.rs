use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{ApiError, DashboardApi, EventStream, RefreshResponse};
use crate::config::DashboardConfig;
use crate::types::{ContainerStatus, StatsSnapshot};

const REFRESH_PATH: &str = "refresh-data";
const CONTAINER_STATUS_PATH: &str = "container-status";
const TRADING_STATS_PATH: &str = "trading-stats";
const STREAM_PATH: &str = "stream";

#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl DashboardClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    /// Push listener for `/api/stream`.
    ///
    /// Uses its own client: the request timeout would cut a long-lived stream.
    pub fn event_stream(&self, reconnect_delay: Duration) -> Result<EventStream, ApiError> {
        let client = Client::builder().connect_timeout(self.timeout).build()?;
        Ok(EventStream::new(client, self.url(STREAM_PATH), reconnect_delay))
    }
}

#[async_trait]
impl DashboardApi for DashboardClient {
    async fn refresh_data(&self) -> Result<RefreshResponse, ApiError> {
        self.get_json(REFRESH_PATH).await
    }

    async fn container_status(&self) -> Result<Vec<ContainerStatus>, ApiError> {
        self.get_json(CONTAINER_STATUS_PATH).await
    }

    async fn trading_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.get_json(TRADING_STATS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{response, CannedServer};

    fn client_for(server: &CannedServer) -> DashboardClient {
        let config = DashboardConfig {
            base_url: server.base_url.clone(),
            ..Default::default()
        };
        DashboardClient::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let config = DashboardConfig {
            base_url: "http://10.0.0.2:5000/".to_string(),
            ..Default::default()
        };
        let client = DashboardClient::new(&config).unwrap();

        assert_eq!(client.url(REFRESH_PATH), "http://10.0.0.2:5000/api/refresh-data");
        assert_eq!(client.url(CONTAINER_STATUS_PATH), "http://10.0.0.2:5000/api/container-status");
    }

    #[test]
    fn test_refresh_response_parsing() {
        let ok: RefreshResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.message, None);

        let failed: RefreshResponse =
            serde_json::from_str(r#"{"status": "error", "message": "docker unreachable"}"#).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.message.as_deref(), Some("docker unreachable"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let server = CannedServer::start(vec![response(
            "500 Internal Server Error",
            "text/plain",
            "boom",
        )])
        .await;

        let err = client_for(&server).trading_stats().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status { ref endpoint, status: 500 } if endpoint == "trading-stats"
        ));
    }

    #[tokio::test]
    async fn test_non_json_body_maps_to_decode() {
        let server = CannedServer::start(vec![response("200 OK", "text/html", "<html>")]).await;

        let err = client_for(&server).container_status().await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Decode { ref endpoint, .. } if endpoint == "container-status"
        ));
    }

    #[tokio::test]
    async fn test_json_body_is_decoded() {
        let server = CannedServer::start(vec![response(
            "200 OK",
            "application/json",
            r#"{"status": "success"}"#,
        )])
        .await;

        let resp = client_for(&server).refresh_data().await.unwrap();
        assert!(resp.is_success());
        assert_eq!(server.connections(), 1);
    }
}
