use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root of the dashboard backend, without a trailing `/api`.
    pub base_url: String,
    pub refresh_interval_secs: u64,
    /// Delay between a successful manual refresh and the full reload.
    pub reload_delay_ms: u64,
    pub notice_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub stream_enabled: bool,
    pub stream_reconnect_secs: u64,
    pub users: Vec<String>,
    pub containers: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            refresh_interval_secs: 30,
            reload_delay_ms: 1000,
            notice_ttl_secs: 5,
            request_timeout_secs: 10,
            stream_enabled: true,
            stream_reconnect_secs: 5,
            users: vec!["yuva".to_string(), "shan".to_string()],
            containers: vec![
                "Yuva_Positions_trading_bot".to_string(),
                "Shan_Positions_trading_bot".to_string(),
                "log-reader".to_string(),
            ],
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            errors.push(format!("base_url must start with http:// or https:// (got {})", self.base_url));
        }
        if self.refresh_interval_secs == 0 {
            errors.push("refresh_interval_secs must be > 0".to_string());
        }
        if self.notice_ttl_secs == 0 {
            errors.push("notice_ttl_secs must be > 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be > 0".to_string());
        }
        if self.stream_enabled && self.stream_reconnect_secs == 0 {
            errors.push("stream_reconnect_secs must be > 0 when the stream is enabled".to_string());
        }
        if self.users.is_empty() {
            errors.push("users must name at least one user".to_string());
        }
        if self.users.iter().any(|u| u.trim().is_empty()) {
            errors.push("users must not contain empty names".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_reconnect(&self) -> Duration {
        Duration::from_secs(self.stream_reconnect_secs)
    }
}
