use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::render::RenderPort;

/// Notification severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A transient on-screen notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        }
    }
}

struct Inner {
    notices: RwLock<Vec<Notice>>,
    expiry: RwLock<HashMap<String, JoinHandle<()>>>,
    port: Arc<dyn RenderPort>,
    ttl: Duration,
}

/// Notices that disappear on dismissal or after `ttl`, whichever comes first.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new(port: Arc<dyn RenderPort>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                notices: RwLock::new(Vec::new()),
                expiry: RwLock::new(HashMap::new()),
                port,
                ttl,
            }),
        }
    }

    /// Shows a notice and returns its id.
    pub async fn notify(&self, message: impl Into<String>, severity: Severity) -> String {
        let notice = Notice::new(message, severity);
        let id = notice.id.clone();

        match severity {
            Severity::Error => error!("{}", notice.message),
            Severity::Warning => warn!("{}", notice.message),
            Severity::Success | Severity::Info => info!("{}", notice.message),
        }

        self.inner.notices.write().await.push(notice.clone());
        self.inner.port.show_notice(&notice);

        let center = self.clone();
        let expiring_id = id.clone();
        let ttl = self.inner.ttl;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            center.expire(&expiring_id).await;
        });
        self.inner.expiry.write().await.insert(id.clone(), handle);

        id
    }

    /// User dismissal. Returns `false` if the notice was already gone.
    pub async fn dismiss(&self, id: &str) -> bool {
        let removed = self.remove(id).await;
        if let Some(handle) = self.inner.expiry.write().await.remove(id) {
            handle.abort();
        }
        removed
    }

    async fn expire(&self, id: &str) {
        self.inner.expiry.write().await.remove(id);
        self.remove(id).await;
    }

    async fn remove(&self, id: &str) -> bool {
        let mut notices = self.inner.notices.write().await;
        let Some(pos) = notices.iter().position(|n| n.id == id) else {
            return false;
        };
        notices.remove(pos);
        drop(notices);

        self.inner.port.remove_notice(id);
        true
    }

    pub async fn active(&self) -> Vec<Notice> {
        self.inner.notices.read().await.clone()
    }

    /// Cancels pending expiry timers. Visible notices are left as they are.
    pub async fn shutdown(&self) {
        for (_, handle) in self.inner.expiry.write().await.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingPort;

    const TTL: Duration = Duration::from_secs(5);

    fn center() -> (NotificationCenter, Arc<RecordingPort>) {
        let port = Arc::new(RecordingPort::default());
        (NotificationCenter::new(port.clone(), TTL), port)
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_ttl() {
        let (center, port) = center();

        let id = center.notify("Data refreshed successfully", Severity::Success).await;
        assert_eq!(center.active().await.len(), 1);
        assert_eq!(port.notices()[0].id, id);

        tokio::time::sleep(TTL - Duration::from_millis(10)).await;
        assert_eq!(center.active().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(center.active().await.is_empty());
        assert_eq!(port.removed_notices(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_before_ttl_then_timeout_is_noop() {
        let (center, port) = center();

        let id = center.notify("Error refreshing data", Severity::Error).await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(center.dismiss(&id).await);
        assert!(center.active().await.is_empty());

        tokio::time::sleep(TTL * 2).await;
        assert!(!center.dismiss(&id).await);
        assert_eq!(port.removed_notices(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_coexist_and_expire_independently() {
        let (center, _port) = center();

        let first = center.notify("New trade: AVAUSDT BUY", Severity::Info).await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        let second = center.notify("New trade: ZECUSDT SELL", Severity::Info).await;
        assert_eq!(center.active().await.len(), 2);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let active = center.active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
        assert!(!center.dismiss(&first).await);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(center.active().await.is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_unknown_id() {
        let (center, port) = center();
        assert!(!center.dismiss("missing").await);
        assert!(port.calls().is_empty());
    }
}
