use chrono::Local;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::backend::{DashboardApi, EventStream};
use crate::config::DashboardConfig;
use crate::notifications::{NotificationCenter, Severity};
use crate::render::RenderPort;
use crate::types::UpdateEvent;

const CLOCK_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RefreshOutcome {
    /// Backend accepted the refresh; a full reload is scheduled.
    Refreshed,
    /// Backend answered with a non-success status.
    Rejected { message: Option<String> },
    /// Transport or decode failure.
    Unreachable { error: String },
}

struct Core {
    api: Arc<dyn DashboardApi>,
    port: Arc<dyn RenderPort>,
    notices: NotificationCenter,
    users: Vec<String>,
    reload_delay: Duration,
    busy: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Clears the busy state when dropped, whichever way the refresh ends.
struct BusyGuard<'a> {
    core: &'a Core,
}

impl<'a> BusyGuard<'a> {
    fn enter(core: &'a Core) -> Self {
        if core.busy.swap(true, Ordering::AcqRel) {
            warn!("Refresh already in progress, starting another one");
        }
        core.port.set_busy(true);
        Self { core }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.core.busy.store(false, Ordering::Release);
        self.core.port.set_busy(false);
    }
}

impl Core {
    fn track(&self, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    fn abort_all(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        let count = tasks.len();
        for handle in tasks.drain(..) {
            handle.abort();
        }
        count
    }

    async fn trigger_refresh(self: &Arc<Self>) -> RefreshOutcome {
        let _busy = BusyGuard::enter(self);

        match self.api.refresh_data().await {
            Ok(resp) if resp.is_success() => {
                let core = Arc::clone(self);
                let delay = self.reload_delay;
                self.track(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    core.reload_all().await;
                }));

                self.notices
                    .notify("Data refreshed successfully", Severity::Success)
                    .await;
                RefreshOutcome::Refreshed
            }
            Ok(resp) => {
                let text = match resp.message.as_deref() {
                    Some(m) => format!("Failed to refresh data: {}", m),
                    None => "Failed to refresh data".to_string(),
                };
                self.notices.notify(text, Severity::Error).await;
                RefreshOutcome::Rejected {
                    message: resp.message,
                }
            }
            Err(e) => {
                error!("Error refreshing data: {}", e);
                self.notices.notify("Error refreshing data", Severity::Error).await;
                RefreshOutcome::Unreachable {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn pull_container_status(&self) {
        let containers = match self.api.container_status().await {
            Ok(c) => c,
            Err(e) => {
                error!("Error updating container status: {}", e);
                return;
            }
        };

        let mut rendered = 0;
        for container in &containers {
            if self.port.render_container(&container.name, container) {
                rendered += 1;
            }
        }
        debug!("Container status: {} of {} entries rendered", rendered, containers.len());
    }

    async fn pull_trading_stats(&self) {
        let snapshot = match self.api.trading_stats().await {
            Ok(s) => s,
            Err(e) => {
                error!("Error updating trading stats: {}", e);
                return;
            }
        };

        let Some(overall) = snapshot.overall(&self.users) else {
            error!("Error updating trading stats: overall totals overflow, keeping previous view");
            return;
        };

        for user in &self.users {
            if !snapshot.contains(user) {
                debug!("No stats for {} in snapshot, rendering zeros", user);
            }
            self.port.render_user_stats(user, &snapshot.user(user));
        }
        self.port.render_overall(&overall);
    }

    async fn reload_all(&self) {
        tokio::join!(self.pull_container_status(), self.pull_trading_stats());
    }

    async fn on_push_event(&self, event: UpdateEvent) {
        debug!("Push event: {}", event.kind());
        match event {
            UpdateEvent::ContainerStatus => self.pull_container_status().await,
            UpdateEvent::TradingStats => self.pull_trading_stats().await,
            UpdateEvent::NewTrade { symbol, side } => {
                self.notices
                    .notify(format!("New trade: {} {}", symbol, side), Severity::Info)
                    .await;
            }
            UpdateEvent::Unknown { raw } => {
                info!("Unknown update type: {:?}", raw);
            }
        }
    }
}

/// Owns the refresh timer, the clock and the push-event listener. Every path
/// ends in the same keyed re-render through [`RenderPort`]. Pulls are never
/// cancelled, so when two overlap the one that completes last wins.
pub struct RefreshCoordinator {
    core: Arc<Core>,
    refresh_interval: Duration,
    started: AtomicBool,
}

impl RefreshCoordinator {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        port: Arc<dyn RenderPort>,
        config: &DashboardConfig,
    ) -> Self {
        let notices = NotificationCenter::new(Arc::clone(&port), config.notice_ttl());
        Self {
            core: Arc::new(Core {
                api,
                port,
                notices,
                users: config.users.clone(),
                reload_delay: config.reload_delay(),
                busy: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
            }),
            refresh_interval: config.refresh_interval(),
            started: AtomicBool::new(false),
        }
    }

    /// Spawns the initial load, the refresh timer, the clock and (when given)
    /// the push listener.
    pub fn start(&self, stream: Option<EventStream>) {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("Refresh coordinator already started");
            return;
        }

        let core = Arc::clone(&self.core);
        self.core.track(tokio::spawn(async move {
            core.reload_all().await;
        }));

        let core = Arc::clone(&self.core);
        let period = self.refresh_interval;
        self.core.track(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                core.trigger_refresh().await;
            }
        }));

        let port = Arc::clone(&self.core.port);
        self.core.track(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLOCK_TICK);
            loop {
                ticker.tick().await;
                port.render_clock(&Local::now());
            }
        }));

        if let Some(stream) = stream {
            let (rx, handle) = stream.spawn();
            self.core.track(handle);
            self.attach_events(rx);
        }

        info!(
            "Refresh coordinator started (every {}s)",
            self.refresh_interval.as_secs()
        );
    }

    /// Dispatches every event from `rx` until the sender side closes.
    /// Each event runs in its own task, so a slow pull never holds back
    /// the events behind it.
    pub fn attach_events(&self, mut rx: mpsc::Receiver<UpdateEvent>) {
        let core = Arc::clone(&self.core);
        self.core.track(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let dispatch = Arc::clone(&core);
                core.track(tokio::spawn(async move {
                    dispatch.on_push_event(event).await;
                }));
            }
            debug!("Push event channel closed");
        }));
    }

    /// Aborts every owned task and pending notice timer.
    pub async fn dispose(&self) {
        let aborted = self.core.abort_all();
        self.core.notices.shutdown().await;
        self.started.store(false, Ordering::Release);
        info!("Refresh coordinator stopped ({} tasks released)", aborted);
    }

    pub async fn trigger_refresh(&self) -> RefreshOutcome {
        self.core.trigger_refresh().await
    }

    /// Runs [`trigger_refresh`](Self::trigger_refresh) in a task owned by the
    /// coordinator, so the caller is free while it is in flight.
    pub fn spawn_refresh(&self) {
        let core = Arc::clone(&self.core);
        self.core.track(tokio::spawn(async move {
            core.trigger_refresh().await;
        }));
    }

    pub async fn pull_container_status(&self) {
        self.core.pull_container_status().await
    }

    pub async fn pull_trading_stats(&self) {
        self.core.pull_trading_stats().await
    }

    pub async fn reload_all(&self) {
        self.core.reload_all().await
    }

    pub async fn on_push_event(&self, event: UpdateEvent) {
        self.core.on_push_event(event).await
    }

    pub async fn notify(&self, message: impl Into<String>, severity: Severity) -> String {
        self.core.notices.notify(message, severity).await
    }

    pub async fn dismiss(&self, id: &str) -> bool {
        self.core.notices.dismiss(id).await
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.core.notices
    }

    pub fn is_busy(&self) -> bool {
        self.core.busy.load(Ordering::Acquire)
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.core.abort_all();
    }
}
