use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::RenderPort;
use crate::format::{
    format_clock, format_currency, format_percentage, CURRENCY_DECIMALS, PERCENTAGE_DECIMALS,
};
use crate::notifications::{Notice, Severity};
use crate::types::{Badge, ContainerStatus, OverallStats, UserStats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerCard {
    pub badge: Badge,
    pub uptime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserCard {
    pub successful_trades: String,
    pub failed_trades: String,
    pub long_trades: String,
    pub short_trades: String,
    pub total_pnl: String,
    pub win_rate: String,
}

impl From<&UserStats> for UserCard {
    fn from(stats: &UserStats) -> Self {
        Self {
            successful_trades: stats.successful_trades.to_string(),
            failed_trades: stats.failed_trades.to_string(),
            long_trades: stats.long_trades.to_string(),
            short_trades: stats.short_trades.to_string(),
            total_pnl: format_currency(Some(stats.total_pnl), CURRENCY_DECIMALS),
            win_rate: format_percentage(Some(stats.win_rate), PERCENTAGE_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallCard {
    pub total_trades: String,
    pub successful_trades: String,
    pub failed_trades: String,
    pub total_pnl: String,
    pub win_rate: String,
}

impl Default for OverallCard {
    fn default() -> Self {
        Self::from(&OverallStats::default())
    }
}

impl From<&OverallStats> for OverallCard {
    fn from(stats: &OverallStats) -> Self {
        Self {
            total_trades: stats.total_trades.to_string(),
            successful_trades: stats.successful_trades.to_string(),
            failed_trades: stats.failed_trades.to_string(),
            total_pnl: format_currency(Some(stats.total_pnl), CURRENCY_DECIMALS),
            win_rate: format_percentage(Some(stats.win_rate()), PERCENTAGE_DECIMALS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeLine {
    pub id: String,
    pub severity: Severity,
    pub message: String,
}

/// Keyed view model standing in for the dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    /// Placeholders stay `None` until the first matching status arrives.
    pub containers: BTreeMap<String, Option<ContainerCard>>,
    pub users: BTreeMap<String, UserCard>,
    pub overall: OverallCard,
    pub notices: Vec<NoticeLine>,
    pub busy: bool,
    pub clock: String,
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.clock.is_empty() {
            writeln!(f, "{}", self.clock)?;
        }
        writeln!(
            f,
            "Overall: {} trades | {} ok | {} failed | P&L {} | win {}",
            self.overall.total_trades,
            self.overall.successful_trades,
            self.overall.failed_trades,
            self.overall.total_pnl,
            self.overall.win_rate
        )?;

        writeln!(f, "Containers:")?;
        for (name, card) in &self.containers {
            match card {
                Some(card) => writeln!(
                    f,
                    "  {:<32} [{}] {:<10} {}",
                    name, card.badge.tone, card.badge.label, card.uptime
                )?,
                None => writeln!(f, "  {:<32} (no data)", name)?,
            }
        }

        writeln!(f, "Users:")?;
        for (user, card) in &self.users {
            writeln!(
                f,
                "  {:<10} ok {:>4} | failed {:>4} | long {:>4} | short {:>4} | P&L {:>12} | win {:>6}",
                user,
                card.successful_trades,
                card.failed_trades,
                card.long_trades,
                card.short_trades,
                card.total_pnl,
                card.win_rate
            )?;
        }

        for notice in &self.notices {
            writeln!(f, "[{:?}] {}", notice.severity, notice.message)?;
        }
        Ok(())
    }
}

/// Render port that keeps a [`DashboardView`] and logs every change.
pub struct ConsoleRenderer {
    view: Mutex<DashboardView>,
}

impl ConsoleRenderer {
    pub fn new<S: AsRef<str>>(containers: &[S], users: &[S]) -> Self {
        let view = DashboardView {
            containers: containers
                .iter()
                .map(|c| (c.as_ref().to_string(), None))
                .collect(),
            users: users
                .iter()
                .map(|u| (u.as_ref().to_string(), UserCard::from(&UserStats::default())))
                .collect(),
            ..Default::default()
        };

        Self {
            view: Mutex::new(view),
        }
    }

    pub fn view(&self) -> DashboardView {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardView> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RenderPort for ConsoleRenderer {
    fn render_container(&self, key: &str, status: &ContainerStatus) -> bool {
        let mut view = self.lock();
        let Some(slot) = view.containers.get_mut(key) else {
            debug!("No placeholder for container {}", key);
            return false;
        };

        let card = ContainerCard {
            badge: status.status.badge(),
            uptime: status.uptime_display().to_string(),
        };
        if slot.as_ref() != Some(&card) {
            info!("Container {}: {} ({})", key, card.badge.label, card.uptime);
        }
        *slot = Some(card);
        true
    }

    fn render_user_stats(&self, key: &str, stats: &UserStats) {
        let mut view = self.lock();
        let Some(slot) = view.users.get_mut(key) else {
            debug!("No card for user {}", key);
            return;
        };

        let card = UserCard::from(stats);
        if *slot != card {
            info!(
                "{}: {} ok / {} failed, P&L {}, win rate {}",
                key, card.successful_trades, card.failed_trades, card.total_pnl, card.win_rate
            );
        }
        *slot = card;
    }

    fn render_overall(&self, stats: &OverallStats) {
        let card = OverallCard::from(stats);
        let mut view = self.lock();
        if view.overall != card {
            info!(
                "Overall: {} trades, {} ok, {} failed, P&L {}",
                card.total_trades, card.successful_trades, card.failed_trades, card.total_pnl
            );
        }
        view.overall = card;
    }

    fn show_notice(&self, notice: &Notice) {
        self.lock().notices.push(NoticeLine {
            id: notice.id.clone(),
            severity: notice.severity,
            message: notice.message.clone(),
        });
    }

    fn remove_notice(&self, id: &str) {
        self.lock().notices.retain(|n| n.id != id);
    }

    fn set_busy(&self, busy: bool) {
        let mut view = self.lock();
        if view.busy != busy {
            debug!("Refresh trigger {}", if busy { "disabled" } else { "enabled" });
        }
        view.busy = busy;
    }

    fn render_clock(&self, now: &DateTime<Local>) {
        self.lock().clock = format_clock(now);
    }
}
