pub mod console;

pub use console::*;

use chrono::{DateTime, Local};

use crate::notifications::Notice;
use crate::types::{ContainerStatus, OverallStats, UserStats};

/// Everything the coordinator is allowed to do to the visible dashboard.
///
/// Each call rewrites one keyed element; implementations must tolerate the
/// same key being rendered again with newer or older data.
pub trait RenderPort: Send + Sync {
    /// Overwrites the badge and uptime of the `key` placeholder.
    /// Returns `false` when there is no such placeholder.
    fn render_container(&self, key: &str, status: &ContainerStatus) -> bool;

    fn render_user_stats(&self, key: &str, stats: &UserStats);

    fn render_overall(&self, stats: &OverallStats);

    fn show_notice(&self, notice: &Notice);

    fn remove_notice(&self, id: &str);

    /// Disables the refresh trigger and marks containers busy.
    fn set_busy(&self, busy: bool);

    fn render_clock(&self, _now: &DateTime<Local>) {}
}
