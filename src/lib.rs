pub mod analytics;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod format;
pub mod notifications;
pub mod render;
pub mod types;

pub use backend::{DashboardApi, DashboardClient};
pub use coordinator::{RefreshCoordinator, RefreshOutcome};
pub use notifications::Severity;
pub use render::{ConsoleRenderer, RenderPort};
