use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::analytics::calculate_win_rate;

/// Backend sends `null` for counters it has not computed yet; treat it as zero.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Aggregate trading counters for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    #[serde(deserialize_with = "null_as_default")]
    pub successful_trades: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub failed_trades: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub long_trades: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub short_trades: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_trades: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_pnl: Decimal,
    #[serde(deserialize_with = "null_as_default")]
    pub win_rate: Decimal,
}

/// Per-user statistics as returned by `/api/trading-stats`.
///
/// A snapshot replaces the previous one wholesale; nothing is merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsSnapshot {
    users: BTreeMap<String, Option<UserStats>>,
}

impl StatsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>, stats: UserStats) -> Self {
        self.users.insert(user.into(), Some(stats));
        self
    }

    /// Stats for `user`, all zero when the backend left the user out.
    pub fn user(&self, user: &str) -> UserStats {
        self.users
            .get(user)
            .and_then(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, user: &str) -> bool {
        matches!(self.users.get(user), Some(Some(_)))
    }

    /// `None` when a field-wise sum does not fit.
    pub fn overall<S: AsRef<str>>(&self, users: &[S]) -> Option<OverallStats> {
        let per_user: Vec<UserStats> = users.iter().map(|u| self.user(u.as_ref())).collect();
        OverallStats::aggregate(per_user.iter())
    }
}

/// Field-wise sum across the known users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub total_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    pub long_trades: u64,
    pub short_trades: u64,
    pub total_pnl: Decimal,
}

impl OverallStats {
    /// Sums every field, or `None` if any sum overflows.
    pub fn aggregate<'a>(stats: impl IntoIterator<Item = &'a UserStats>) -> Option<Self> {
        stats.into_iter().try_fold(Self::default(), |acc, s| {
            Some(Self {
                total_trades: acc.total_trades.checked_add(s.total_trades)?,
                successful_trades: acc.successful_trades.checked_add(s.successful_trades)?,
                failed_trades: acc.failed_trades.checked_add(s.failed_trades)?,
                long_trades: acc.long_trades.checked_add(s.long_trades)?,
                short_trades: acc.short_trades.checked_add(s.short_trades)?,
                total_pnl: acc.total_pnl.checked_add(s.total_pnl)?,
            })
        })
    }

    /// Win rate over the summed counts. Per-user rates are never added.
    pub fn win_rate(&self) -> Decimal {
        calculate_win_rate(self.successful_trades, self.total_trades)
    }
}
