use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

/// Percentage of `successful` out of `total`; zero when there were no trades.
pub fn calculate_win_rate(successful: u64, total: u64) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(successful) / Decimal::from(total) * dec!(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfitFactor {
    Finite(Decimal),
    /// Profits with no losses at all.
    Infinite,
}

impl ProfitFactor {
    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            ProfitFactor::Finite(v) => Some(*v),
            ProfitFactor::Infinite => None,
        }
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{:.2}", v),
            ProfitFactor::Infinite => write!(f, "∞"),
        }
    }
}

pub fn calculate_profit_factor(profits: Decimal, losses: Decimal) -> ProfitFactor {
    if losses.is_zero() {
        return if profits > Decimal::ZERO {
            ProfitFactor::Infinite
        } else {
            ProfitFactor::Finite(Decimal::ZERO)
        };
    }
    ProfitFactor::Finite(profits / losses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_rate_no_trades() {
        assert_eq!(calculate_win_rate(0, 0), Decimal::ZERO);
        assert_eq!(calculate_win_rate(5, 0), Decimal::ZERO);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(calculate_win_rate(3, 4), dec!(75));
        assert_eq!(calculate_win_rate(0, 7), Decimal::ZERO);
        assert_eq!(calculate_win_rate(10, 10), dec!(100));
        assert_eq!(calculate_win_rate(1, 3).round_dp(2), dec!(33.33));
    }

    #[test]
    fn test_profit_factor_zero_losses() {
        assert_eq!(calculate_profit_factor(dec!(250), Decimal::ZERO), ProfitFactor::Infinite);
        assert!(calculate_profit_factor(dec!(0.01), Decimal::ZERO).is_infinite());
        assert_eq!(
            calculate_profit_factor(Decimal::ZERO, Decimal::ZERO),
            ProfitFactor::Finite(Decimal::ZERO)
        );
        assert_eq!(
            calculate_profit_factor(dec!(-5), Decimal::ZERO),
            ProfitFactor::Finite(Decimal::ZERO)
        );
    }

    #[test]
    fn test_profit_factor_ratio() {
        let pf = calculate_profit_factor(dec!(300), dec!(120));
        assert_eq!(pf.value(), Some(dec!(2.5)));
        assert_eq!(pf.to_string(), "2.50");
        assert_eq!(ProfitFactor::Infinite.to_string(), "∞");
    }
}
