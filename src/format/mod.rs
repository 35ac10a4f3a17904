use chrono::{DateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;

pub const NUMBER_DECIMALS: u32 = 2;
pub const CURRENCY_DECIMALS: u32 = 2;
pub const PERCENTAGE_DECIMALS: u32 = 1;

fn fixed(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimals as usize, rounded)
}

/// `None` renders as zero, like every formatter here.
pub fn format_number(value: Option<Decimal>, decimals: u32) -> String {
    match value {
        Some(v) => fixed(v, decimals),
        None => "0.00".to_string(),
    }
}

pub fn format_currency(amount: Option<Decimal>, decimals: u32) -> String {
    match amount {
        Some(v) => format!("${}", fixed(v, decimals)),
        None => "$0.00".to_string(),
    }
}

pub fn format_percentage(value: Option<Decimal>, decimals: u32) -> String {
    match value {
        Some(v) => format!("{}%", fixed(v, decimals)),
        None => "0.0%".to_string(),
    }
}

/// Header clock, e.g. `Oct 14, 2026 13:45:02`.
pub fn format_clock<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%b %-d, %Y %H:%M:%S").to_string()
}
