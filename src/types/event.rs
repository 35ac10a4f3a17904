use serde::Deserialize;

/// A change notification pushed over `/api/stream`.
///
/// Only `NewTrade` carries data; the other kinds tell the client which
/// category to re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    ContainerStatus,
    TradingStats,
    NewTrade { symbol: String, side: String },
    Unknown { raw: String },
}

#[derive(Deserialize)]
struct WireEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    symbol: Option<String>,
    side: Option<String>,
}

impl UpdateEvent {
    /// Parses one message payload. Unrecognised tags become `Unknown`;
    /// only a body that is not a JSON object is an error.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        let wire: WireEvent = serde_json::from_str(payload)?;
        Ok(Self::from_wire(wire))
    }

    fn from_wire(wire: WireEvent) -> Self {
        match wire.kind.as_deref() {
            Some("container_status") => UpdateEvent::ContainerStatus,
            Some("trading_stats") => UpdateEvent::TradingStats,
            Some("new_trade") => UpdateEvent::NewTrade {
                symbol: wire.symbol.unwrap_or_default(),
                side: wire.side.unwrap_or_default(),
            },
            other => UpdateEvent::Unknown {
                raw: other.unwrap_or_default().to_string(),
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            UpdateEvent::ContainerStatus => "container_status",
            UpdateEvent::TradingStats => "trading_stats",
            UpdateEvent::NewTrade { .. } => "new_trade",
            UpdateEvent::Unknown { raw } => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!(
            UpdateEvent::parse(r#"{"type": "container_status"}"#).unwrap(),
            UpdateEvent::ContainerStatus
        );
        assert_eq!(
            UpdateEvent::parse(r#"{"type": "trading_stats", "extra": 1}"#).unwrap(),
            UpdateEvent::TradingStats
        );
        assert_eq!(
            UpdateEvent::parse(r#"{"type": "new_trade", "symbol": "ZECUSDT", "side": "SELL"}"#)
                .unwrap(),
            UpdateEvent::NewTrade {
                symbol: "ZECUSDT".to_string(),
                side: "SELL".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_tag_keeps_raw() {
        let event = UpdateEvent::parse(r#"{"type": "heartbeat"}"#).unwrap();
        assert_eq!(event, UpdateEvent::Unknown { raw: "heartbeat".to_string() });
        assert_eq!(event.kind(), "heartbeat");

        let untagged = UpdateEvent::parse(r#"{"symbol": "BTCUSDT"}"#).unwrap();
        assert_eq!(untagged, UpdateEvent::Unknown { raw: String::new() });
    }

    #[test]
    fn test_non_json_is_error() {
        assert!(UpdateEvent::parse("not json").is_err());
        assert!(UpdateEvent::parse("[1, 2]").is_err());
    }
}
