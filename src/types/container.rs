use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Running,
    Exited,
    /// Anything else the backend reports, kept verbatim (e.g. `not_found`).
    Other(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Running => "running",
            LifecycleState::Exited => "exited",
            LifecycleState::Other(s) => s,
        }
    }

    pub fn badge(&self) -> Badge {
        match self {
            LifecycleState::Running => Badge {
                tone: BadgeTone::Success,
                label: "Running".to_string(),
            },
            LifecycleState::Exited => Badge {
                tone: BadgeTone::Danger,
                label: "Stopped".to_string(),
            },
            LifecycleState::Other(s) => Badge {
                tone: BadgeTone::Warning,
                label: s.clone(),
            },
        }
    }
}

impl From<&str> for LifecycleState {
    fn from(s: &str) -> Self {
        match s {
            "running" => LifecycleState::Running,
            "exited" => LifecycleState::Exited,
            other => LifecycleState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LifecycleState::from(s.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadgeTone {
    Success,
    Danger,
    Warning,
}

impl fmt::Display for BadgeTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeTone::Success => write!(f, "success"),
            BadgeTone::Danger => write!(f, "danger"),
            BadgeTone::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub tone: BadgeTone,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub status: LifecycleState,
    #[serde(default)]
    pub uptime: Option<String>,
}

impl ContainerStatus {
    pub fn new(name: impl Into<String>, status: LifecycleState, uptime: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            uptime,
        }
    }

    pub fn uptime_display(&self) -> &str {
        match self.uptime.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => "N/A",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_mapping() {
        assert_eq!(LifecycleState::Running.badge().tone, BadgeTone::Success);
        assert_eq!(LifecycleState::Running.badge().label, "Running");
        assert_eq!(LifecycleState::Exited.badge().tone, BadgeTone::Danger);
        assert_eq!(LifecycleState::Exited.badge().label, "Stopped");

        let other = LifecycleState::from("not_found").badge();
        assert_eq!(other.tone, BadgeTone::Warning);
        assert_eq!(other.label, "not_found");
    }

    #[test]
    fn test_parse_container_list() {
        let json = r#"[
            {"name": "Yuva_Positions_trading_bot", "status": "running", "uptime": "Up 3 hours", "id": "abc"},
            {"name": "log-reader", "status": "restarting"},
            {"name": "Shan_Positions_trading_bot", "status": "exited", "uptime": ""}
        ]"#;
        let containers: Vec<ContainerStatus> = serde_json::from_str(json).unwrap();

        assert_eq!(containers.len(), 3);
        assert_eq!(containers[0].status, LifecycleState::Running);
        assert_eq!(containers[0].uptime_display(), "Up 3 hours");
        assert_eq!(containers[1].status, LifecycleState::Other("restarting".to_string()));
        assert_eq!(containers[1].uptime_display(), "N/A");
        assert_eq!(containers[2].uptime_display(), "N/A");
    }
}
