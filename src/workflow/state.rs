use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a work order.
///
/// `Draft` is the only state a new work order starts in; `Completed` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum WorkOrderState {
    Draft,
    Approved,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderState {
    /// Every state, in left-to-right display order.
    pub const ALL: [WorkOrderState; 5] = [
        WorkOrderState::Draft,
        WorkOrderState::Approved,
        WorkOrderState::InProgress,
        WorkOrderState::Completed,
        WorkOrderState::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderState::Draft => "draft",
            WorkOrderState::Approved => "approved",
            WorkOrderState::InProgress => "in_progress",
            WorkOrderState::Completed => "completed",
            WorkOrderState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderState::Completed | WorkOrderState::Cancelled)
    }
}

impl fmt::Display for WorkOrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses case-insensitively; spaces and dashes stand in for underscores
/// ("In Progress", "in-progress").
impl FromStr for WorkOrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        match normalized.as_str() {
            "draft" => Ok(WorkOrderState::Draft),
            "approved" => Ok(WorkOrderState::Approved),
            "in_progress" => Ok(WorkOrderState::InProgress),
            "completed" => Ok(WorkOrderState::Completed),
            "cancelled" | "canceled" => Ok(WorkOrderState::Cancelled),
            _ => Err(format!("State '{}' is not valid", s.trim())),
        }
    }
}

impl TryFrom<String> for WorkOrderState {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
