use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task state as reported by the backend status endpoint. The client treats
/// `Succeeded` and `Failed` as terminal: once observed, polling stops and no
/// further transitions are expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }

    /// Placeholder bar position per state. The backend reports no completion
    /// fraction, so the bar is pinned to a constant for each state.
    pub fn progress_percent(&self) -> u8 {
        match self {
            TaskState::Pending => 10,
            TaskState::InProgress => 50,
            TaskState::Succeeded => 100,
            TaskState::Failed => 0,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "Pending",
            TaskState::InProgress => "InProgress",
            TaskState::Succeeded => "Succeeded",
            TaskState::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TaskState {
    type Err = ();

    /// Parses the wire strings used by the status endpoint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskState::Pending),
            "PROGRESS" => Ok(TaskState::InProgress),
            "SUCCESS" => Ok(TaskState::Succeeded),
            "FAILURE" => Ok(TaskState::Failed),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_states() {
        assert_eq!(TaskState::from_str("PENDING"), Ok(TaskState::Pending));
        assert_eq!(TaskState::from_str("PROGRESS"), Ok(TaskState::InProgress));
        assert_eq!(TaskState::from_str("SUCCESS"), Ok(TaskState::Succeeded));
        assert_eq!(TaskState::from_str("FAILURE"), Ok(TaskState::Failed));
        assert_eq!(TaskState::from_str("RETRY"), Err(()));
        assert_eq!(TaskState::from_str("pending"), Err(()));
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::InProgress.is_terminal());
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
    }

    #[test]
    fn progress_is_non_decreasing_through_success() {
        let sequence = [
            TaskState::Pending,
            TaskState::InProgress,
            TaskState::InProgress,
            TaskState::Succeeded,
        ];
        let mut last = 0u8;
        for state in sequence {
            let pct = state.progress_percent();
            assert!(pct >= last, "{state} went backwards: {pct} < {last}");
            last = pct;
        }
        assert_eq!(last, 100);
    }
}
