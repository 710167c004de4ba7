use std::fmt;

use serde::{Deserialize, Serialize};

/// Build (and stage) status as reported by the pipeline API.
///
/// `InProgress` is the only non-terminal value. Strings outside this set are
/// not represented here; [`BuildStatus::parse`] returns `None` for them and
/// callers treat that as an undetermined outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    NotExecuted,
    InProgress,
    Success,
    Failed,
    Aborted,
    Unstable,
}

impl BuildStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NOT_EXECUTED" => Some(Self::NotExecuted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            "ABORTED" => Some(Self::Aborted),
            "UNSTABLE" => Some(Self::Unstable),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotExecuted => "NOT_EXECUTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
            Self::Unstable => "UNSTABLE",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }

    /// Icon shown next to a stage or build with this status.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Failed => "✖",
            Self::Success => "✔",
            Self::Aborted => "⚠",
            Self::InProgress => "▶",
            Self::NotExecuted => "☒",
            Self::Unstable => "☐",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Failed => "Failed",
            Self::Success => "Success",
            Self::Aborted => "Aborted",
            Self::InProgress => "In Progress",
            Self::NotExecuted => "Not executed",
            Self::Unstable => "Unstable",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::BuildStatus;

    #[test]
    fn parse_accepts_wire_names_only() {
        assert_eq!(BuildStatus::parse("IN_PROGRESS"), Some(BuildStatus::InProgress));
        assert_eq!(BuildStatus::parse("UNSTABLE"), Some(BuildStatus::Unstable));
        assert_eq!(BuildStatus::parse("in_progress"), None);
        assert_eq!(BuildStatus::parse("FOO_BAR_BAZ"), None);
    }

    #[test]
    fn only_in_progress_is_non_terminal() {
        assert!(!BuildStatus::InProgress.is_terminal());
        assert!(BuildStatus::NotExecuted.is_terminal());
        assert!(BuildStatus::Success.is_terminal());
    }
}
