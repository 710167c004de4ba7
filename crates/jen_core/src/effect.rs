use crate::BuildStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    WriteConsole(String),
    /// Replace the previously drawn stage list with these lines.
    RenderStages {
        lines: Vec<String>,
        /// Spinner frame for the activity line, when one is shown.
        activity: Option<&'static str>,
    },
    Finish(WatchOutcome),
}

/// How a watch ended. Exactly one is produced per watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    ConsoleFinished,
    Completed(Option<BuildStatus>),
    Cancelled,
    Failed { message: String },
}

impl WatchOutcome {
    pub fn message(&self) -> String {
        match self {
            WatchOutcome::ConsoleFinished => String::new(),
            WatchOutcome::Completed(Some(BuildStatus::Success)) => "Build SUCCESSFUL".to_string(),
            WatchOutcome::Completed(Some(BuildStatus::Failed)) => "Build has FAILED".to_string(),
            WatchOutcome::Completed(Some(BuildStatus::Aborted)) => {
                "Build has been ABORTED".to_string()
            }
            WatchOutcome::Completed(Some(BuildStatus::Unstable)) => "Build is UNSTABLE".to_string(),
            WatchOutcome::Completed(Some(BuildStatus::NotExecuted)) => {
                "The build has not been executed yet".to_string()
            }
            WatchOutcome::Completed(Some(BuildStatus::InProgress) | None) => {
                "Unknown build status".to_string()
            }
            WatchOutcome::Cancelled => {
                "Build has been cancelled. Unable to report the build progress.".to_string()
            }
            WatchOutcome::Failed { message } => message.clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            WatchOutcome::ConsoleFinished | WatchOutcome::Completed(Some(BuildStatus::Success))
        )
    }
}
