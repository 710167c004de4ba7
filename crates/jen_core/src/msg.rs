use crate::{BuildStageSnapshot, BuildStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The queue item was cancelled before a build started.
    BuildCancelled,
    /// New console text arrived.
    ConsoleText(String),
    /// The console stream reached the end of the log.
    ConsoleEnded,
    /// A fresh stage snapshot arrived.
    StagesUpdated(BuildStageSnapshot),
    /// The stage stream finished; `None` means the status was not recognized.
    StagesEnded(Option<BuildStatus>),
    /// A stream gave up with an error.
    StreamFailed(String),
    /// Animation tick while waiting for the next snapshot.
    Tick,
}
