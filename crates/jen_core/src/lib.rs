//! Jen core: build domain model, configuration record and the pure watch-state machine.
mod build;
mod config;
mod effect;
mod format;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use build::{
    BuildReference, BuildStageSnapshot, BuildSummary, Executable, QueueItem, Stage, TextChunk,
};
pub use config::{ConfigError, JenConfig, JobConfig, JobType};
pub use effect::{Effect, WatchOutcome};
pub use format::{extract_queue_item_number, format_ms, is_valid_url, remove_trailing_slash};
pub use msg::Msg;
pub use state::{WatchPhase, WatchState};
pub use status::BuildStatus;
pub use update::update;
pub use view_model::{stage_line, WatchViewModel};
