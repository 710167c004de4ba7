use crate::view_model::{stage_line, WatchViewModel, SPINNER_FRAMES};
use crate::{BuildStageSnapshot, BuildStatus, WatchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchPhase {
    /// Nothing received yet.
    #[default]
    Waiting,
    Streaming,
    Finished,
}

/// Consumer-side view of a single watched build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchState {
    phase: WatchPhase,
    snapshot: Option<BuildStageSnapshot>,
    frame: usize,
    outcome: Option<WatchOutcome>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == WatchPhase::Finished
    }

    pub fn outcome(&self) -> Option<&WatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn view(&self) -> WatchViewModel {
        let frame = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        let stage_lines = self
            .snapshot
            .iter()
            .flat_map(|snapshot| snapshot.stages.iter())
            .map(|stage| stage_line(stage, frame))
            .collect();
        let show_activity = self.snapshot.as_ref().is_some_and(|snapshot| {
            snapshot.status == BuildStatus::InProgress && !snapshot.any_stage_in_progress()
        });

        WatchViewModel {
            stage_lines,
            show_activity,
            spinner: frame,
        }
    }

    pub(crate) fn has_stages(&self) -> bool {
        self.snapshot.is_some()
    }

    pub(crate) fn start_streaming(&mut self) {
        self.phase = WatchPhase::Streaming;
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: BuildStageSnapshot) {
        self.phase = WatchPhase::Streaming;
        self.snapshot = Some(snapshot);
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub(crate) fn finish(&mut self, outcome: WatchOutcome) {
        self.phase = WatchPhase::Finished;
        self.outcome = Some(outcome);
    }
}
