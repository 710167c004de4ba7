use crate::{format_ms, BuildStatus, Stage};

pub(crate) const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchViewModel {
    pub stage_lines: Vec<String>,
    /// Build is running but no stage reports progress; draw a spinner line.
    pub show_activity: bool,
    pub spinner: &'static str,
}

/// `"✔ Build (Duration 02 sec)"`; running stages get the spinner frame as icon.
pub fn stage_line(stage: &Stage, spinner: &str) -> String {
    let icon = match stage.build_status() {
        Some(BuildStatus::InProgress) => spinner,
        Some(status) => status.icon(),
        None => " ",
    };
    format!(
        "{icon} {} (Duration {})",
        stage.name,
        format_ms(stage.duration_ms)
    )
}
