use std::io::{self, Write};

use colored::Colorize;
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use jen_core::{BuildStatus, Effect, WatchOutcome};

/// Applies watch effects to the terminal.
///
/// Stage lists are redrawn in place: the previous drawing is erased before
/// the new one is written.
pub struct EffectRunner<W: Write> {
    out: W,
    drawn_lines: u16,
}

impl EffectRunner<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> EffectRunner<W> {
    pub fn new(out: W) -> Self {
        Self { out, drawn_lines: 0 }
    }

    #[cfg(test)]
    pub(crate) fn written(&self) -> &W {
        &self.out
    }

    pub fn apply(&mut self, effects: Vec<Effect>) -> io::Result<()> {
        for effect in effects {
            match effect {
                Effect::WriteConsole(text) => self.out.write_all(text.as_bytes())?,
                Effect::RenderStages {
                    lines,
                    activity,
                } => self.render_stages(&lines, activity)?,
                Effect::Finish(outcome) => self.finish(&outcome)?,
            }
        }
        self.out.flush()
    }

    fn render_stages(&mut self, lines: &[String], activity: Option<&str>) -> io::Result<()> {
        if self.drawn_lines == 0 {
            queue!(self.out, cursor::Hide)?;
            writeln!(self.out, "{}", "Build Stages".yellow())?;
        } else {
            self.erase_drawn()?;
        }

        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        let mut drawn = lines.len();
        if let Some(frame) = activity {
            writeln!(self.out, "{frame} {}", "running".dimmed())?;
            drawn += 1;
        }
        self.drawn_lines = u16::try_from(drawn).unwrap_or(u16::MAX);
        Ok(())
    }

    fn erase_drawn(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            MoveUp(self.drawn_lines),
            MoveToColumn(0),
            Clear(ClearType::FromCursorDown)
        )
    }

    fn finish(&mut self, outcome: &WatchOutcome) -> io::Result<()> {
        if self.drawn_lines > 0 {
            queue!(self.out, cursor::Show)?;
        }

        let message = outcome.message();
        let message = message.as_str();
        let styled = match outcome {
            WatchOutcome::ConsoleFinished => return Ok(()),
            WatchOutcome::Completed(Some(BuildStatus::Success)) => message.green(),
            WatchOutcome::Completed(Some(BuildStatus::Aborted | BuildStatus::Unstable)) => {
                message.yellow()
            }
            WatchOutcome::Completed(Some(BuildStatus::NotExecuted)) => message.magenta(),
            WatchOutcome::Completed(_) | WatchOutcome::Cancelled | WatchOutcome::Failed { .. } => {
                message.red()
            }
        };
        let icon = match outcome {
            WatchOutcome::Completed(Some(status)) => status.icon(),
            _ => "✖",
        };
        writeln!(self.out, "\n{icon} {styled}")
    }
}
