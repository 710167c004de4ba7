use crate::{Effect, Msg, WatchOutcome, WatchState};

/// Pure update function: applies a stream message to the watch state and
/// returns what the terminal should do. Once a terminal outcome has been
/// produced every further message is ignored.
pub fn update(mut state: WatchState, msg: Msg) -> (WatchState, Vec<Effect>) {
    if state.is_finished() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::BuildCancelled => finish(&mut state, WatchOutcome::Cancelled),
        Msg::ConsoleText(text) => {
            if text.is_empty() {
                return (state, Vec::new());
            }
            state.start_streaming();
            vec![Effect::WriteConsole(text)]
        }
        Msg::ConsoleEnded => finish(&mut state, WatchOutcome::ConsoleFinished),
        Msg::StagesUpdated(snapshot) => {
            state.apply_snapshot(snapshot);
            vec![render(&state)]
        }
        Msg::StagesEnded(status) => finish(&mut state, WatchOutcome::Completed(status)),
        Msg::StreamFailed(message) => finish(&mut state, WatchOutcome::Failed { message }),
        Msg::Tick => {
            if !state.has_stages() {
                return (state, Vec::new());
            }
            state.advance_frame();
            vec![render(&state)]
        }
    };

    (state, effects)
}

fn render(state: &WatchState) -> Effect {
    let view = state.view();
    Effect::RenderStages {
        lines: view.stage_lines,
        activity: view.show_activity.then_some(view.spinner),
    }
}

fn finish(state: &mut WatchState, outcome: WatchOutcome) -> Vec<Effect> {
    state.finish(outcome.clone());
    vec![Effect::Finish(outcome)]
}
