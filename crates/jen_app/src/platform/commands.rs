use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use jen_core::{
    format_ms, update, BuildReference, BuildStatus, JenConfig, Msg, WatchOutcome, WatchState,
};
use jen_engine::{EventStream, JenkinsApi, StreamEvent};
use jen_logging::{jen_debug, jen_info};

use super::effects::EffectRunner;

/// Recommended frame interval of a dots spinner.
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Console,
    Stages,
}

/// Requests a build and, when asked, follows it until it finishes.
pub async fn build(
    api: &JenkinsApi,
    title: &str,
    watch: Option<WatchMode>,
) -> anyhow::Result<Option<WatchOutcome>> {
    let running = api.running_builds().await.context("failed to list running builds")?;
    if !running.is_empty() {
        let notice = format!("{} build(s) already running for {title}", running.len());
        println!("{}", notice.as_str().yellow());
    }

    let queue_item = api.trigger_build().await.context("failed to trigger a build")?;
    println!("{} New build requested for {title}", "✔".green());
    jen_info!("Queued as item {}", queue_item);

    match watch {
        Some(mode) => watch_queue_item(api, &queue_item, mode).await.map(Some),
        None => Ok(None),
    }
}

/// Waits for the queue item to become a build, then follows it.
pub async fn watch_queue_item(
    api: &JenkinsApi,
    queue_item: &str,
    mode: WatchMode,
) -> anyhow::Result<WatchOutcome> {
    let item = api
        .queue_resolver()
        .resolve(queue_item, true)
        .await
        .context("An error occurred while waiting for the build to start")?;

    let Some(build) = item.build().filter(|_| !item.cancelled) else {
        let mut runner = EffectRunner::stdout();
        let (_, effects) = update(WatchState::new(), Msg::BuildCancelled);
        runner.apply(effects)?;
        return Ok(WatchOutcome::Cancelled);
    };

    jen_debug!("Queue item {} started build {}", queue_item, build);
    match mode {
        WatchMode::Console => console(api, build).await,
        WatchMode::Stages => stages(api, build).await,
    }
}

pub async fn console(api: &JenkinsApi, build: &BuildReference) -> anyhow::Result<WatchOutcome> {
    let stream = api.progressive_text_stream(build)?.start();
    drive(stream, false, |event| match event {
        StreamEvent::Data(text) => Msg::ConsoleText(text),
        StreamEvent::End(()) => Msg::ConsoleEnded,
        StreamEvent::Error(err) => Msg::StreamFailed(format!(
            "An error occurred while retrieving in progress build console: {err}"
        )),
    })
    .await
}

pub async fn stages(api: &JenkinsApi, build: &BuildReference) -> anyhow::Result<WatchOutcome> {
    let stream = api.build_stage_stream(build)?.start();
    drive(stream, true, |event| match event {
        StreamEvent::Data(snapshot) => Msg::StagesUpdated(snapshot),
        StreamEvent::End(status) => Msg::StagesEnded(status),
        StreamEvent::Error(err) => Msg::StreamFailed(format!(
            "An error occurred while retrieving build stages: {err}"
        )),
    })
    .await
}

/// Feeds stream events through the watch reducer until it reports an
/// outcome. Ctrl-C drops the stream, which stops its polling task.
async fn drive<T, S, F>(
    stream: EventStream<T, S>,
    animate: bool,
    to_msg: F,
) -> anyhow::Result<WatchOutcome>
where
    F: Fn(StreamEvent<T, S>) -> Msg,
{
    let mut runner = EffectRunner::stdout();
    drive_until(stream, animate, to_msg, tokio::signal::ctrl_c(), &mut runner).await
}

async fn drive_until<T, S, F, I, W>(
    mut stream: EventStream<T, S>,
    animate: bool,
    to_msg: F,
    interrupt: I,
    runner: &mut EffectRunner<W>,
) -> anyhow::Result<WatchOutcome>
where
    F: Fn(StreamEvent<T, S>) -> Msg,
    I: Future,
    W: Write,
{
    let mut state = WatchState::new();
    let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
    // One listener for the whole watch.
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        let msg = tokio::select! {
            event = stream.next_event() => match event {
                Some(event) => to_msg(event),
                None => break,
            },
            _ = ticker.tick(), if animate => Msg::Tick,
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                stream.cancel();
                Msg::StreamFailed("Interrupted".to_string())
            }
        };

        let (next, effects) = update(state, msg);
        state = next;
        runner.apply(effects)?;
        if state.is_finished() {
            break;
        }
    }

    Ok(state
        .outcome()
        .cloned()
        .unwrap_or(WatchOutcome::Completed(None)))
}

/// Prints the recent builds of the job.
pub async fn status(api: &JenkinsApi, title: &str) -> anyhow::Result<()> {
    let builds = api.builds().await.context("failed to fetch build history")?;
    println!("{}", title.bold());
    if builds.is_empty() {
        println!("No builds yet");
        return Ok(());
    }

    for build in builds {
        let (icon, label) = match BuildStatus::parse(&build.status) {
            Some(status) => (status.icon(), status.label()),
            None => ("?", build.status.as_str()),
        };
        let duration = format_ms(build.duration_ms);
        println!(
            "{icon} {:<8} {:<14} {}",
            build.name,
            label,
            duration.as_str().dimmed()
        );
    }
    Ok(())
}

/// Link for a browser: no credentials, optionally pointing at one build.
pub fn job_link(
    config: &JenConfig,
    branch: Option<&str>,
    build: Option<&BuildReference>,
) -> anyhow::Result<String> {
    let link = config
        .job_link(branch, build)
        .context("failed to build the job link")?;
    jen_debug!("Job link {}", link);
    Ok(link)
}

pub async fn jobs(api: &JenkinsApi) -> anyhow::Result<()> {
    let jobs = api.jobs().await.context("failed to list jobs")?;
    for job in jobs {
        println!(
            "{:<28} {} {}",
            job.job_type.as_str().dimmed(),
            job.name,
            job.url.as_str().dimmed()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jen_core::{JobConfig, JobType};
    use jen_engine::{FetchError, HttpClient, HttpResponse, ProgressiveTextStream};

    use super::*;

    /// Serves one final console page.
    struct FinishedLog;

    #[async_trait::async_trait]
    impl HttpClient for FinishedLog {
        async fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse::new(200)
                .with_header("x-text-size", "8")
                .with_body("all done"))
        }

        async fn post(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.get(url).await
        }
    }

    /// Never answers.
    struct Stalled;

    #[async_trait::async_trait]
    impl HttpClient for Stalled {
        async fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            std::future::pending().await
        }

        async fn post(&self, _url: &str) -> Result<HttpResponse, FetchError> {
            std::future::pending().await
        }
    }

    fn console_msg(event: StreamEvent<String, ()>) -> Msg {
        match event {
            StreamEvent::Data(text) => Msg::ConsoleText(text),
            StreamEvent::End(()) => Msg::ConsoleEnded,
            StreamEvent::Error(err) => Msg::StreamFailed(err.to_string()),
        }
    }

    #[test]
    fn job_link_points_at_the_build_without_credentials() {
        let config = JenConfig {
            url: "https://ci.example.com/".to_string(),
            username: "me".to_string(),
            token: "s3cret".to_string(),
            job: JobConfig {
                name: "app".to_string(),
                path: "/job/app".to_string(),
                job_type: JobType::WorkflowJob,
            },
        };

        let link = job_link(&config, None, Some(&BuildReference::new("17"))).unwrap();
        assert_eq!(link, "https://ci.example.com/job/app/17");
        assert!(!link.contains("s3cret"));
    }

    #[tokio::test]
    async fn interrupt_stops_a_stalled_watch() {
        let stream = ProgressiveTextStream::new(Arc::new(Stalled), "http://ci/1/logText").start();
        let mut runner = EffectRunner::new(Vec::new());

        let outcome = drive_until(stream, false, console_msg, async {}, &mut runner)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            WatchOutcome::Failed {
                message: "Interrupted".to_string()
            }
        );
    }

    #[tokio::test]
    async fn pending_interrupt_does_not_hold_back_the_stream() {
        let stream =
            ProgressiveTextStream::new(Arc::new(FinishedLog), "http://ci/1/logText").start();
        let mut runner = EffectRunner::new(Vec::new());

        let outcome = drive_until(
            stream,
            false,
            console_msg,
            std::future::pending::<()>(),
            &mut runner,
        )
        .await
        .unwrap();

        assert_eq!(outcome, WatchOutcome::ConsoleFinished);
        assert_eq!(runner.written().as_slice(), b"all done");
    }
}
