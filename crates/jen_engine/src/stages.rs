use std::sync::Arc;
use std::time::Duration;

use jen_core::{BuildStageSnapshot, BuildStatus, Stage};
use jen_logging::{jen_debug, jen_error, jen_warn};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::client::HttpClient;
use crate::retry::{linear_backoff, pause};
use crate::stream::{Emitter, EventStream};
use crate::FetchError;

#[derive(Debug, Clone)]
pub struct StageStreamSettings {
    /// Retries while the build reports `NOT_EXECUTED`.
    pub max_retry_attempts: u32,
    /// Consecutive failed requests tolerated before giving up.
    pub max_retry_attempts_on_network_failure: u32,
    /// Fixed delay between polls of a running build and after a failed request.
    pub refetch_stages_after: Duration,
    /// Base of the linear backoff while the build has not started.
    pub wait_for_build_to_start: Duration,
}

impl Default for StageStreamSettings {
    fn default() -> Self {
        Self {
            max_retry_attempts: 10,
            max_retry_attempts_on_network_failure: 3,
            refetch_stages_after: Duration::from_millis(2000),
            wait_for_build_to_start: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    stages: Vec<Stage>,
}

/// Stage graph of a pipeline build, re-fetched until the build finishes.
///
/// Emits `Data(snapshot)` for every poll of a running build plus the final
/// one, then `End(Some(status))`. An unrecognized status ends the stream
/// with `End(None)` and no data.
pub struct BuildStageStream {
    client: Arc<dyn HttpClient>,
    url: String,
    settings: StageStreamSettings,
}

impl BuildStageStream {
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            settings: StageStreamSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: StageStreamSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Starts polling on the current tokio runtime.
    pub fn start(self) -> EventStream<BuildStageSnapshot, Option<BuildStatus>> {
        EventStream::spawn(move |emitter, cancel| self.run(emitter, cancel))
    }

    async fn run(
        self,
        emitter: Emitter<BuildStageSnapshot, Option<BuildStatus>>,
        cancel: CancellationToken,
    ) {
        let mut not_started_attempts = 0;
        let mut network_failures = 0;

        loop {
            let Some(fetched) = cancel.run_until_cancelled(self.fetch()).await else {
                return;
            };

            let wait = match fetched {
                Ok(build) => {
                    network_failures = 0;
                    match build.status.as_deref().and_then(BuildStatus::parse) {
                        Some(BuildStatus::NotExecuted) => {
                            if not_started_attempts >= self.settings.max_retry_attempts {
                                jen_debug!("Maximum retry attempts reached.");
                                emitter.end(Some(BuildStatus::NotExecuted));
                                return;
                            }
                            not_started_attempts += 1;
                            let wait = linear_backoff(
                                self.settings.wait_for_build_to_start,
                                not_started_attempts,
                            );
                            jen_debug!(
                                "The build has not yet started. Scheduling a re-fetch after: {}ms",
                                wait.as_millis()
                            );
                            wait
                        }
                        Some(BuildStatus::InProgress) => {
                            let snapshot = BuildStageSnapshot {
                                status: BuildStatus::InProgress,
                                stages: build.stages,
                            };
                            if !emitter.data(snapshot) {
                                return;
                            }
                            self.settings.refetch_stages_after
                        }
                        Some(status) => {
                            emitter.data(BuildStageSnapshot {
                                status,
                                stages: build.stages,
                            });
                            emitter.end(Some(status));
                            return;
                        }
                        None => {
                            jen_debug!("Unknown build status {:?}; stopping", build.status);
                            emitter.end(None);
                            return;
                        }
                    }
                }
                Err(err) => {
                    if network_failures >= self.settings.max_retry_attempts_on_network_failure {
                        jen_error!("Maximum network failure retry attempts reached.");
                        emitter.error(err.into());
                        return;
                    }
                    network_failures += 1;
                    jen_warn!(
                        "Network error occurred ({}). Scheduling a re-fetch after: {}ms",
                        err,
                        self.settings.refetch_stages_after.as_millis()
                    );
                    self.settings.refetch_stages_after
                }
            };

            if !pause(&cancel, wait).await {
                return;
            }
        }
    }

    async fn fetch(&self) -> Result<DescribeResponse, FetchError> {
        self.client.get(&self.url).await?.json()
    }
}
