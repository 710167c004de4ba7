use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jen_core::{extract_queue_item_number, BuildReference, BuildSummary, JenConfig};
use jen_logging::jen_debug;
use serde::Deserialize;

use crate::client::HttpClient;
use crate::endpoints::{
    jobs_url, progressive_text_url, runs_url, stage_describe_url, trigger_build_url,
};
use crate::progressive::ProgressiveTextStream;
use crate::queue::QueueResolver;
use crate::stages::BuildStageStream;
use crate::EngineError;

/// A job as listed by the server, with folders flattened away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    /// Last segment of the server's class name, e.g. `WorkflowJob`.
    pub job_type: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawJob {
    #[serde(rename = "_class", default)]
    class: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

/// Entry point for one job on one server.
///
/// Builds the endpoint URLs from the configuration and hands out resolvers
/// and streams that share the injected client.
pub struct JenkinsApi {
    client: Arc<dyn HttpClient>,
    base_url: String,
    job_url: String,
}

impl JenkinsApi {
    pub fn new(
        client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        job_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            job_url: job_url.into(),
        }
    }

    pub fn from_config(
        client: Arc<dyn HttpClient>,
        config: &JenConfig,
        branch: Option<&str>,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(
            client,
            config.base_url(true)?,
            config.job_url(branch, true)?,
        ))
    }

    pub fn job_url(&self) -> &str {
        &self.job_url
    }

    /// Requests a new build and returns its queue item number.
    pub async fn trigger_build(&self) -> Result<String, EngineError> {
        let url = trigger_build_url(&self.job_url);
        jen_debug!("Triggering a build");
        let response = self.client.post(&url).await?;
        response
            .header("location")
            .and_then(extract_queue_item_number)
            .ok_or_else(|| {
                EngineError::UnexpectedResponse("missing queue location header".to_string())
            })
    }

    /// Recent builds of the job, newest first as the server orders them.
    pub async fn builds(&self) -> Result<Vec<BuildSummary>, EngineError> {
        let cache_buster = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let response = self.client.get(&runs_url(&self.job_url, cache_buster)).await?;
        Ok(response.json()?)
    }

    pub async fn running_builds(&self) -> Result<Vec<BuildSummary>, EngineError> {
        let mut builds = self.builds().await?;
        builds.retain(BuildSummary::is_running);
        Ok(builds)
    }

    /// All jobs on the server, up to three folder levels deep.
    pub async fn jobs(&self) -> Result<Vec<JobSummary>, EngineError> {
        let response: JobsResponse = self.client.get(&jobs_url(&self.base_url)).await?.json()?;
        Ok(flatten_jobs(response.jobs))
    }

    pub fn queue_resolver(&self) -> QueueResolver {
        QueueResolver::new(self.client.clone(), self.base_url.clone())
    }

    pub fn progressive_text_stream(
        &self,
        build: &BuildReference,
    ) -> Result<ProgressiveTextStream, EngineError> {
        ensure_build_id(build)?;
        Ok(ProgressiveTextStream::new(
            self.client.clone(),
            progressive_text_url(&self.job_url, build),
        ))
    }

    pub fn build_stage_stream(&self, build: &BuildReference) -> Result<BuildStageStream, EngineError> {
        ensure_build_id(build)?;
        Ok(BuildStageStream::new(
            self.client.clone(),
            stage_describe_url(&self.job_url, build),
        ))
    }
}

fn ensure_build_id(build: &BuildReference) -> Result<(), EngineError> {
    if build.is_empty() {
        return Err(EngineError::InvalidArgument("Invalid build id".to_string()));
    }
    Ok(())
}

/// Breadth-first walk that replaces folders with their children, prefixing
/// the children's names with the folder's name.
fn flatten_jobs(jobs: Vec<RawJob>) -> Vec<JobSummary> {
    let mut pending: VecDeque<RawJob> = jobs.into();
    let mut flattened = Vec::new();

    while let Some(mut job) = pending.pop_front() {
        let name = job.display_name.take().unwrap_or_else(|| job.name.clone());
        let job_type = job.class.rsplit('.').next().unwrap_or_default().to_string();

        if job_type == "Folder" {
            for mut child in std::mem::take(&mut job.jobs) {
                let child_name = child.display_name.take().unwrap_or_else(|| child.name.clone());
                child.display_name = Some(format!("{name} → {child_name}"));
                pending.push_back(child);
            }
        } else {
            flattened.push(JobSummary {
                job_type,
                name,
                url: job.url,
            });
        }
    }

    flattened
}
