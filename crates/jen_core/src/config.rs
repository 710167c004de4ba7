use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::BuildReference;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid server url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Unsupported job type: {0}")]
    UnsupportedJobType(String),
    #[error("a branch name is required for multibranch jobs")]
    MissingBranch,
}

/// Kind of Jenkins job the repository is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobType {
    WorkflowJob,
    WorkflowMultiBranchProject,
    Other(String),
}

impl From<String> for JobType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "WorkflowJob" => Self::WorkflowJob,
            "WorkflowMultiBranchProject" => Self::WorkflowMultiBranchProject,
            _ => Self::Other(raw),
        }
    }
}

impl From<JobType> for String {
    fn from(job_type: JobType) -> Self {
        job_type.to_string()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::WorkflowJob => f.write_str("WorkflowJob"),
            JobType::WorkflowMultiBranchProject => f.write_str("WorkflowMultiBranchProject"),
            JobType::Other(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    /// Path below the server root, e.g. `/job/my-project`.
    pub path: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
}

/// Connection record for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JenConfig {
    pub url: String,
    pub username: String,
    pub token: String,
    pub job: JobConfig,
}

impl JenConfig {
    /// `scheme://host[:port]`, optionally with `username:token@` embedded.
    pub fn base_url(&self, include_credentials: bool) -> Result<String, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidUrl {
            url: self.url.clone(),
            message,
        };

        let parsed = Url::parse(self.url.trim()).map_err(|err| invalid(err.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;

        let mut base = Url::parse(&format!("{}://{}", parsed.scheme(), host))
            .map_err(|err| invalid(err.to_string()))?;
        base.set_port(parsed.port())
            .map_err(|_| invalid("cannot carry a port".to_string()))?;

        if include_credentials {
            base.set_username(&self.username)
                .map_err(|_| invalid("cannot carry credentials".to_string()))?;
            base.set_password(Some(&self.token))
                .map_err(|_| invalid("cannot carry credentials".to_string()))?;
        }

        Ok(base.as_str().trim_end_matches('/').to_string())
    }

    pub fn job_url(&self, branch: Option<&str>, include_credentials: bool) -> Result<String, ConfigError> {
        let base = self.base_url(include_credentials)?;
        match &self.job.job_type {
            JobType::WorkflowJob => Ok(format!("{base}{}", self.job.path)),
            JobType::WorkflowMultiBranchProject => {
                let branch = branch
                    .filter(|name| !name.trim().is_empty())
                    .ok_or(ConfigError::MissingBranch)?;
                Ok(format!("{base}{}/job/{branch}", self.job.path))
            }
            JobType::Other(raw) => Err(ConfigError::UnsupportedJobType(raw.clone())),
        }
    }

    /// Browser link to the job, or to one of its builds. Never carries
    /// credentials.
    pub fn job_link(
        &self,
        branch: Option<&str>,
        build: Option<&BuildReference>,
    ) -> Result<String, ConfigError> {
        let job = self.job_url(branch, false)?;
        Ok(match build.filter(|build| !build.is_empty()) {
            Some(build) => format!("{job}/{}", build.as_str().trim()),
            None => job,
        })
    }

    /// Human readable job name, `name/branch` for multibranch jobs.
    pub fn job_title(&self, branch: Option<&str>) -> Result<String, ConfigError> {
        match &self.job.job_type {
            JobType::WorkflowJob => Ok(self.job.name.clone()),
            JobType::WorkflowMultiBranchProject => {
                Ok(format!("{}/{}", self.job.name, branch.unwrap_or_default()))
            }
            JobType::Other(raw) => Err(ConfigError::UnsupportedJobType(raw.clone())),
        }
    }
}
