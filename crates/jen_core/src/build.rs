use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::BuildStatus;

/// Ids arrive as JSON numbers from some endpoints and as strings from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Identifier of a started build, scoped to its job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct BuildReference(String);

impl BuildReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<RawId> for BuildReference {
    fn from(raw: RawId) -> Self {
        Self(raw.into())
    }
}

impl From<BuildReference> for String {
    fn from(reference: BuildReference) -> Self {
        reference.0
    }
}

impl From<u64> for BuildReference {
    fn from(number: u64) -> Self {
        Self(number.to_string())
    }
}

impl From<&str> for BuildReference {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for BuildReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executable {
    pub number: BuildReference,
}

/// Server-side record of a requested build.
///
/// `executable` stays absent until the build actually starts. A cancelled
/// item never acquires one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub executable: Option<Executable>,
}

impl QueueItem {
    pub fn build(&self) -> Option<&BuildReference> {
        self.executable.as_ref().map(|executable| &executable.number)
    }

    /// True once the item no longer needs polling: it started or was cancelled.
    pub fn is_settled(&self) -> bool {
        self.cancelled || self.executable.is_some()
    }
}

/// One page of progressive console text.
///
/// `size` is the offset to request next; `has_more == false` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub offset: u64,
    pub size: u64,
    pub text: String,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "durationMillis", default)]
    pub duration_ms: u64,
    pub status: String,
}

impl Stage {
    pub fn build_status(&self) -> Option<BuildStatus> {
        BuildStatus::parse(&self.status)
    }
}

/// Build status plus its stages in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStageSnapshot {
    pub status: BuildStatus,
    pub stages: Vec<Stage>,
}

impl BuildStageSnapshot {
    pub fn any_stage_in_progress(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| stage.build_status() == Some(BuildStatus::InProgress))
    }
}

/// A row of the build history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "durationMillis", default)]
    pub duration_ms: u64,
    #[serde(rename = "startTimeMillis", default)]
    pub start_time_ms: u64,
    #[serde(rename = "endTimeMillis", default)]
    pub end_time_ms: u64,
}

impl BuildSummary {
    pub fn is_running(&self) -> bool {
        BuildStatus::parse(&self.status) == Some(BuildStatus::InProgress)
    }
}
