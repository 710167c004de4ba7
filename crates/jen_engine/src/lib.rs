//! Jen engine: polls the CI server's request/response API and turns it into
//! live event streams of console text and build stages.
mod client;
pub mod endpoints;
mod jenkins;
mod progressive;
mod queue;
mod retry;
mod stages;
mod stream;
mod types;

pub use client::{ClientSettings, HttpClient, HttpResponse, ReqwestClient};
pub use jenkins::{JenkinsApi, JobSummary};
pub use progressive::{ProgressiveTextSettings, ProgressiveTextStream};
pub use queue::{QueueResolver, QueueSettings};
pub use retry::linear_backoff;
pub use stages::{BuildStageStream, StageStreamSettings};
pub use stream::EventStream;
pub use types::{EngineError, FailureKind, FetchError, StreamEvent};
