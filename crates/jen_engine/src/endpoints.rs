//! URLs of the server endpoints the engine consumes.

use jen_core::{remove_trailing_slash, BuildReference};

pub fn progressive_text_url(job_url: &str, build: &BuildReference) -> String {
    format!(
        "{}/{build}/logText/progressiveText",
        remove_trailing_slash(job_url)
    )
}

pub fn stage_describe_url(job_url: &str, build: &BuildReference) -> String {
    format!("{}/{build}/wfapi/describe", remove_trailing_slash(job_url))
}

pub fn queue_item_url(base_url: &str, item_number: &str) -> String {
    format!(
        "{}/queue/item/{item_number}/api/json",
        remove_trailing_slash(base_url)
    )
}

/// `delay=0sec` starts the build without the quiet period.
pub fn trigger_build_url(job_url: &str) -> String {
    format!("{}/build?delay=0sec", remove_trailing_slash(job_url))
}

/// The `_` parameter defeats intermediate caches.
pub fn runs_url(job_url: &str, cache_buster: u128) -> String {
    format!(
        "{}/wfapi/runs?_={cache_buster}",
        remove_trailing_slash(job_url)
    )
}

/// Jobs three folder levels deep.
pub fn jobs_url(base_url: &str) -> String {
    let pick = "url,name,displayName";
    format!(
        "{}/api/json?tree=jobs[{pick},jobs[{pick},jobs[{pick}]]]",
        remove_trailing_slash(base_url)
    )
}

/// Appends the progressive text cursor.
pub(crate) fn with_start(url: &str, offset: u64) -> String {
    format!("{url}?start={offset}")
}
