mod common;

use std::sync::Arc;
use std::time::Duration;

use jen_core::{BuildStageSnapshot, BuildStatus, Stage};
use jen_engine::{
    BuildStageStream, ClientSettings, ReqwestClient, StageStreamSettings, StreamEvent,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{collect, network_error, ScriptedClient};

type Event = StreamEvent<BuildStageSnapshot, Option<BuildStatus>>;

fn fast() -> StageStreamSettings {
    StageStreamSettings {
        max_retry_attempts: 2,
        refetch_stages_after: Duration::from_millis(10),
        wait_for_build_to_start: Duration::from_millis(10),
        ..StageStreamSettings::default()
    }
}

fn stage_json(id: u64, name: &str, status: &str, duration: u64) -> serde_json::Value {
    json!({ "id": id, "name": name, "status": status, "durationMillis": duration })
}

fn snapshots(events: &[Event]) -> Vec<BuildStageSnapshot> {
    events
        .iter()
        .filter_map(|event| match event {
            StreamEvent::Data(snapshot) => Some(snapshot.clone()),
            _ => None,
        })
        .collect()
}

async fn mount_once(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn ends_with_not_executed_when_the_build_never_starts() {
    jen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "NOT_EXECUTED" })))
        .expect(3)
        .mount(&server)
        .await;

    let client = Arc::new(ReqwestClient::new(ClientSettings::default()).unwrap());
    let url = format!("{}/api/describe", server.uri());
    let events = collect(BuildStageStream::new(client, url).with_settings(fast()).start()).await;

    assert_eq!(events, vec![StreamEvent::End(Some(BuildStatus::NotExecuted))]);
}

#[tokio::test]
async fn emits_stages_while_the_build_is_in_progress() {
    let server = MockServer::start().await;
    mount_once(&server, json!({ "status": "NOT_EXECUTED" })).await;
    mount_once(
        &server,
        json!({ "status": "IN_PROGRESS", "stages": [stage_json(100, "foo", "IN_PROGRESS", 1000)] }),
    )
    .await;
    mount_once(
        &server,
        json!({ "status": "IN_PROGRESS", "stages": [
            stage_json(100, "foo", "SUCCESS", 1000),
            stage_json(200, "bar", "IN_PROGRESS", 2000),
        ] }),
    )
    .await;
    mount_once(
        &server,
        json!({ "status": "SUCCESS", "stages": [
            stage_json(100, "foo", "SUCCESS", 1000),
            stage_json(200, "bar", "SUCCESS", 2000),
        ] }),
    )
    .await;

    let client = Arc::new(ReqwestClient::new(ClientSettings::default()).unwrap());
    let url = format!("{}/api/describe", server.uri());
    let events = collect(BuildStageStream::new(client, url).with_settings(fast()).start()).await;

    let data = snapshots(&events);
    assert_eq!(data.len(), 3);
    assert_eq!(
        data.last(),
        Some(&BuildStageSnapshot {
            status: BuildStatus::Success,
            stages: vec![
                Stage {
                    id: "100".to_string(),
                    name: "foo".to_string(),
                    duration_ms: 1000,
                    status: "SUCCESS".to_string(),
                },
                Stage {
                    id: "200".to_string(),
                    name: "bar".to_string(),
                    duration_ms: 2000,
                    status: "SUCCESS".to_string(),
                },
            ],
        })
    );
    assert_eq!(events.last(), Some(&StreamEvent::End(Some(BuildStatus::Success))));
}

#[tokio::test]
async fn recovers_from_a_transient_network_failure() {
    let client = Arc::new(ScriptedClient::new(vec![
        common::json(json!({ "status": "IN_PROGRESS", "stages": [stage_json(1, "foo", "IN_PROGRESS", 5)] })),
        Err(network_error("boom!")),
        common::json(json!({ "status": "SUCCESS", "stages": [stage_json(1, "foo", "SUCCESS", 9)] })),
    ]));

    let events = collect(
        BuildStageStream::new(client.clone(), "http://ci/job/x/1/wfapi/describe")
            .with_settings(fast())
            .start(),
    )
    .await;

    assert_eq!(snapshots(&events).len(), 2);
    assert_eq!(events.last(), Some(&StreamEvent::End(Some(BuildStatus::Success))));
    assert_eq!(client.requests().len(), 3);
}

#[tokio::test]
async fn errors_once_the_network_failure_budget_is_spent() {
    let client = Arc::new(ScriptedClient::new(vec![
        common::json(json!({ "status": "IN_PROGRESS", "stages": [stage_json(1, "foo", "IN_PROGRESS", 5)] })),
        Err(network_error("boom!")),
        Err(network_error("boom!")),
        Err(network_error("boom!")),
        Err(network_error("boom!")),
    ]));

    let events = collect(
        BuildStageStream::new(client.clone(), "http://ci/describe")
            .with_settings(fast())
            .start(),
    )
    .await;

    assert_eq!(snapshots(&events).len(), 1);
    match events.last() {
        Some(StreamEvent::Error(err)) => assert_eq!(err.to_string(), "boom!"),
        other => panic!("expected error, got {other:?}"),
    }
    // One success plus the initial failure and three retries.
    assert_eq!(client.requests().len(), 5);
}

#[tokio::test]
async fn a_successful_poll_resets_the_failure_budget() {
    let in_progress = || {
        common::json(json!({ "status": "IN_PROGRESS", "stages": [stage_json(1, "foo", "IN_PROGRESS", 5)] }))
    };
    let settings = StageStreamSettings {
        max_retry_attempts_on_network_failure: 1,
        ..fast()
    };
    let client = Arc::new(ScriptedClient::new(vec![
        in_progress(),
        Err(network_error("boom!")),
        in_progress(),
        Err(network_error("boom!")),
        common::json(json!({ "status": "FAILED", "stages": [stage_json(1, "foo", "FAILED", 7)] })),
    ]));

    let events = collect(
        BuildStageStream::new(client, "http://ci/describe")
            .with_settings(settings)
            .start(),
    )
    .await;

    assert_eq!(snapshots(&events).len(), 3);
    assert_eq!(events.last(), Some(&StreamEvent::End(Some(BuildStatus::Failed))));
}

#[tokio::test]
async fn unknown_status_ends_with_none_and_no_data() {
    let server = MockServer::start().await;
    mount_once(&server, json!({ "status": "FOO_BAR_BAZ", "stages": [] })).await;

    let client = Arc::new(ReqwestClient::new(ClientSettings::default()).unwrap());
    let url = format!("{}/api/describe", server.uri());
    let events = collect(BuildStageStream::new(client, url).with_settings(fast()).start()).await;

    assert_eq!(events, vec![StreamEvent::End(None)]);
}

#[tokio::test]
async fn unreadable_body_counts_as_a_network_failure() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok(jen_engine::HttpResponse::new(200).with_body("<html>login</html>")),
        common::json(json!({ "status": "ABORTED", "stages": [] })),
    ]));

    let events = collect(
        BuildStageStream::new(client, "http://ci/describe")
            .with_settings(fast())
            .start(),
    )
    .await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Data(BuildStageSnapshot {
                status: BuildStatus::Aborted,
                stages: Vec::new(),
            }),
            StreamEvent::End(Some(BuildStatus::Aborted)),
        ]
    );
}

#[tokio::test]
async fn missing_or_null_status_ends_with_none_and_no_data() {
    for body in [json!({ "stages": [] }), json!({ "status": null, "stages": [] })] {
        let client = Arc::new(ScriptedClient::new(vec![
            common::json(body.clone()),
            common::json(body),
        ]));

        let events = collect(
            BuildStageStream::new(client.clone(), "http://ci/describe")
                .with_settings(fast())
                .start(),
        )
        .await;

        assert_eq!(events, vec![StreamEvent::End(None)]);
        assert_eq!(client.requests().len(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn waits_longer_after_each_not_executed_poll() {
    let not_executed = || common::json(json!({ "status": "NOT_EXECUTED" }));
    let settings = StageStreamSettings {
        max_retry_attempts: 3,
        wait_for_build_to_start: Duration::from_millis(100),
        ..StageStreamSettings::default()
    };
    let client = Arc::new(ScriptedClient::new(vec![
        not_executed(),
        not_executed(),
        not_executed(),
        not_executed(),
    ]));

    let events = collect(
        BuildStageStream::new(client.clone(), "http://ci/describe")
            .with_settings(settings)
            .start(),
    )
    .await;

    assert_eq!(events, vec![StreamEvent::End(Some(BuildStatus::NotExecuted))]);
    assert_eq!(
        client.gaps(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(300),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn running_builds_are_polled_at_a_fixed_interval() {
    let in_progress = || {
        common::json(json!({ "status": "IN_PROGRESS", "stages": [stage_json(1, "foo", "IN_PROGRESS", 5)] }))
    };
    let settings = StageStreamSettings {
        refetch_stages_after: Duration::from_millis(250),
        ..StageStreamSettings::default()
    };
    let client = Arc::new(ScriptedClient::new(vec![
        in_progress(),
        in_progress(),
        common::json(json!({ "status": "SUCCESS", "stages": [stage_json(1, "foo", "SUCCESS", 9)] })),
    ]));

    collect(
        BuildStageStream::new(client.clone(), "http://ci/describe")
            .with_settings(settings)
            .start(),
    )
    .await;

    assert_eq!(client.gaps(), vec![Duration::from_millis(250); 2]);
}
