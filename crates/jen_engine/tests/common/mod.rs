#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use jen_engine::{
    EventStream, FailureKind, FetchError, HttpClient, HttpResponse, StreamEvent,
};

/// Plays back a fixed list of results and records every requested URL.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
    requests: Arc<Mutex<Vec<String>>>,
    requested_at: Mutex<Vec<Instant>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<HttpResponse, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
            requested_at: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Time elapsed between consecutive requests.
    pub fn gaps(&self) -> Vec<Duration> {
        self.requested_at
            .lock()
            .unwrap()
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    fn next(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.requested_at.lock().unwrap().push(Instant::now());
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(network_error("no scripted response left")))
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.next(url)
    }

    async fn post(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.next(url)
    }
}

pub fn network_error(message: &str) -> FetchError {
    FetchError::new(FailureKind::Network, message)
}

pub fn text_page(text: &str, size: u64, more: bool) -> Result<HttpResponse, FetchError> {
    let response = HttpResponse::new(200)
        .with_header("X-Text-Size", size.to_string())
        .with_body(text.to_string());
    Ok(if more {
        response.with_header("X-More-Data", "true")
    } else {
        response
    })
}

pub fn json(body: serde_json::Value) -> Result<HttpResponse, FetchError> {
    Ok(HttpResponse::new(200).with_body(body.to_string()))
}

/// Drains a stream until its terminal event, failing the test if that takes
/// longer than five seconds.
pub async fn collect<T, S>(mut stream: EventStream<T, S>) -> Vec<StreamEvent<T, S>>
where
    T: Send + 'static,
    S: Send + 'static,
{
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = stream.next_event().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
    })
    .await
    .expect("stream did not terminate in time");
    events
}
