use std::sync::Arc;
use std::time::Duration;

use encoding_rs::{Decoder, UTF_8};
use jen_core::TextChunk;
use jen_logging::{jen_debug, jen_warn};
use tokio_util::sync::CancellationToken;

use crate::client::HttpClient;
use crate::endpoints::with_start;
use crate::retry::pause;
use crate::stream::{Emitter, EventStream};
use crate::FetchError;

const TEXT_SIZE_HEADER: &str = "x-text-size";
const MORE_DATA_HEADER: &str = "x-more-data";

#[derive(Debug, Clone)]
pub struct ProgressiveTextSettings {
    pub poll_interval: Duration,
    /// Request failures tolerated in a row before giving up. Zero means the
    /// first failure ends the stream.
    pub max_retry_attempts_on_network_failure: u32,
}

impl Default for ProgressiveTextSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            max_retry_attempts_on_network_failure: 0,
        }
    }
}

/// Console log of a build, fetched from a byte offset and emitted as it grows.
///
/// Emits `Data(text)` for every non-empty page, then `End(())` once the
/// server stops announcing more data, or `Error` on a failed request.
pub struct ProgressiveTextStream {
    client: Arc<dyn HttpClient>,
    url: String,
    settings: ProgressiveTextSettings,
}

impl ProgressiveTextStream {
    pub fn new(client: Arc<dyn HttpClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            settings: ProgressiveTextSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ProgressiveTextSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Starts polling on the current tokio runtime.
    pub fn start(self) -> EventStream<String, ()> {
        EventStream::spawn(move |emitter, cancel| self.run(emitter, cancel))
    }

    async fn run(self, emitter: Emitter<String, ()>, cancel: CancellationToken) {
        let mut decoder = UTF_8.new_decoder_without_bom_handling();
        let mut offset = 0;
        let mut failures = 0;

        loop {
            let Some(fetched) = cancel.run_until_cancelled(self.fetch_chunk(offset, &mut decoder)).await
            else {
                return;
            };

            let chunk = match fetched {
                Ok(chunk) => chunk,
                Err(err) => {
                    if failures >= self.settings.max_retry_attempts_on_network_failure {
                        emitter.error(err.into());
                        return;
                    }
                    failures += 1;
                    jen_warn!(
                        "Console fetch failed ({}). Retrying after {}ms",
                        err,
                        self.settings.poll_interval.as_millis()
                    );
                    if !pause(&cancel, self.settings.poll_interval).await {
                        return;
                    }
                    continue;
                }
            };
            failures = 0;

            if !chunk.text.is_empty() && !emitter.data(chunk.text) {
                return;
            }

            if !chunk.has_more {
                emitter.end(());
                return;
            }

            offset = chunk.size;
            if !pause(&cancel, self.settings.poll_interval).await {
                return;
            }
        }
    }

    async fn fetch_chunk(&self, offset: u64, decoder: &mut Decoder) -> Result<TextChunk, FetchError> {
        let response = self.client.get(&with_start(&self.url, offset)).await?;

        let has_more = response
            .header(MORE_DATA_HEADER)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        let size = match response
            .header(TEXT_SIZE_HEADER)
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            Some(size) => size,
            None => {
                jen_debug!("Missing {} header; advancing by body length", TEXT_SIZE_HEADER);
                offset + response.body.len() as u64
            }
        };

        Ok(TextChunk {
            offset,
            size,
            text: decode(decoder, &response.body, !has_more),
            has_more,
        })
    }
}

/// Decodes UTF-8 across page boundaries: a multi-byte sequence split between
/// two pages is held back until its tail arrives.
fn decode(decoder: &mut Decoder, bytes: &[u8], last: bool) -> String {
    let Some(capacity) = decoder.max_utf8_buffer_length(bytes.len()) else {
        return String::from_utf8_lossy(bytes).into_owned();
    };
    let mut text = String::with_capacity(capacity);
    let _ = decoder.decode_to_string(bytes, &mut text, last);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_multibyte_sequence_is_joined() {
        let mut decoder = UTF_8.new_decoder_without_bom_handling();
        let bytes = "naïve".as_bytes();
        let first = decode(&mut decoder, &bytes[..3], false);
        let second = decode(&mut decoder, &bytes[3..], true);
        assert_eq!(first, "na");
        assert_eq!(second, "ïve");
    }
}
