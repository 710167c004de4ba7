use url::Url;

/// Formats a duration the way the stage list shows it.
///
/// `0` -> `"00"`, `250` -> `"250 ms"`, `3_725_000` -> `"01 hrs, 02 min, 05 sec"`.
pub fn format_ms(ms: u64) -> String {
    if ms < 1 {
        return "00".to_string();
    }
    if ms < 1000 {
        return format!("{ms:02} ms");
    }

    let seconds = (ms / 1000) % 60;
    let minutes = (ms / (1000 * 60)) % 60;
    let hours = ms / (1000 * 60 * 60);

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours:02} hrs"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes:02} min"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds:02} sec"));
    }
    parts.join(", ")
}

/// Accepts absolute `http`/`https` URLs only.
pub fn is_valid_url(raw: &str) -> bool {
    let raw = raw.trim();
    let lower = raw.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }
    Url::parse(raw).is_ok()
}

pub fn remove_trailing_slash(raw: &str) -> &str {
    raw.strip_suffix('/').unwrap_or(raw)
}

/// `http://localhost:8080/queue/item/11/` -> `Some("11")`.
pub fn extract_queue_item_number(location: &str) -> Option<String> {
    location
        .split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .map(ToOwned::to_owned)
}
