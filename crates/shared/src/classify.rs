use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ErrorBody, SearchFailure};

static KEY_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bkey\b").unwrap());

/// Whether a server error message is about the API key. Whole word,
/// case-sensitive: "invalid key" matches, "Key" and "keyboard" do not.
pub fn mentions_key(message: &str) -> bool {
    KEY_TOKEN.is_match(message)
}

/// Turn a failed search's body into a failure record. A missing body gives
/// an empty, non-key failure.
pub fn classify(body: Option<&ErrorBody>) -> SearchFailure {
    match body {
        Some(body) => SearchFailure {
            is_key_error: mentions_key(&body.error),
            message: body.error.clone(),
        },
        None => SearchFailure {
            message: String::new(),
            is_key_error: false,
        },
    }
}

/// Classify a raw response body. Empty or non-JSON bodies count as no body.
pub fn classify_raw(raw: &str) -> SearchFailure {
    let body = if raw.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<ErrorBody>(raw).ok()
    };
    let failure = classify(body.as_ref());
    tracing::warn!(message = %failure.message, key = failure.is_key_error, "search failed");
    failure
}
