//! Request and error types shared by all gateway implementations.

use std::time::Duration;

use thiserror::Error;

/// One text-generation call: a model, an output budget, a system
/// instruction and the user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub user: String,
}

/// Failures talking to the model service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model gateway timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("request to model gateway failed: {0}")]
    Http(String),

    #[error("model gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode model gateway response: {0}")]
    Decode(String),

    #[error("model gateway returned no text content")]
    EmptyContent,
}

impl GatewayError {
    /// Whether this failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Shorten long prompts and model output for log lines.
pub(crate) fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={char_count}]"));
    preview
}
