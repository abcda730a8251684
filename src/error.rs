//! Error types for the quotemate service.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`QuoteError`] is **rendered**: the quote check was rejected (bad file
//!   type, nothing to analyse, no credential, upstream failure). The handler
//!   embeds the message in a normal page and echoes the form back, so the
//!   user can fix the input without retyping it.
//!
//! * [`ServerError`] is **transport**: the request could not be read or the
//!   page could not be produced at all. Mapped to an HTTP status by
//!   [`IntoResponse`].
//!
//! PDF extraction failures are absent from both: an unreadable
//! PDF degrades to empty text (see [`crate::pipeline::extract`]).

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the completion-service credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A rejected quote check. The `Display` text is shown to the user verbatim.
#[derive(Debug, Error)]
pub enum QuoteError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Uploaded file does not carry a `.pdf` suffix.
    #[error("Only PDF files are allowed.")]
    DisallowedFileType { filename: String },

    /// Neither pasted text nor PDF text is available.
    #[error("Please paste quote text. PDF upload is optional, and scanned PDFs may not be readable.")]
    MissingQuoteText,

    /// The upload could not be written to the staging directory.
    #[error("Could not store the uploaded PDF. Please paste the quote text instead.")]
    UploadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No completion-service credential was configured at startup.
    #[error("Server is missing {}.", API_KEY_ENV)]
    MissingCredential,

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The completion service failed (network, auth, rate limit, bad response).
    #[error("AI request failed: {0}")]
    Upstream(#[from] CompletionError),
}

/// Failure reported by a [`crate::pipeline::llm::CompletionClient`].
///
/// Carries the provider's own description, which ends up in the page.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures outside the page flow.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The multipart body was malformed or exceeded the body limit while streaming.
    #[error("Failed to read form submission: {0}")]
    Multipart(#[from] MultipartError),

    /// The page template failed to render.
    #[error("Failed to render page: {0}")]
    Template(#[from] askama::Error),

    /// Startup failure: bad bind address, listener or staging directory.
    #[error("Server startup failed: {0}")]
    Startup(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        assert_eq!(
            QuoteError::MissingCredential.to_string(),
            "Server is missing OPENAI_API_KEY."
        );
    }

    #[test]
    fn upstream_display_includes_cause() {
        let e = QuoteError::from(CompletionError::new("401 invalid api key"));
        assert_eq!(e.to_string(), "AI request failed: 401 invalid api key");
    }

    #[test]
    fn disallowed_file_display_hides_filename() {
        let e = QuoteError::DisallowedFileType {
            filename: "<script>.txt".into(),
        };
        assert_eq!(e.to_string(), "Only PDF files are allowed.");
    }

    #[test]
    fn startup_error_is_server_error_status() {
        let resp = ServerError::Startup("bind failed".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
