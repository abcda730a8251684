//! Quote check entry point: the whole request flow after form parsing.
//!
//! ```text
//! QuoteRequest
//!  │
//!  ├─ 1. Upload   reject non-PDF names, stage to disk
//!  ├─ 2. Extract  best-effort text from the staged PDF
//!  ├─ 3. Validate at least one text source is non-empty
//!  ├─ 4. Config   credential present? (no network if not)
//!  ├─ 5. Prompt   fixed system instruction + per-quote user message
//!  └─ 6. Model    one completion call → QuoteReport
//! ```
//!
//! Every step either advances or returns a [`QuoteError`] that the page
//! renders. There is no partial result.

use crate::config::ServerConfig;
use crate::error::QuoteError;
use crate::pipeline::extract::extract_pdf_text;
use crate::pipeline::input::{is_allowed_file, stage_upload, QuoteRequest};
use crate::pipeline::llm::CompletionClient;
use crate::prompts::QuotePrompt;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// A successful review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteReport {
    /// The model's answer, treated as opaque text.
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// Run one quote check.
///
/// # Errors
/// - [`QuoteError::DisallowedFileType`] before anything touches the disk
/// - [`QuoteError::UploadFailed`] if the staging directory is unwritable
/// - [`QuoteError::MissingQuoteText`] when both text sources are empty
/// - [`QuoteError::MissingCredential`] without calling `client`
/// - [`QuoteError::Upstream`] when the completion call fails
pub async fn check_quote(
    config: &ServerConfig,
    client: &dyn CompletionClient,
    request: QuoteRequest,
) -> Result<QuoteReport, QuoteError> {
    let QuoteRequest {
        trade,
        location,
        quote_text,
        upload,
    } = request;

    // ── Step 1–2: Upload + extraction ────────────────────────────────────
    let pdf_text = match upload {
        Some(upload) => {
            if !is_allowed_file(&upload.filename) {
                info!("Rejected upload '{}': not a PDF", upload.filename);
                return Err(QuoteError::DisallowedFileType {
                    filename: upload.filename,
                });
            }
            let staged = stage_upload(&config.upload_dir, &upload, config.keep_uploads).await?;
            let extraction = extract_pdf_text(staged.path()).await;
            staged.discard().await;
            if !extraction.is_readable() {
                debug!("Falling back to pasted text for '{}'", upload.filename);
            }
            extraction.into_text()
        }
        None => String::new(),
    };

    // ── Step 3: Validate ─────────────────────────────────────────────────
    if quote_text.is_empty() && pdf_text.is_empty() {
        return Err(QuoteError::MissingQuoteText);
    }

    // ── Step 4: Credential ───────────────────────────────────────────────
    let Some(api_key) = config.api_key.as_deref() else {
        warn!("Quote submitted but no completion credential is configured");
        return Err(QuoteError::MissingCredential);
    };

    // ── Step 5–6: Prompt + model ─────────────────────────────────────────
    let prompt = QuotePrompt::new(&trade, &location, &quote_text, &pdf_text);
    debug!(
        "Prompt assembled: {} chars pasted, {} chars from PDF",
        quote_text.len(),
        pdf_text.len()
    );

    let text = client.complete(api_key, &prompt).await?;
    info!("Quote review complete: {} chars", text.len());

    Ok(QuoteReport {
        text,
        generated_at: Utc::now(),
    })
}
