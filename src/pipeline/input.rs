//! Input collection: turn a multipart form submission into a [`QuoteRequest`]
//! and stage an uploaded PDF on disk.
//!
//! ## Why stage to disk at all?
//!
//! The extractor works from a path, and keeping the upload directory as the
//! single place raw files land makes retention a deployment decision
//! (`--keep-uploads`) rather than something buried in the handler. Each
//! staged name gets a UUID prefix so two users uploading `quote.pdf` at the
//! same moment never overwrite each other's file.

use crate::error::QuoteError;
use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Form field names.
pub const FIELD_TRADE: &str = "trade";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_QUOTE_TEXT: &str = "quote_text";
pub const FIELD_QUOTE_PDF: &str = "quote_pdf";

/// Extensions accepted for uploads (compared lowercase).
const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// Fallback staged name when sanitising leaves nothing.
const FALLBACK_FILENAME: &str = "upload.pdf";

/// A file part from the form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// One quote submission, trimmed and defaulted.
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest {
    pub trade: String,
    pub location: String,
    pub quote_text: String,
    pub upload: Option<UploadedFile>,
}

impl QuoteRequest {
    /// Read every field of a multipart submission.
    ///
    /// Unknown fields are drained and ignored. A file part with no filename
    /// is how browsers send an empty file input, so it is treated as "no
    /// upload". Body-size violations surface here as a [`MultipartError`]
    /// carrying a 413 status.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut request = QuoteRequest::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                FIELD_TRADE => request.trade = field.text().await?.trim().to_string(),
                FIELD_LOCATION => request.location = field.text().await?.trim().to_string(),
                FIELD_QUOTE_TEXT => request.quote_text = field.text().await?.trim().to_string(),
                FIELD_QUOTE_PDF => {
                    let filename = field.file_name().unwrap_or("").to_string();
                    let bytes = field.bytes().await?;
                    if filename.is_empty() {
                        debug!("Empty file part ignored ({} bytes)", bytes.len());
                        continue;
                    }
                    request.upload = Some(UploadedFile { filename, bytes });
                }
                other => {
                    debug!("Ignoring unknown form field '{}'", other);
                    field.bytes().await?;
                }
            }
        }

        Ok(request)
    }
}

/// Check the suffix after the last `.` against the allowed extensions.
pub fn is_allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

static RE_UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Reduce a user-supplied filename to a safe single path component.
///
/// Path separators and whitespace become underscores, every other character
/// outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing dots and
/// underscores are stripped so the result can never be `..` or a hidden file.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = RE_UNSAFE_CHARS.replace_all(&spaced, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the unique staged name for an upload.
pub fn staged_name(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), secure_filename(filename))
}

/// An upload written to the staging directory.
///
/// Call [`StagedUpload::discard`] once the file has been read. Dropping an
/// undiscarded value still removes the file (blocking), so an early return
/// or panic after staging cannot leak it. Nothing is removed when retention
/// was requested.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    keep: bool,
    removed: bool,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged file unless retention was requested.
    pub async fn discard(mut self) {
        if self.keep {
            return;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed staged upload {}", self.path.display()),
            Err(e) => warn!("Failed to remove staged upload {}: {}", self.path.display(), e),
        }
        self.removed = true;
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.keep || self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged upload {} on drop", self.path.display()),
            Err(e) => warn!("Failed to remove staged upload {}: {}", self.path.display(), e),
        }
    }
}

/// Write an upload into `dir` under a collision-free name.
pub async fn stage_upload(
    dir: &Path,
    upload: &UploadedFile,
    keep: bool,
) -> Result<StagedUpload, QuoteError> {
    let path = dir.join(staged_name(&upload.filename));

    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|source| QuoteError::UploadFailed {
            path: path.clone(),
            source,
        })?;

    info!(
        "Staged upload '{}' → {} ({} bytes)",
        upload.filename,
        path.display(),
        upload.bytes.len()
    );

    Ok(StagedUpload {
        path,
        keep,
        removed: false,
    })
}
