//! # quotemate
//!
//! A small web service that checks Australian tradie quotes with a language
//! model. A homeowner pastes the quote text (or uploads the PDF), and the
//! page comes back with a plain-English review: verdict, line items, red
//! flags, questions to ask and a clarification email.
//!
//! ## Request Flow
//!
//! ```text
//! POST /
//!  │
//!  ├─ 1. Form     multipart fields, trimmed
//!  ├─ 2. Upload   PDF-only, staged under a unique name
//!  ├─ 3. Extract  selectable text via lopdf (spawn_blocking)
//!  ├─ 4. Check    validation + credential, then one completion call
//!  └─ 5. Page     askama template with the form echoed back
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quotemate::{OpenAiCompletionClient, QuoteServer, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY").ok())
//!         .port(8080)
//!         .build()?;
//!     let client = Arc::new(OpenAiCompletionClient::new(config.model.clone()));
//!     QuoteServer::new(config, client).await?.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `quotemate` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod check;
pub mod config;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use check::{check_quote, QuoteReport};
pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{CompletionError, QuoteError, ServerError};
pub use page::{FormEcho, Outcome, QuotePage};
pub use pipeline::input::QuoteRequest;
pub use pipeline::llm::{CompletionClient, OpenAiCompletionClient};
pub use server::{router, AppState, QuoteServer};
