//! Pipeline stages for a quote check.
//!
//! Each submodule implements one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ postprocess ──▶ llm
//! (form)    (lopdf)     (cleanup)       (chat completion)
//! ```
//!
//! 1. [`input`]: read the multipart form, vet and stage the optional PDF
//! 2. [`extract`]: best-effort text layer, on the blocking pool
//! 3. [`postprocess`]: whitespace and invisible-character cleanup
//! 4. [`llm`]: the single network call, behind the [`llm::CompletionClient`] seam

pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
