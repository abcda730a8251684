//! Page handlers.
//!
//! Both handlers answer with the same page. Validation and upstream
//! failures are part of the page (status 200); only an unreadable request
//! or a template failure becomes an error status, via [`ServerError`].

use crate::check::check_quote;
use crate::error::ServerError;
use crate::page::{FormEcho, Outcome, QuotePage};
use crate::pipeline::input::QuoteRequest;
use crate::server::state::AppState;
use askama::Template;
use axum::extract::{Multipart, State};
use axum::response::Html;
use tracing::{debug, info};

/// `GET /`: the empty form.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let page = QuotePage::empty().keeps_uploads(state.config().keep_uploads);
    Ok(Html(page.render()?))
}

/// `POST /`: run a quote check and render the outcome with the form echoed.
pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, ServerError> {
    let request = QuoteRequest::from_multipart(&mut multipart).await?;
    debug!(
        "Quote submission: trade='{}', location='{}', {} chars pasted, upload={}",
        request.trade,
        request.location,
        request.quote_text.len(),
        request.upload.is_some()
    );

    let echo = FormEcho::from(&request);
    let result = check_quote(state.config(), state.client(), request).await;
    if let Err(e) = &result {
        info!("Quote check rejected: {}", e);
    }

    let page = QuotePage::new(echo, Outcome::from(result))
        .keeps_uploads(state.config().keep_uploads);
    Ok(Html(page.render()?))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
