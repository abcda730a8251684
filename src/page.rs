//! Page rendering: a typed view model over the askama template.
//!
//! The handler never touches markup. It builds a [`QuotePage`] from the
//! echoed form values and one [`Outcome`], then calls
//! [`askama::Template::render`]. Because the outcome is a single enum, the
//! page cannot show an error and a result at the same time.

use crate::check::QuoteReport;
use crate::error::QuoteError;
use crate::pipeline::input::QuoteRequest;
use askama::Template;
use chrono::{Datelike, Utc};

/// Suggestions offered in the trade dropdown.
pub const TRADE_SUGGESTIONS: &[&str] = &[
    "Plumbing",
    "Electrical",
    "Renovation",
    "Hot Water",
    "Roofing",
    "Painting",
    "Fencing",
    "Other",
];

/// Display format for the generation timestamp.
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// What the user typed, sent back so nothing needs retyping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormEcho {
    pub trade: String,
    pub location: String,
    pub quote_text: String,
}

impl From<&QuoteRequest> for FormEcho {
    fn from(request: &QuoteRequest) -> Self {
        Self {
            trade: request.trade.clone(),
            location: request.location.clone(),
            quote_text: request.quote_text.clone(),
        }
    }
}

/// The three mutually exclusive page states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fresh form, nothing submitted yet.
    Empty,
    /// The check was rejected; the message is shown above the form.
    Rejected(String),
    /// The model answered.
    Rendered(RenderedReport),
}

impl From<Result<QuoteReport, QuoteError>> for Outcome {
    fn from(result: Result<QuoteReport, QuoteError>) -> Self {
        match result {
            Ok(report) => Outcome::Rendered(RenderedReport::from(report)),
            Err(e) => Outcome::Rejected(e.to_string()),
        }
    }
}

/// A model answer ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub text: String,
    pub generated_at: String,
}

impl From<QuoteReport> for RenderedReport {
    fn from(report: QuoteReport) -> Self {
        Self {
            text: report.text,
            generated_at: report.generated_at.format(GENERATED_AT_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOption {
    pub label: String,
    pub selected: bool,
}

/// Everything the template needs, built once per response.
#[derive(Template)]
#[template(path = "index.html")]
pub struct QuotePage {
    trade_options: Vec<TradeOption>,
    location: String,
    quote_text: String,
    outcome: Outcome,
    keeps_uploads: bool,
    year: i32,
}

impl QuotePage {
    pub fn new(form: FormEcho, outcome: Outcome) -> Self {
        Self {
            trade_options: trade_options(&form.trade),
            location: form.location,
            quote_text: form.quote_text,
            outcome,
            keeps_uploads: false,
            year: Utc::now().year(),
        }
    }

    /// The initial GET page.
    pub fn empty() -> Self {
        Self::new(FormEcho::default(), Outcome::Empty)
    }

    /// Whether the server retains staged PDFs; drives the privacy FAQ.
    pub fn keeps_uploads(mut self, keep: bool) -> Self {
        self.keeps_uploads = keep;
        self
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Rejected(message) => Some(message.as_str()),
            _ => None,
        }
    }

    fn report(&self) -> Option<&RenderedReport> {
        match &self.outcome {
            Outcome::Rendered(report) => Some(report),
            _ => None,
        }
    }
}

/// Dropdown entries with the submitted trade preselected. A trade outside the
/// suggestions is appended so the echo never silently drops it.
fn trade_options(selected: &str) -> Vec<TradeOption> {
    let mut options: Vec<TradeOption> = TRADE_SUGGESTIONS
        .iter()
        .map(|label| TradeOption {
            label: (*label).to_string(),
            selected: *label == selected,
        })
        .collect();
    if !selected.is_empty() && !TRADE_SUGGESTIONS.iter().any(|s| *s == selected) {
        options.push(TradeOption {
            label: selected.to_string(),
            selected: true,
        });
    }
    options
}
