//! Prompts for the quote review.
//!
//! The completion service is prompted, not programmed: section headings,
//! field order and placeholder wording all shift the quality of the answer.
//! Keeping both halves of the prompt here means unit tests can pin the exact
//! text without a live model.

/// Fixed system instruction sent with every quote.
pub const SYSTEM_PROMPT: &str = r#"You are MyQuoteMate, an Australia-focused tradie quote checker.

Goal:
Help homeowners and small businesses understand a tradie quote in plain English, identify potential red flags, and prepare smart follow-up questions before accepting or paying.

Rules:
- Do NOT provide legal advice.
- Do NOT claim exact market pricing or guaranteed savings.
- Use cautious wording such as "may", "often", "typically", and "worth confirming".
- Use Australian terminology like GST, call-out fee, licensed tradie, compliance certificate.
- Be neutral and non-accusatory. Do not imply dishonesty.

If trade type or location is missing, proceed with reasonable assumptions and state them.

Output MUST follow this structure exactly with headings:

1. Verdict (Looks reasonable | Possibly high | Needs clarification)
2. Quick summary (3–6 bullet points)
3. Quote breakdown (plain English, grouped)
4. Red flags or risks (bullets)
5. Missing or unclear scope (bullets)
6. Questions to ask the tradie (8–12)
7. Suggested email to request clarification (short, polite)
8. Disclaimer (one short paragraph)"#;

const NOT_PROVIDED: &str = "Not provided";
const NO_QUOTE_TEXT: &str = "(not provided)";
const NO_PDF_TEXT: &str = "(no readable text extracted from PDF)";

/// The two halves of a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePrompt {
    pub system: &'static str,
    pub user: String,
}

impl QuotePrompt {
    /// Assemble the prompt for one quote. Inputs are expected to be trimmed.
    pub fn new(trade: &str, location: &str, quote_text: &str, pdf_text: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            user: user_message(trade, location, quote_text, pdf_text),
        }
    }
}

/// Build the per-request user message.
pub fn user_message(trade: &str, location: &str, quote_text: &str, pdf_text: &str) -> String {
    format!(
        "Trade: {}\nLocation: {}\n\nQUOTE TEXT:\n{}\n\nPDF EXTRACTED TEXT:\n{}",
        or_placeholder(trade, NOT_PROVIDED),
        or_placeholder(location, NOT_PROVIDED),
        or_placeholder(quote_text, NO_QUOTE_TEXT),
        or_placeholder(pdf_text, NO_PDF_TEXT),
    )
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
