//! Completion client: send the quote prompt to the language model.
//!
//! The handler only ever talks to the [`CompletionClient`] trait, so tests
//! swap in a recording double and production uses [`OpenAiCompletionClient`].
//! All prompt wording lives in [`crate::prompts`]; this module only moves
//! text over the wire.
//!
//! ## One shot, no retries
//!
//! A quote review is interactive: the user is waiting on the page. The
//! `async-openai` client retries 429 and 5xx responses with exponential
//! backoff by default, for up to fifteen minutes. The client built here
//! carries a backoff with a zero elapsed-time budget, so every status is
//! final after the first attempt and the page shows the provider's message
//! straight away.

use crate::error::CompletionError;
use crate::prompts::QuotePrompt;
use async_openai::config::{OpenAIConfig, OPENAI_API_BASE};
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use edgequake_llm::{ChatMessage, ChatRole};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// An external text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the model's text, trimmed.
    ///
    /// `credential` is passed per call because it belongs to the server
    /// configuration, not to the client.
    async fn complete(
        &self,
        credential: &str,
        prompt: &QuotePrompt,
    ) -> Result<String, CompletionError>;
}

/// OpenAI chat completions, one attempt per call.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    model: String,
    api_base: String,
}

impl OpenAiCompletionClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_base: OPENAI_API_BASE.to_string(),
        }
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn client(&self, credential: &str) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(credential)
            .with_api_base(self.api_base.as_str());
        Client::with_config(config).with_backoff(single_attempt())
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        credential: &str,
        prompt: &QuotePrompt,
    ) -> Result<String, CompletionError> {
        let start = Instant::now();
        let request = build_request(&self.model, &build_messages(prompt))?;

        info!("Requesting quote review from model '{}'", self.model);

        match self.client(credential).chat().create(request).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    debug!(
                        "{} input tokens, {} output tokens, {:?}",
                        usage.prompt_tokens,
                        usage.completion_tokens,
                        start.elapsed()
                    );
                }
                response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .map(|content| content.trim().to_string())
                    .ok_or_else(|| CompletionError::new("the model returned no text"))
            }
            Err(e) => {
                warn!("Completion failed after {:?}: {}", start.elapsed(), e);
                Err(CompletionError::new(e.to_string()))
            }
        }
    }
}

/// A backoff that never schedules a second attempt.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// System instruction first, then the quote as the user turn.
fn build_messages(prompt: &QuotePrompt) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(prompt.system),
        ChatMessage::user(prompt.user.as_str()),
    ]
}

fn build_request(
    model: &str,
    messages: &[ChatMessage],
) -> Result<CreateChatCompletionRequest, CompletionError> {
    let messages = messages
        .iter()
        .map(to_request_message)
        .collect::<Result<Vec<_>, _>>()?;

    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .build()
        .map_err(|e| CompletionError::new(e.to_string()))
}

fn to_request_message(
    message: &ChatMessage,
) -> Result<ChatCompletionRequestMessage, CompletionError> {
    let built = match message.role {
        ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
        // The quote prompt only carries system and user turns.
        _ => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
    };
    built.map_err(|e| CompletionError::new(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const RATE_LIMITED: &str = r#"{"error":{"message":"Rate limit reached for gpt-4.1-mini","type":"rate_limit_exceeded","param":null,"code":"rate_limit_exceeded"}}"#;

    const REVIEW: &str = r#"{"id":"chatcmpl-1","object":"chat.completion","created":1760000000,"model":"gpt-4.1-mini","choices":[{"index":0,"message":{"role":"assistant","content":"  1. Verdict: Looks reasonable...\n"},"finish_reason":"stop"}],"usage":{"prompt_tokens":120,"completion_tokens":40,"total_tokens":160}}"#;

    /// Local stand-in for the chat completions endpoint.
    #[derive(Clone)]
    struct Upstream {
        status: StatusCode,
        body: &'static str,
        hits: Arc<AtomicUsize>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    async fn chat_completions(State(upstream): State<Upstream>, body: Bytes) -> impl IntoResponse {
        upstream.hits.fetch_add(1, Ordering::SeqCst);
        upstream
            .requests
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(&body).into_owned());
        (
            upstream.status,
            [(header::CONTENT_TYPE, "application/json")],
            upstream.body,
        )
    }

    async fn serve(status: StatusCode, body: &'static str) -> (String, Upstream) {
        let upstream = Upstream {
            status,
            body,
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/chat/completions", post(chat_completions))
            .with_state(upstream.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), upstream)
    }

    fn quote_prompt() -> QuotePrompt {
        QuotePrompt::new("Hot Water", "Hobart TAS", "Replace HWS $2400", "")
    }

    async fn complete_within(
        client: &OpenAiCompletionClient,
    ) -> Result<String, CompletionError> {
        tokio::time::timeout(
            Duration::from_secs(5),
            client.complete("sk-test", &quote_prompt()),
        )
        .await
        .expect("completion should settle without backing off")
    }

    #[test]
    fn client_keeps_configured_model() {
        let client = OpenAiCompletionClient::new("gpt-4.1-mini");
        assert_eq!(client.model(), "gpt-4.1-mini");
        assert_eq!(client.api_base(), OPENAI_API_BASE);
    }

    #[test]
    fn messages_are_system_then_user() {
        let prompt = QuotePrompt::new("Roofing", "", "Re-sheet roof $9800", "");
        let messages = build_messages(&prompt);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, prompt.system);
        assert_eq!(messages[1].content, prompt.user);

        let request = build_request("gpt-4.1-mini", &messages).unwrap();
        assert_eq!(request.model, "gpt-4.1-mini");
        assert!(matches!(
            request.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            request.messages[1],
            ChatCompletionRequestMessage::User(_)
        ));
    }

    #[test]
    fn backoff_never_schedules_a_retry() {
        use backoff::backoff::Backoff;
        let mut backoff = single_attempt();
        backoff.reset();
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(backoff.next_backoff(), None);
    }

    #[tokio::test]
    async fn rate_limit_fails_after_one_attempt() {
        let (base, upstream) = serve(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED).await;
        let client = OpenAiCompletionClient::new("gpt-4.1-mini").with_api_base(base);

        let err = complete_within(&client).await.unwrap_err();

        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        assert!(
            err.message.contains("Rate limit reached"),
            "got: {}",
            err.message
        );
    }

    #[tokio::test]
    async fn server_error_fails_after_one_attempt() {
        let (base, upstream) = serve(StatusCode::BAD_GATEWAY, "upstream unavailable").await;
        let client = OpenAiCompletionClient::new("gpt-4.1-mini").with_api_base(base);

        let err = complete_within(&client).await.unwrap_err();

        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        assert!(err.message.contains("upstream unavailable"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn successful_review_is_trimmed() {
        let (base, upstream) = serve(StatusCode::OK, REVIEW).await;
        let client = OpenAiCompletionClient::new("gpt-4.1-mini").with_api_base(base);

        let text = complete_within(&client).await.unwrap();

        assert_eq!(text, "1. Verdict: Looks reasonable...");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        let requests = upstream.requests.lock().unwrap();
        assert!(requests[0].contains(r#""model":"gpt-4.1-mini""#));
        assert!(requests[0].contains("Replace HWS $2400"));
    }
}
