//! Adapter to the remote text-generation service.
//!
//! The concierge is stateless per call: it serializes the prior history,
//! attaches the fixed persona instruction exactly once, submits the current
//! input as the newest user content, and returns the generated text. One
//! best-effort attempt per call; no retries, no caching.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::constants::SYSTEM_PROMPT;
use crate::core::message::Message;
use crate::utils::url::construct_api_url;

/// Distinguishable failure modes at the client boundary. None of these
/// crash the session; the controller converts them into the in-persona
/// fallback reply.
#[derive(Debug)]
pub enum ConciergeError {
    /// Network-level failure or timeout before a response arrived.
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Status { code: u16, body: String },
    /// The response body could not be decoded as a completion payload.
    Malformed(String),
    /// The payload parsed but carried no usable reply text.
    EmptyReply,
}

impl fmt::Display for ConciergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConciergeError::Transport(e) => write!(f, "transport error: {e}"),
            ConciergeError::Status { code, body } => {
                write!(f, "API request failed with status {code}: {body}")
            }
            ConciergeError::Malformed(e) => write!(f, "malformed response: {e}"),
            ConciergeError::EmptyReply => write!(f, "response contained no reply text"),
        }
    }
}

impl std::error::Error for ConciergeError {}

/// The persona-constrained reply service the session controller talks to.
#[async_trait]
pub trait Concierge: Send + Sync {
    /// Produce a reply to `input`, given the transcript as it existed
    /// strictly before the current user turn.
    async fn reply(&self, input: &str, history: &[Message]) -> Result<String, ConciergeError>;
}

/// HTTP concierge speaking the OpenAI-compatible `chat/completions` shape.
pub struct ArixConcierge {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ArixConcierge {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Build the wire messages for one call: persona instruction first, then the
/// prior history in order, then the current input as the newest user turn.
pub fn build_request_messages(input: &str, history: &[Message]) -> Vec<ChatMessage> {
    let mut api_messages = Vec::with_capacity(history.len() + 2);

    api_messages.push(ChatMessage {
        role: "system".to_string(),
        content: SYSTEM_PROMPT.to_string(),
    });

    for msg in history {
        api_messages.push(ChatMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        });
    }

    api_messages.push(ChatMessage {
        role: "user".to_string(),
        content: input.to_string(),
    });

    api_messages
}

#[async_trait]
impl Concierge for ArixConcierge {
    async fn reply(&self, input: &str, history: &[Message]) -> Result<String, ConciergeError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: build_request_messages(input, history),
            stream: false,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let chat_url = construct_api_url(&self.base_url, "chat/completions");
        debug!(model = %self.model, history_len = history.len(), "dispatching concierge request");

        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ConciergeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ConciergeError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ConciergeError::Transport(e.to_string()))?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ConciergeError::Malformed(e.to_string()))?;

        let reply = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(ConciergeError::EmptyReply);
        }

        debug!(reply_len = reply.len(), "concierge reply received");
        Ok(reply.to_string())
    }
}
