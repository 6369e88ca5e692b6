use std::env;

use quiz_core::model::{ChatMessage, ChatRole, ChatTranscript};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ChatError;

pub const DEFAULT_CHAT_URL: &str = "http://localhost:3001/chat";

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl ChatConfig {
    /// Read `QUIZ_CHAT_URL` and `QUIZ_CHAT_API_KEY`, defaulting to the local chat backend.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidEndpoint` if `QUIZ_CHAT_URL` is not a URL.
    pub fn from_env() -> Result<Self, ChatError> {
        let endpoint = env::var("QUIZ_CHAT_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_URL.into());
        let api_key = env::var("QUIZ_CHAT_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Self {
            endpoint: Url::parse(endpoint.trim())?,
            api_key,
        })
    }
}

/// Client for the math helper chat backend.
///
/// The backend picks the model; this side only forwards the transcript.
#[derive(Clone)]
pub struct ChatService {
    client: Client,
    config: ChatConfig,
}

impl ChatService {
    /// # Errors
    ///
    /// Returns `ChatError::InvalidEndpoint` if the environment holds a bad URL.
    pub fn from_env() -> Result<Self, ChatError> {
        Ok(Self::new(ChatConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }

    /// Append `input` as a user message, send the transcript, and append the reply.
    ///
    /// The user message stays in the transcript even when the request fails.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::EmptyInput` for blank input (transcript untouched),
    /// or a transport, status, or empty-reply error.
    pub async fn send<'t>(
        &self,
        transcript: &'t mut ChatTranscript,
        input: &str,
    ) -> Result<&'t ChatMessage, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        transcript.push(ChatMessage::user(input));

        let reply = self.request(transcript.messages()).await;
        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, endpoint = %self.config.endpoint, "chat request failed");
                return Err(err);
            }
        };
        transcript.push(reply);
        transcript.last().ok_or(ChatError::EmptyResponse)
    }

    async fn request(&self, messages: &[ChatMessage]) -> Result<ChatMessage, ChatError> {
        let mut request = self
            .client
            .post(self.config.endpoint.clone())
            .json(&ChatRequest { messages });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ChatError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let message = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ChatError::EmptyResponse)?;
        let content = message
            .content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ChatError::EmptyResponse)?;

        Ok(ChatMessage {
            role: message.role.unwrap_or(ChatRole::Assistant),
            content,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    role: Option<ChatRole>,
    content: Option<String>,
}
