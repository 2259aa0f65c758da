//! HTTP clients for the supported plan providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 1200;

const OPENAI_MODEL: &str = "gpt-4o";
const ANTHROPIC_MODEL: &str = "claude-opus-4-20250514";
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const OPENROUTER_MODEL: &str = "openai/gpt-4o";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A hosted model API this crate can ask for a slide plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    OpenRouter,
}

impl Provider {
    /// Parse a user-supplied provider name, case- and whitespace-tolerant.
    pub fn parse(name: &str) -> Result<Self, LlmError> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            other => Err(LlmError::UnsupportedProvider(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned {status}: {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("{provider} reply carried no text")]
    MalformedReply { provider: Provider },
}

/// Base URLs per provider, swappable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub anthropic: String,
    /// Base of the `models/` collection; the model and verb are appended.
    pub gemini: String,
    pub openrouter: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com/v1/chat/completions".to_string(),
            anthropic: "https://api.anthropic.com/v1/messages".to_string(),
            gemini: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            openrouter: "https://aipipe.org/openrouter/v1/chat/completions".to_string(),
        }
    }
}

/// One client serves all providers; credentials travel per call, so a single
/// instance can be shared across requests with different keys.
pub struct LlmClient {
    http: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl LlmClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints: ProviderEndpoints::default(),
        }
    }

    /// Client with a request timeout covering the whole exchange.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            endpoints: ProviderEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Send `prompt` and return the reply text verbatim.
    pub async fn complete(
        &self,
        provider: Provider,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        match provider {
            Provider::OpenAi => {
                self.chat_completion(provider, &self.endpoints.openai, OPENAI_MODEL, api_key, prompt)
                    .await
            }
            Provider::OpenRouter => {
                self.chat_completion(
                    provider,
                    &self.endpoints.openrouter,
                    OPENROUTER_MODEL,
                    api_key,
                    prompt,
                )
                .await
            }
            Provider::Anthropic => self.anthropic(api_key, prompt).await,
            Provider::Gemini => self.gemini(api_key, prompt).await,
        }
    }

    /// OpenAI-style `chat/completions`, shared by OpenAI and OpenRouter.
    async fn chat_completion(
        &self,
        provider: Provider,
        url: &str,
        model: &str,
        api_key: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        let response = check_status(provider, response).await?;
        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::MalformedReply { provider })
    }

    async fn anthropic(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let provider = Provider::Anthropic;
        let request = AnthropicRequest {
            model: ANTHROPIC_MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = self
            .http
            .post(&self.endpoints.anthropic)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        let response = check_status(provider, response).await?;
        let reply: AnthropicResponse = response
            .json()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        reply
            .content
            .into_iter()
            .next()
            .map(|content| content.text)
            .ok_or(LlmError::MalformedReply { provider })
    }

    async fn gemini(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let provider = Provider::Gemini;
        let url = format!("{}/{}:generateContent", self.endpoints.gemini, GEMINI_MODEL);
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
        };
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        let response = check_status(provider, response).await?;
        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|source| LlmError::Request { provider, source })?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(LlmError::MalformedReply { provider })
    }
}

impl Default for LlmClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn check_status(
    provider: Provider,
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiReplyPart>,
}

#[derive(Deserialize)]
struct GeminiReplyPart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_provider_parsing() {
        assert_eq!(Provider::parse("openai").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::parse(" Anthropic ").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::parse("GEMINI").unwrap(), Provider::Gemini);
        assert_eq!(Provider::parse("openrouter").unwrap(), Provider::OpenRouter);
        assert!(matches!(
            Provider::parse("mistral"),
            Err(LlmError::UnsupportedProvider(name)) if name == "mistral"
        ));
    }

    #[test]
    fn test_provider_round_trips_through_display() {
        for provider in [
            Provider::OpenAi,
            Provider::Anthropic,
            Provider::Gemini,
            Provider::OpenRouter,
        ] {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[tokio::test]
    async fn test_openai_request_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o",
                "max_tokens": 1200,
                "messages": [{"role": "user", "content": "make slides"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"slides\":[]}"}}]}"#)
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            openai: format!("{}/v1/chat/completions", server.url()),
            ..Default::default()
        });
        let reply = client
            .complete(Provider::OpenAi, "sk-test", "make slides")
            .await
            .unwrap();
        assert_eq!(reply, r#"{"slides":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anthropic_headers_and_reply_shape() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "ak-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "claude-opus-4-20250514"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content":[{"type":"text","text":"plan text"}]}"#)
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            anthropic: format!("{}/v1/messages", server.url()),
            ..Default::default()
        });
        let reply = client
            .complete(Provider::Anthropic, "ak-test", "p")
            .await
            .unwrap();
        assert_eq!(reply, "plan text");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_gemini_key_travels_as_query_parameter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/gemini-2.0-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "g-test".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"gemini plan"}],"role":"model"}}]}"#,
            )
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            gemini: server.url(),
            ..Default::default()
        });
        let reply = client.complete(Provider::Gemini, "g-test", "p").await.unwrap();
        assert_eq!(reply, "gemini plan");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openrouter_uses_prefixed_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openrouter/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "openai/gpt-4o"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            openrouter: format!("{}/openrouter/v1/chat/completions", server.url()),
            ..Default::default()
        });
        let reply = client
            .complete(Provider::OpenRouter, "or-test", "p")
            .await
            .unwrap();
        assert_eq!(reply, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            openai: format!("{}/v1/chat/completions", server.url()),
            ..Default::default()
        });
        match client.complete(Provider::OpenAi, "k", "p").await {
            Err(LlmError::Api { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = LlmClient::new().with_endpoints(ProviderEndpoints {
            openai: format!("{}/v1/chat/completions", server.url()),
            ..Default::default()
        });
        assert!(matches!(
            client.complete(Provider::OpenAi, "k", "p").await,
            Err(LlmError::MalformedReply { .. })
        ));
    }
}
