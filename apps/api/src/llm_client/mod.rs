//! AI gateway: every generative call in the service goes through `AiGateway`.
//!
//! Feature modules own their prompts and response parsing. The gateway logs
//! failures and hands them back unchanged; call sites pick the fallback.
//! No retries. The HTTP client timeout is the only bound on a call.
//!
//! Model: gemini-2.5-flash, fixed in `MODEL`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all AI calls.
pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured for the AI service")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyContent,

    #[error("model output was not the expected JSON shape")]
    Unparsable,
}

/// What a call site asks of the model.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    /// Ask for `application/json` output.
    pub json: bool,
    /// Let the model consult web search (used for trend lookup).
    pub grounded: bool,
}

/// Anything that turns a prompt into text. `GeminiClient` in production,
/// scripted doubles in tests.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, AiError>;
}

// ── Gemini wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint, bound to one API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, AiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, AiError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: request.prompt,
                }],
            }],
            system_instruction: request.system.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text }],
            }),
            generation_config: request.json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
            tools: if request.grounded {
                vec![serde_json::json!({ "googleSearch": {} })]
            } else {
                Vec::new()
            },
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response.json().await?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "AI call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        parsed.text().ok_or(AiError::EmptyContent)
    }
}

/// The single chokepoint for model calls. Holds no model when no API key
/// is configured, in which case every call fails with `NotConfigured`.
#[derive(Clone)]
pub struct AiGateway {
    model: Option<Arc<dyn TextModel>>,
}

impl AiGateway {
    pub fn new(model: Option<Arc<dyn TextModel>>) -> Self {
        Self { model }
    }

    pub fn from_api_key(api_key: Option<String>, timeout: Duration) -> Result<Self, AiError> {
        let model = match api_key {
            Some(key) => Some(Arc::new(GeminiClient::new(key, timeout)?) as Arc<dyn TextModel>),
            None => None,
        };
        Ok(Self::new(model))
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Runs one request. `label` names the call site in logs.
    pub async fn run(&self, label: &str, request: GenerateRequest<'_>) -> Result<String, AiError> {
        let result = match &self.model {
            Some(model) => model.generate(&request).await,
            None => Err(AiError::NotConfigured),
        };
        if let Err(e) = &result {
            error!("AI call '{label}' failed: {e}");
        }
        result
    }

    pub async fn generate_text(
        &self,
        label: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, AiError> {
        self.run(
            label,
            GenerateRequest {
                prompt,
                system,
                ..Default::default()
            },
        )
        .await
        .map(|text| text.trim().to_string())
    }

    /// Asks for JSON and parses it with `extract_json`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        label: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<T, AiError> {
        let text = self
            .run(
                label,
                GenerateRequest {
                    prompt,
                    system,
                    json: true,
                    grounded: false,
                },
            )
            .await?;
        extract_json(&text).ok_or(AiError::Unparsable)
    }

    /// Search-grounded generation. The search tool cannot be combined with
    /// a JSON response type, so the JSON is extracted from free text.
    pub async fn generate_grounded_json<T: DeserializeOwned>(
        &self,
        label: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<T, AiError> {
        let text = self
            .run(
                label,
                GenerateRequest {
                    prompt,
                    system,
                    json: false,
                    grounded: true,
                },
            )
            .await?;
        extract_json(&text).ok_or(AiError::Unparsable)
    }
}

/// Best-effort JSON extraction from model output.
///
/// Takes the span from the first `{` or `[` (whichever comes first) to the
/// last matching closer, which tolerates markdown fences and chatter around
/// the payload. Returns `None` and logs when nothing parses.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let span = json_span(text)?;
    match serde_json::from_str(span) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Could not parse model JSON: {e}");
            None
        }
    }
}

fn json_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    if end < start {
        warn!("Model output has no closing '{closer}'");
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
pub mod testing {
    //! Scripted model used by feature tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies in order; `Err` entries simulate outages.
    /// Records every prompt it receives.
    #[derive(Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn replying(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(String::from).map_err(String::from))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, AiError> {
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(AiError::Api {
                    status: 503,
                    message,
                }),
                None => Err(AiError::EmptyContent),
            }
        }
    }

    pub fn gateway(model: Arc<ScriptedModel>) -> AiGateway {
        AiGateway::new(Some(model as Arc<dyn TextModel>))
    }
}
