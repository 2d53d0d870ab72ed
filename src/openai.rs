//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request either plain text or JSON constrained by a
//! strict `json_schema` response format.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload previews short to avoid PII leaks.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::backend::GenerativeBackend;
use crate::config::OpenAiSettings;
use crate::error::{ContentError, ContentResult};
use crate::requests::{ModelRequest, ModelTier, ResponseSchema};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

impl OpenAI {
  pub fn new(settings: &OpenAiSettings) -> ContentResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(|e| ContentError::Configuration(format!("HTTP client init failed: {}", e)))?;

    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      base_url: settings.base_url.trim_end_matches('/').to_string(),
      fast_model: settings.fast_model.clone(),
      strong_model: settings.strong_model.clone(),
    })
  }

  fn model_for(&self, tier: ModelTier) -> &str {
    match tier {
      ModelTier::Fast => &self.fast_model,
      ModelTier::Strong => &self.strong_model,
    }
  }
}

/// Shape the wire request for a provider-neutral `ModelRequest`.
fn build_chat_request(model: &str, req: &ModelRequest) -> ChatCompletionRequest {
  ChatCompletionRequest {
    model: model.to_string(),
    messages: vec![
      ChatMessageReq { role: "system".into(), content: req.system.clone() },
      ChatMessageReq { role: "user".into(), content: req.user.clone() },
    ],
    temperature: req.temperature,
    response_format: req.schema.as_ref().map(ResponseFormat::json_schema),
  }
}

#[async_trait]
impl GenerativeBackend for OpenAI {
  #[instrument(
    level = "info",
    skip(self, req),
    fields(model = %self.model_for(req.tier), structured = req.schema.is_some(), prompt_len = req.user.len())
  )]
  async fn complete(&self, req: &ModelRequest) -> ContentResult<String> {
    let model = self.model_for(req.tier);
    let url = format!("{}/chat/completions", self.base_url);
    let body = build_chat_request(model, req);
    let start = Instant::now();

    let res = self.client.post(&url)
      .header(USER_AGENT, "lexical-gap/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&body).send().await
      .map_err(|e| {
        error!(target: "content", elapsed = ?start.elapsed(), error = %e, "OpenAI request failed");
        ContentError::Transport(e.to_string())
      })?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(ContentError::Transport(format!("OpenAI HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| ContentError::Decode(format!("completion envelope: {}", e)))?;
    if let Some(usage) = &body.usage {
      info!(target: "content", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }

    let text = first_choice_text(body)?;
    info!(target: "content", elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    Ok(text)
  }

  fn name(&self) -> &str {
    "OpenAI"
  }
}

fn first_choice_text(body: ChatCompletionResponse) -> ContentResult<String> {
  let choice = body.choices.into_iter().next();
  if let Some(refusal) = choice.as_ref().and_then(|c| c.message.refusal.clone()) {
    return Err(ContentError::Decode(format!("model refused: {}", refusal)));
  }
  choice
    .and_then(|c| c.message.content)
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ContentError::Decode("empty completion".into()))
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  r#type: String,
  json_schema: JsonSchemaFormat,
}
#[derive(Serialize)]
struct JsonSchemaFormat { name: String, strict: bool, schema: Value }

impl ResponseFormat {
  fn json_schema(s: &ResponseSchema) -> Self {
    Self {
      r#type: "json_schema".into(),
      json_schema: JsonSchemaFormat { name: s.name.to_string(), strict: true, schema: s.schema.clone() },
    }
  }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
  #[serde(default)] refusal: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
