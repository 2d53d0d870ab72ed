//! Content requests: topic suggestions, exercise generation, free translation.
//!
//! Failure policy per operation:
//!   - topics: decode problems give an empty list; only transport errors surface
//!   - exercise: all-or-nothing, every failure is an error
//!   - translate: any failure gives an empty string

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::backend::GenerativeBackend;
use crate::config::Prompts;
use crate::domain::Exercise;
use crate::error::{ContentError, ContentResult};
use crate::requests::{exercise_request, topics_request, translate_request, ExerciseRequest};
use crate::util::{preview, trunc_for_log};

/// Upper bound on suggestions kept from one response.
pub const TOPIC_COUNT: usize = 6;

#[derive(Clone)]
pub struct ContentService {
  backend: Arc<dyn GenerativeBackend>,
  prompts: Arc<Prompts>,
}

#[derive(Deserialize)]
struct TopicsPayload {
  #[serde(default)]
  topics: Vec<String>,
}

impl ContentService {
  pub fn new(backend: Arc<dyn GenerativeBackend>, prompts: Prompts) -> Self {
    Self { backend, prompts: Arc::new(prompts) }
  }

  /// Up to six fresh topic ideas. An empty list means "keep what you have".
  #[instrument(level = "info", skip(self), fields(provider = %self.backend.name()))]
  pub async fn suggest_topics(&self, temperature: f32) -> ContentResult<Vec<String>> {
    let req = topics_request(&self.prompts, temperature);
    let text = match self.backend.complete(&req).await {
      Ok(t) => t,
      Err(ContentError::Decode(e)) => {
        warn!(target: "content", error = %e, "Topic suggestion returned no payload");
        return Ok(vec![]);
      }
      Err(e) => return Err(e),
    };

    match serde_json::from_str::<TopicsPayload>(&text) {
      Ok(p) => {
        let topics: Vec<String> = p
          .topics
          .into_iter()
          .map(|t| t.trim().to_string())
          .filter(|t| !t.is_empty())
          .take(TOPIC_COUNT)
          .collect();
        info!(target: "content", count = topics.len(), "Topic suggestions received");
        Ok(topics)
      }
      Err(e) => {
        warn!(target: "content", error = %e, payload = %trunc_for_log(&text, 120), "Topic payload not decodable");
        Ok(vec![])
      }
    }
  }

  /// Generate one exercise. Never returns a partially valid exercise.
  #[instrument(
    level = "info",
    skip(self, req),
    fields(language = %req.language, level = %req.level, topic = ?req.topic(), temperature = req.temperature)
  )]
  pub async fn generate_exercise(&self, req: &ExerciseRequest) -> ContentResult<Exercise> {
    let model_req = exercise_request(&self.prompts, req);
    let start = Instant::now();

    let text = self.backend.complete(&model_req).await.map_err(|e| {
      error!(target: "content", elapsed = ?start.elapsed(), error = %e, "Model call failed during exercise generation");
      e
    })?;

    let mut exercise: Exercise = serde_json::from_str(&text).map_err(|e| {
      error!(target: "content", error = %e, payload = %trunc_for_log(&text, 200), "Exercise payload not decodable");
      ContentError::Decode(e.to_string())
    })?;
    exercise.validate().map_err(|e| {
      error!(target: "content", error = %e, "Exercise rejected");
      e
    })?;

    for note in exercise.shape_warnings() {
      warn!(target: "content", %note, "Exercise shape differs from what was requested");
    }

    exercise.id = Uuid::new_v4();
    info!(
      target: "content",
      exercise_id = %exercise.id,
      blanks = exercise.blanks.len(),
      elapsed = ?start.elapsed(),
      title_preview = %preview(&exercise.title, 40),
      "Exercise successfully generated"
    );
    Ok(exercise)
  }

  /// Translate free text. Empty string when nothing usable came back.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), %target_language))]
  pub async fn translate(&self, text: &str, target_language: &str) -> String {
    if text.trim().is_empty() { return String::new(); }

    let req = translate_request(&self.prompts, text, target_language);
    match self.backend.complete(&req).await {
      Ok(t) => t.trim().to_string(),
      Err(e) => {
        error!(target: "content", error = %e, "Translation failed");
        String::new()
      }
    }
  }
}
