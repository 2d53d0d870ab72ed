//! HTTP endpoint handlers. These are thin wrappers that forward to the content service.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::error::ContentError;
use crate::logic::suggest_topics_or_empty;
use crate::protocol::*;
use crate::requests::ExerciseRequest;
use crate::scoring::{percentage, share_message, ShareContext};
use crate::session::GENERATION_ERROR_MESSAGE;
use crate::state::AppState;

/// JSON error reply: `{ "message": ... }`.
pub struct ApiError(StatusCode, String);

impl From<ContentError> for ApiError {
  fn from(e: ContentError) -> Self {
    match e {
      ContentError::Configuration(msg) => ApiError(StatusCode::SERVICE_UNAVAILABLE, msg),
      // Specific causes are logged by the content service, not returned.
      _ => ApiError(StatusCode::BAD_GATEWAY, GENERATION_ERROR_MESSAGE.into()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.0, Json(ErrorOut { message: self.1 })).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generation_enabled: state.generation_enabled() })
}

#[instrument(level = "info")]
pub async fn http_get_catalog() -> impl IntoResponse {
  Json(catalog())
}

#[instrument(level = "info", skip(state), fields(temperature = body.temperature))]
pub async fn http_post_topics(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TopicsIn>,
) -> Result<Json<TopicsOut>, ApiError> {
  let content = state.require_content()?;
  let topics = suggest_topics_or_empty(content, body.temperature).await;
  info!(target: "http", count = topics.len(), "HTTP topics served");
  Ok(Json(TopicsOut { topics }))
}

#[instrument(level = "info", skip(state, body), fields(language = %body.language, level = %body.level))]
pub async fn http_post_exercise(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExerciseRequest>,
) -> Result<Json<ExerciseOut>, ApiError> {
  let content = state.require_content()?;
  let exercise = content.generate_exercise(&body).await?;
  info!(target: "http", id = %exercise.id, blanks = exercise.blanks.len(), "HTTP exercise served");
  Ok(Json(to_exercise_out(exercise, &body.language)))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), target = %body.target_language))]
pub async fn http_post_translate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranslateIn>,
) -> Result<Json<TranslateOut>, ApiError> {
  let content = state.require_content()?;
  let translation = content.translate(&body.text, &body.target_language).await;
  Ok(Json(TranslateOut { translation }))
}

#[instrument(level = "info", skip(body), fields(language = %body.language, blanks = body.exercise.blanks.len()))]
pub async fn http_post_share(Json(body): Json<ShareIn>) -> impl IntoResponse {
  let ctx = ShareContext { topic: body.topic.as_deref(), level: body.level, language: &body.language };
  let message = share_message(&body.exercise, &body.answers, &ctx);
  let score = crate::scoring::score(&body.exercise, &body.answers);
  let total = body.exercise.blanks.len();
  Json(ShareOut { score, total, percentage: percentage(score, total), message })
}
