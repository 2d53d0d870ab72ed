//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Running session effects against the content service
//!   - Spawning effects so their completions come back to the owning connection

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, instrument};

use crate::content::ContentService;
use crate::session::{Effect, Event};
use crate::state::AppState;

/// Topic suggestions with every failure folded into "no new topics".
#[instrument(level = "info", skip(content))]
pub async fn suggest_topics_or_empty(content: &ContentService, temperature: f32) -> Vec<String> {
  match content.suggest_topics(temperature).await {
    Ok(topics) => topics,
    Err(e) => {
      error!(target: "content", error = %e, "Topic suggestion failed; keeping previous suggestions");
      vec![]
    }
  }
}

/// Execute one effect and produce the completion event for the reducer.
pub async fn run_effect(content: &ContentService, effect: Effect) -> Event {
  match effect {
    Effect::Generate { ticket, request } => {
      let outcome = content.generate_exercise(&request).await;
      Event::GenerationFinished { ticket, outcome }
    }
    Effect::Translate { ticket, text } => {
      let text = content.translate(&text, &ticket.language).await;
      Event::TranslationFinished { ticket, text }
    }
    Effect::SuggestTopics { temperature } => {
      let topics = suggest_topics_or_empty(content, temperature).await;
      Event::TopicsFinished { topics }
    }
  }
}

/// Run `effect` in the background; its completion is sent to `events`.
pub fn spawn_effect(state: &AppState, effect: Effect, events: UnboundedSender<Event>) {
  let Some(content) = state.content.clone() else {
    error!(target: "lexical_gap", ?effect, "Effect requested without a content service; dropped");
    return;
  };
  tokio::spawn(async move {
    let event = run_effect(&content, effect).await;
    if events.send(event).is_err() {
      debug!(target: "lexical_gap", "Connection closed before completion; result dropped");
    }
  });
}
