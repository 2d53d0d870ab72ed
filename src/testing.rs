//! Test doubles for the generative backend.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::GenerativeBackend;
use crate::domain::{Blank, Exercise};
use crate::error::{ContentError, ContentResult};
use crate::requests::ModelRequest;

/// Returns queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedBackend {
  responses: Mutex<VecDeque<ContentResult<String>>>,
  seen: Mutex<Vec<ModelRequest>>,
}

impl ScriptedBackend {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push_ok(&self, text: &str) {
    self.responses.lock().unwrap().push_back(Ok(text.to_string()));
  }

  pub fn push_err(&self, err: ContentError) {
    self.responses.lock().unwrap().push_back(Err(err));
  }

  pub fn requests(&self) -> Vec<ModelRequest> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
  async fn complete(&self, req: &ModelRequest) -> ContentResult<String> {
    self.seen.lock().unwrap().push(req.clone());
    self.responses
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(ContentError::Transport("no scripted response".into())))
  }

  fn name(&self) -> &str {
    "Scripted"
  }
}

fn blank(id: u32, answer: &str) -> Blank {
  Blank {
    id,
    correct_answer: answer.into(),
    options: vec!["went".into(), answer.into(), "sat".into(), "ran".into()],
    explanation: format!("Why '{}' fits.", answer),
  }
}

/// Model payload with blanks 1 ("kicked off") and 2 ("headed").
pub fn exercise_json(content: &str) -> String {
  serde_json::json!({
    "title": "Match day",
    "content": content,
    "englishTranslation": "I kicked off the ball and headed home.",
    "blanks": [
      { "id": 1, "correctAnswer": "kicked off", "options": ["went", "kicked off", "sat", "ran"], "explanation": "Why 'kicked off' fits." },
      { "id": 2, "correctAnswer": "headed", "options": ["went", "headed", "sat", "ran"], "explanation": "Why 'headed' fits." }
    ]
  })
  .to_string()
}

/// The two-blank football exercise with a fresh id.
pub fn football_exercise() -> Exercise {
  Exercise {
    id: Uuid::new_v4(),
    title: "Match day".into(),
    content: "I {{1}} the ball and {{2}} home.".into(),
    reference_translation: "I kicked off the ball and headed home.".into(),
    blanks: vec![blank(1, "kicked off"), blank(2, "headed")],
  }
}
