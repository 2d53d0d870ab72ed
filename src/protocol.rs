//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
  direction_of, AnswerMap, BlankId, CefrLevel, Exercise, LanguageInfo, TextDirection, DEFAULT_TEMPERATURE, LANGUAGES,
  PIVOT_LANGUAGE, SAMPLE_TOPICS,
};
use crate::placeholder::{segment, Segment};
use crate::requests::ExerciseRequest;
use crate::scoring::{percentage, review, BlankReview, ShareMessage};
use crate::session::{Event, Phase, Session};

fn default_temperature() -> f32 {
  DEFAULT_TEMPERATURE
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  /// Ask for the current snapshot without changing anything.
  Snapshot,
  Start {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    level: CefrLevel,
    language: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
  },
  SelectAnswer {
    #[serde(rename = "blankId")]
    blank_id: BlankId,
    option: String,
  },
  Submit,
  Retry,
  Restart,
  NewGame,
  ReferenceLanguage {
    language: String,
  },
  SuggestTopics {
    #[serde(default = "default_temperature")]
    temperature: f32,
  },
}

impl ClientWsMessage {
  /// Session event for this message; `None` for messages that only read.
  pub fn into_event(self) -> Option<Event> {
    match self {
      ClientWsMessage::Ping | ClientWsMessage::Snapshot => None,
      ClientWsMessage::Start { topic, level, language, temperature } => {
        Some(Event::Start(ExerciseRequest { topic, level, language, temperature }))
      }
      ClientWsMessage::SelectAnswer { blank_id, option } => Some(Event::SelectAnswer { id: blank_id, option }),
      ClientWsMessage::Submit => Some(Event::Submit),
      ClientWsMessage::Retry => Some(Event::Retry),
      ClientWsMessage::Restart => Some(Event::Restart),
      ClientWsMessage::NewGame => Some(Event::NewGame),
      ClientWsMessage::ReferenceLanguage { language } => Some(Event::ChangeReferenceLanguage(language)),
      ClientWsMessage::SuggestTopics { temperature } => Some(Event::SuggestTopics { temperature }),
    }
  }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Session {
    session: SessionSnapshot,
  },
  Error {
    message: String,
  },
}

/// Everything the client needs to render the current session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub phase: Phase,
  pub generation_enabled: bool,
  pub generating: bool,
  pub loading_message: Option<String>,
  pub error_message: Option<String>,
  pub suggested_topics: Vec<String>,
  pub topics_in_flight: bool,
  pub request: Option<ExerciseRequest>,
  pub exercise: Option<ExerciseView>,
  pub answers: AnswerMap,
  pub can_submit: bool,
  pub reference: Option<ReferenceView>,
  pub results: Option<ResultsView>,
}

/// Exercise as rendered. Correct answers are only revealed in results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseView {
  pub id: Uuid,
  pub title: String,
  pub direction: TextDirection,
  pub segments: Vec<Segment>,
  pub blanks: Vec<BlankView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankView {
  pub id: BlankId,
  pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceView {
  pub language: String,
  pub text: String,
  pub translating: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
  pub score: usize,
  pub total: usize,
  pub percentage: u32,
  pub review: Vec<BlankReview>,
  pub share: Option<ShareMessage>,
}

pub fn to_snapshot(s: &Session) -> SessionSnapshot {
  let language = s.request().map(|r| r.language.as_str()).unwrap_or(PIVOT_LANGUAGE);

  let exercise = s.exercise().map(|ex| ExerciseView {
    id: ex.id,
    title: ex.title.clone(),
    direction: direction_of(language),
    segments: segment(&ex.content),
    blanks: ex.blanks.iter().map(|b| BlankView { id: b.id, options: b.options.clone() }).collect(),
  });

  let reference = s.reference_language().map(|lang| ReferenceView {
    language: lang.to_string(),
    text: s.reference_text().to_string(),
    translating: s.is_translating(),
  });

  let results = match (s.phase(), s.exercise()) {
    (Phase::Results, Some(ex)) => {
      let score = s.score().unwrap_or(0);
      let total = ex.blanks.len();
      Some(ResultsView {
        score,
        total,
        percentage: percentage(score, total),
        review: review(ex, s.answers()),
        share: s.share(),
      })
    }
    _ => None,
  };

  SessionSnapshot {
    phase: s.phase(),
    generation_enabled: s.generation_enabled(),
    generating: s.is_generating(),
    loading_message: s.loading_message(),
    error_message: s.error_message().map(str::to_string),
    suggested_topics: s.suggested_topics().to_vec(),
    topics_in_flight: s.topics_in_flight(),
    request: s.request().cloned(),
    exercise,
    answers: s.answers().clone(),
    can_submit: s.can_submit(),
    reference,
    results,
  }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOut {
  pub ok: bool,
  pub generation_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOut {
  pub code: CefrLevel,
  pub description: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOut {
  pub languages: Vec<LanguageInfo>,
  pub levels: Vec<LevelOut>,
  pub pivot_language: &'static str,
  pub topics: Vec<&'static str>,
}

pub fn catalog() -> CatalogOut {
  CatalogOut {
    languages: LANGUAGES.to_vec(),
    levels: CefrLevel::ALL.iter().map(|l| LevelOut { code: *l, description: l.description() }).collect(),
    pivot_language: PIVOT_LANGUAGE,
    topics: SAMPLE_TOPICS.to_vec(),
  }
}

#[derive(Debug, Deserialize)]
pub struct TopicsIn {
  #[serde(default = "default_temperature")]
  pub temperature: f32,
}
#[derive(Serialize)]
pub struct TopicsOut {
  pub topics: Vec<String>,
}

/// Full exercise for stateless clients, with segments precomputed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOut {
  #[serde(flatten)]
  pub exercise: Exercise,
  pub direction: TextDirection,
  pub segments: Vec<Segment>,
}

pub fn to_exercise_out(exercise: Exercise, language: &str) -> ExerciseOut {
  let segments = segment(&exercise.content);
  ExerciseOut { exercise, direction: direction_of(language), segments }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateIn {
  pub text: String,
  pub target_language: String,
}
#[derive(Serialize)]
pub struct TranslateOut {
  pub translation: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareIn {
  pub exercise: Exercise,
  #[serde(default)]
  pub answers: AnswerMap,
  #[serde(default)]
  pub topic: Option<String>,
  #[serde(default)]
  pub level: CefrLevel,
  pub language: String,
}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOut {
  pub score: usize,
  pub total: usize,
  pub percentage: u32,
  #[serde(flatten)]
  pub message: ShareMessage,
}

#[derive(Serialize)]
pub struct ErrorOut {
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::football_exercise;

  #[test]
  fn parses_client_messages() {
    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"start","language":"French"}"#).unwrap();
    match m.into_event() {
      Some(Event::Start(r)) => {
        assert_eq!(r.level, CefrLevel::B2);
        assert_eq!(r.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(r.topic, None);
      }
      other => panic!("unexpected {:?}", other),
    }

    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"select_answer","blankId":2,"option":"went"}"#).unwrap();
    assert!(matches!(m.into_event(), Some(Event::SelectAnswer { id: 2, .. })));

    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"reference_language","language":"Hindi"}"#).unwrap();
    assert!(matches!(m.into_event(), Some(Event::ChangeReferenceLanguage(l)) if l == "Hindi"));

    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
    assert!(m.into_event().is_none());
  }

  #[test]
  fn snapshot_hides_answers_until_results() {
    let mut s = Session::new(true);
    let effect = s
      .handle(Event::Start(ExerciseRequest { topic: None, level: CefrLevel::A1, language: "Urdu".into(), temperature: 0.7 }))
      .unwrap();
    let Some(crate::session::Effect::Generate { ticket, .. }) = effect else { panic!("expected Generate") };
    s.handle(Event::GenerationFinished { ticket, outcome: Ok(football_exercise()) }).unwrap();

    let json = serde_json::to_value(to_snapshot(&s)).unwrap();
    assert_eq!(json["phase"], "playing");
    assert_eq!(json["exercise"]["direction"], "rtl");
    assert!(json["exercise"]["blanks"][0].get("correctAnswer").is_none());
    assert_eq!(json["reference"]["language"], "English");
    assert!(json["results"].is_null());
    assert_eq!(json["canSubmit"], false);

    s.handle(Event::SelectAnswer { id: 1, option: "kicked off".into() }).unwrap();
    s.handle(Event::SelectAnswer { id: 2, option: "went".into() }).unwrap();
    s.handle(Event::Submit).unwrap();
    let json = serde_json::to_value(to_snapshot(&s)).unwrap();
    assert_eq!(json["results"]["score"], 1);
    assert_eq!(json["results"]["percentage"], 50);
    assert_eq!(json["results"]["review"][1]["correctAnswer"], "headed");
    assert!(json["results"]["share"]["url"].as_str().unwrap().starts_with("https://mail.google.com/"));
    assert_eq!(json["answers"]["2"], "went");
  }

  #[test]
  fn catalog_lists_levels_in_order() {
    let json = serde_json::to_value(catalog()).unwrap();
    assert_eq!(json["levels"][0]["code"], "A1");
    assert_eq!(json["levels"].as_array().unwrap().len(), 6);
    assert_eq!(json["languages"][7]["direction"], "rtl");
    assert_eq!(json["pivotLanguage"], "English");
  }
}
