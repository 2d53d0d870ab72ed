//! Exercise lifecycle state machine.
//!
//! A `Session` is the single authoritative value for one learner. Every input, whether
//! a user action or the completion of an asynchronous request, is an [`Event`] fed to
//! [`Session::handle`]. The reducer either refuses the event (leaving the session
//! untouched) or applies it and returns at most one [`Effect`] for the driver to run.
//! Completions come back as events carrying the ticket they were issued with; tickets
//! that no longer match the session are ignored.
//!
//! ```text
//! Configuring --start--> Loading --success--> Playing --submit--> Results
//!                           |                                        |
//!                        failure                                  restart
//!                           v                                        |
//!                        Errored --retry--> Configuring <------------+
//! ```
//! `new_game` returns to Configuring from any other phase.

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
  article_for, clamp_temperature, default_reference_language, AnswerMap, BlankId, Exercise, PIVOT_LANGUAGE,
  SAMPLE_TOPICS,
};
use crate::error::{ContentResult, SessionError};
use crate::placeholder::linearize_correct;
use crate::requests::ExerciseRequest;
use crate::scoring::{is_complete, score, share_message, ShareContext, ShareMessage};

/// Shown on the error screen; the specific cause only goes to the logs.
pub const GENERATION_ERROR_MESSAGE: &str =
  "Failed to generate content. Please check your connection or API limit and try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Configuring,
  Loading,
  Playing,
  Results,
  Errored,
}

impl Phase {
  pub fn name(self) -> &'static str {
    match self {
      Phase::Configuring => "configuring",
      Phase::Loading => "loading",
      Phase::Playing => "playing",
      Phase::Results => "results",
      Phase::Errored => "errored",
    }
  }
}

/// Identifies which exercise and language a translation was requested for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationTicket {
  pub exercise_id: Uuid,
  pub language: String,
}

#[derive(Debug)]
pub enum Event {
  Start(ExerciseRequest),
  GenerationFinished { ticket: Uuid, outcome: ContentResult<Exercise> },
  Retry,
  SelectAnswer { id: BlankId, option: String },
  Submit,
  Restart,
  NewGame,
  ChangeReferenceLanguage(String),
  /// Empty `text` means the translation failed.
  TranslationFinished { ticket: TranslationTicket, text: String },
  SuggestTopics { temperature: f32 },
  TopicsFinished { topics: Vec<String> },
}

impl Event {
  fn action(&self) -> &'static str {
    match self {
      Event::Start(_) => "start",
      Event::GenerationFinished { .. } => "finish generation",
      Event::Retry => "retry",
      Event::SelectAnswer { .. } => "select an answer",
      Event::Submit => "submit",
      Event::Restart => "restart",
      Event::NewGame => "start a new game",
      Event::ChangeReferenceLanguage(_) => "change the reference language",
      Event::TranslationFinished { .. } => "finish translation",
      Event::SuggestTopics { .. } => "suggest topics",
      Event::TopicsFinished { .. } => "finish topic suggestion",
    }
  }
}

/// Asynchronous work requested by the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
  Generate { ticket: Uuid, request: ExerciseRequest },
  Translate { ticket: TranslationTicket, text: String },
  SuggestTopics { temperature: f32 },
}

#[derive(Clone, Debug)]
pub struct Session {
  phase: Phase,
  generation_enabled: bool,
  request: Option<ExerciseRequest>,
  pending_generation: Option<Uuid>,
  exercise: Option<Exercise>,
  answers: AnswerMap,
  error_message: Option<String>,
  reference_language: Option<String>,
  reference_text: String,
  translating: bool,
  suggested_topics: Vec<String>,
  topics_in_flight: bool,
}

impl Session {
  /// `generation_enabled` is false when no model credential is configured.
  pub fn new(generation_enabled: bool) -> Self {
    Self {
      phase: Phase::Configuring,
      generation_enabled,
      request: None,
      pending_generation: None,
      exercise: None,
      answers: AnswerMap::new(),
      error_message: None,
      reference_language: None,
      reference_text: String::new(),
      translating: false,
      suggested_topics: SAMPLE_TOPICS.iter().map(|t| t.to_string()).collect(),
      topics_in_flight: false,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }
  pub fn generation_enabled(&self) -> bool { self.generation_enabled }
  pub fn request(&self) -> Option<&ExerciseRequest> { self.request.as_ref() }
  pub fn exercise(&self) -> Option<&Exercise> { self.exercise.as_ref() }
  pub fn answers(&self) -> &AnswerMap { &self.answers }
  pub fn error_message(&self) -> Option<&str> { self.error_message.as_deref() }
  pub fn reference_language(&self) -> Option<&str> { self.reference_language.as_deref() }
  pub fn reference_text(&self) -> &str { &self.reference_text }
  pub fn is_translating(&self) -> bool { self.translating }
  pub fn suggested_topics(&self) -> &[String] { &self.suggested_topics }
  pub fn topics_in_flight(&self) -> bool { self.topics_in_flight }
  pub fn is_generating(&self) -> bool { self.phase == Phase::Loading }

  pub fn can_submit(&self) -> bool {
    self.phase == Phase::Playing && self.exercise.as_ref().is_some_and(|ex| is_complete(ex, &self.answers))
  }

  pub fn score(&self) -> Option<usize> {
    self.exercise.as_ref().map(|ex| score(ex, &self.answers))
  }

  /// "Our AI linguist is preparing an English text at level B2."
  pub fn loading_message(&self) -> Option<String> {
    if self.phase != Phase::Loading { return None; }
    self.request.as_ref().map(|r| {
      format!(
        "Our AI linguist is preparing {} {} text at level {}.",
        article_for(&r.language),
        r.language,
        r.level
      )
    })
  }

  /// Shareable summary, available once answers are checked.
  pub fn share(&self) -> Option<ShareMessage> {
    if self.phase != Phase::Results { return None; }
    let (ex, req) = (self.exercise.as_ref()?, self.request.as_ref()?);
    let ctx = ShareContext { topic: req.topic(), level: req.level, language: &req.language };
    Some(share_message(ex, &self.answers, &ctx))
  }

  /// Apply one event. A refused event leaves the session unchanged.
  pub fn handle(&mut self, event: Event) -> Result<Option<Effect>, SessionError> {
    let action = event.action();
    let refused = |phase: Phase| SessionError::InvalidTransition { phase: phase.name(), action };

    match event {
      Event::Start(request) => {
        if self.phase != Phase::Configuring { return Err(refused(self.phase)); }
        if !self.generation_enabled { return Err(SessionError::Configuration); }

        let request = ExerciseRequest { temperature: clamp_temperature(request.temperature), ..request };
        let ticket = Uuid::new_v4();
        info!(target: "session", %ticket, language = %request.language, level = %request.level, "Generation started");
        self.phase = Phase::Loading;
        self.error_message = None;
        self.pending_generation = Some(ticket);
        self.request = Some(request.clone());
        Ok(Some(Effect::Generate { ticket, request }))
      }

      Event::GenerationFinished { ticket, outcome } => {
        if self.phase != Phase::Loading || self.pending_generation != Some(ticket) {
          debug!(target: "session", %ticket, phase = self.phase.name(), "Ignoring stale generation result");
          return Ok(None);
        }
        self.pending_generation = None;

        match outcome {
          Ok(exercise) => Ok(self.adopt(exercise)),
          Err(e) => {
            warn!(target: "session", %ticket, error = %e, "Generation failed");
            self.phase = Phase::Errored;
            self.error_message = Some(GENERATION_ERROR_MESSAGE.to_string());
            Ok(None)
          }
        }
      }

      Event::Retry => {
        if self.phase != Phase::Errored { return Err(refused(self.phase)); }
        self.reset_to_configuring();
        Ok(None)
      }

      Event::SelectAnswer { id, option } => {
        if self.phase != Phase::Playing { return Err(refused(self.phase)); }
        let Some(exercise) = self.exercise.as_ref() else { return Err(refused(self.phase)) };
        let blank = exercise.blank(id).ok_or(SessionError::UnknownBlank(id))?;
        if !blank.options.iter().any(|o| *o == option) {
          return Err(SessionError::InvalidOption { id, option });
        }
        self.answers.insert(id, option);
        Ok(None)
      }

      Event::Submit => {
        if self.phase != Phase::Playing { return Err(refused(self.phase)); }
        let Some(exercise) = self.exercise.as_ref() else { return Err(refused(self.phase)) };
        if !is_complete(exercise, &self.answers) {
          return Err(SessionError::IncompleteAnswers { answered: self.answers.len(), total: exercise.blanks.len() });
        }
        info!(target: "session", exercise_id = %exercise.id, score = score(exercise, &self.answers), total = exercise.blanks.len(), "Answers checked");
        self.phase = Phase::Results;
        Ok(None)
      }

      Event::Restart => {
        if self.phase != Phase::Results { return Err(refused(self.phase)); }
        self.reset_to_configuring();
        Ok(None)
      }

      Event::NewGame => {
        if self.phase == Phase::Configuring { return Err(refused(self.phase)); }
        self.reset_to_configuring();
        Ok(None)
      }

      Event::ChangeReferenceLanguage(language) => {
        if !matches!(self.phase, Phase::Playing | Phase::Results) || self.exercise.is_none() {
          return Err(refused(self.phase));
        }
        if self.translating { return Err(SessionError::Busy("translation")); }
        Ok(self.resolve_reference(language))
      }

      Event::TranslationFinished { ticket, text } => {
        let current = self.exercise.as_ref().is_some_and(|ex| ex.id == ticket.exercise_id)
          && self.reference_language.as_deref() == Some(ticket.language.as_str());
        if !current {
          debug!(target: "session", exercise_id = %ticket.exercise_id, language = %ticket.language, "Ignoring stale translation");
          return Ok(None);
        }
        self.translating = false;
        if text.trim().is_empty() {
          warn!(target: "session", language = %ticket.language, "Translation unavailable; keeping previous reference text");
        } else {
          self.reference_text = text;
        }
        Ok(None)
      }

      Event::SuggestTopics { temperature } => {
        if !self.generation_enabled { return Err(SessionError::Configuration); }
        if self.topics_in_flight { return Err(SessionError::Busy("topic suggestion")); }
        self.topics_in_flight = true;
        Ok(Some(Effect::SuggestTopics { temperature: clamp_temperature(temperature) }))
      }

      Event::TopicsFinished { topics } => {
        self.topics_in_flight = false;
        if topics.is_empty() {
          debug!(target: "session", "No new topics; keeping previous suggestions");
        } else {
          self.suggested_topics = topics;
        }
        Ok(None)
      }
    }
  }

  fn adopt(&mut self, exercise: Exercise) -> Option<Effect> {
    info!(target: "session", exercise_id = %exercise.id, blanks = exercise.blanks.len(), "Exercise adopted");
    let learning = self.request.as_ref().map(|r| r.language.clone()).unwrap_or_default();
    self.exercise = Some(exercise);
    self.answers.clear();
    self.reference_text.clear();
    self.translating = false;
    self.phase = Phase::Playing;
    self.resolve_reference(default_reference_language(&learning).to_string())
  }

  /// Point the reference panel at `language`, translating only when there is no local source.
  fn resolve_reference(&mut self, language: String) -> Option<Effect> {
    let exercise = self.exercise.as_ref()?;
    let learning = self.request.as_ref().map(|r| r.language.as_str());
    self.reference_language = Some(language.clone());

    if language == PIVOT_LANGUAGE {
      self.reference_text = exercise.reference_translation.clone();
      return None;
    }
    if learning == Some(language.as_str()) {
      self.reference_text = linearize_correct(exercise);
      return None;
    }

    self.translating = true;
    debug!(target: "session", exercise_id = %exercise.id, %language, "Reference translation requested");
    Some(Effect::Translate {
      ticket: TranslationTicket { exercise_id: exercise.id, language },
      text: linearize_correct(exercise),
    })
  }

  fn reset_to_configuring(&mut self) {
    self.phase = Phase::Configuring;
    self.pending_generation = None;
    self.exercise = None;
    self.answers.clear();
    self.error_message = None;
    self.reference_language = None;
    self.reference_text.clear();
    self.translating = false;
  }
}
