//! Error types for content generation and session transitions.

use crate::domain::BlankId;

/// Why a call to the generative backend did not produce usable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
  /// No API credential configured.
  Configuration(String),
  /// Network failure, timeout, or non-success HTTP status.
  Transport(String),
  /// Payload missing or not decodable against the expected shape.
  Decode(String),
  /// Decoded exercise failed structural validation.
  MalformedContent(String),
}

impl std::fmt::Display for ContentError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ContentError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
      ContentError::Transport(msg) => write!(f, "Transport error: {}", msg),
      ContentError::Decode(msg) => write!(f, "Decode error: {}", msg),
      ContentError::MalformedContent(msg) => write!(f, "Malformed content: {}", msg),
    }
  }
}

impl std::error::Error for ContentError {}

pub type ContentResult<T> = Result<T, ContentError>;

/// A refused session event. The session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
  Configuration,
  InvalidTransition { phase: &'static str, action: &'static str },
  IncompleteAnswers { answered: usize, total: usize },
  UnknownBlank(BlankId),
  InvalidOption { id: BlankId, option: String },
  Busy(&'static str),
}

impl std::fmt::Display for SessionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SessionError::Configuration => write!(f, "Content generation is disabled: no API key configured"),
      SessionError::InvalidTransition { phase, action } => write!(f, "Cannot {} while {}", action, phase),
      SessionError::IncompleteAnswers { answered, total } => {
        write!(f, "Answer every blank before checking ({}/{} answered)", answered, total)
      }
      SessionError::UnknownBlank(id) => write!(f, "Unknown blank id: {}", id),
      SessionError::InvalidOption { id, option } => write!(f, "'{}' is not an option for blank {}", option, id),
      SessionError::Busy(kind) => write!(f, "A {} request is already in flight", kind),
    }
  }
}

impl std::error::Error for SessionError {}
