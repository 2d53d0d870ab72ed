//! Domain models: proficiency levels, the language catalogue, and the generated exercise.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ContentError, ContentResult};
use crate::placeholder;

/// Fixed language for explanations and the cached reference translation.
pub const PIVOT_LANGUAGE: &str = "English";
/// Contrast language used when the learner is studying the pivot language itself.
pub const SECONDARY_LANGUAGE: &str = "Spanish";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MIN_TEMPERATURE: f32 = 0.2;
pub const MAX_TEMPERATURE: f32 = 1.5;

pub const SAMPLE_TOPICS: [&str; 6] = [
  "Technology & AI",
  "Environmental Sustainability",
  "Global Economics",
  "Modern Art Trends",
  "Travel & Culture",
  "Workplace Psychology",
];

/// Keep the creativity knob inside the range the UI offers.
pub fn clamp_temperature(t: f32) -> f32 {
  if !t.is_finite() { return DEFAULT_TEMPERATURE; }
  t.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// CEFR proficiency tiers, ordered from beginner to proficiency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
  A1,
  A2,
  B1,
  #[default]
  B2,
  C1,
  C2,
}

impl CefrLevel {
  pub const ALL: [CefrLevel; 6] = [
    CefrLevel::A1, CefrLevel::A2, CefrLevel::B1, CefrLevel::B2, CefrLevel::C1, CefrLevel::C2,
  ];

  pub fn code(self) -> &'static str {
    match self {
      CefrLevel::A1 => "A1",
      CefrLevel::A2 => "A2",
      CefrLevel::B1 => "B1",
      CefrLevel::B2 => "B2",
      CefrLevel::C1 => "C1",
      CefrLevel::C2 => "C2",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      CefrLevel::A1 => "Beginner - Basic vocabulary",
      CefrLevel::A2 => "Elementary - Simple phrases",
      CefrLevel::B1 => "Intermediate - Standard situations",
      CefrLevel::B2 => "Upper Intermediate - Abstract topics",
      CefrLevel::C1 => "Advanced - Flexible & effective",
      CefrLevel::C2 => "Proficiency - Precise & subtle",
    }
  }
}

impl fmt::Display for CefrLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for CefrLevel {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    CefrLevel::ALL
      .iter()
      .copied()
      .find(|l| l.code().eq_ignore_ascii_case(wanted))
      .ok_or_else(|| format!("Unknown CEFR level: {}", s))
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
  Ltr,
  Rtl,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct LanguageInfo {
  pub name: &'static str,
  pub direction: TextDirection,
}

pub const LANGUAGES: [LanguageInfo; 10] = [
  LanguageInfo { name: "English", direction: TextDirection::Ltr },
  LanguageInfo { name: "French", direction: TextDirection::Ltr },
  LanguageInfo { name: "Hindi", direction: TextDirection::Ltr },
  LanguageInfo { name: "Italian", direction: TextDirection::Ltr },
  LanguageInfo { name: "Mandarin Chinese", direction: TextDirection::Ltr },
  LanguageInfo { name: "Portuguese", direction: TextDirection::Ltr },
  LanguageInfo { name: "Spanish", direction: TextDirection::Ltr },
  LanguageInfo { name: "Standard Arabic", direction: TextDirection::Rtl },
  LanguageInfo { name: "Ukrainian", direction: TextDirection::Ltr },
  LanguageInfo { name: "Urdu", direction: TextDirection::Rtl },
];

/// Direction for rendering; languages outside the catalogue render left-to-right.
pub fn direction_of(language: &str) -> TextDirection {
  LANGUAGES
    .iter()
    .find(|l| l.name == language)
    .map(|l| l.direction)
    .unwrap_or(TextDirection::Ltr)
}

/// Indefinite article for "preparing a/an <language> text".
pub fn article_for(language: &str) -> &'static str {
  match language {
    "English" | "Italian" | "Urdu" => "an",
    _ => "a",
  }
}

/// Contrast language shown next to a fresh exercise.
pub fn default_reference_language(learning_language: &str) -> &'static str {
  if learning_language == PIVOT_LANGUAGE { SECONDARY_LANGUAGE } else { PIVOT_LANGUAGE }
}

pub type BlankId = u32;

/// Learner selections keyed by blank id. Absence means unanswered.
pub type AnswerMap = BTreeMap<BlankId, String>;

/// One fill-in-the-gap slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
  pub id: BlankId,
  pub correct_answer: String,
  pub options: Vec<String>,
  /// Always authored in the pivot language.
  pub explanation: String,
}

/// A generated cloze exercise. Replaced wholesale on every generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  /// Assigned locally on adoption; not part of the model payload.
  #[serde(default)]
  pub id: Uuid,
  pub title: String,
  /// Body with `{{<id>}}` markers.
  pub content: String,
  /// Pivot-language translation with blanks resolved.
  #[serde(rename = "englishTranslation")]
  pub reference_translation: String,
  pub blanks: Vec<Blank>,
}

impl Exercise {
  pub fn blank(&self, id: BlankId) -> Option<&Blank> {
    self.blanks.iter().find(|b| b.id == id)
  }

  /// Structural acceptance check for a decoded model payload.
  pub fn validate(&self) -> ContentResult<()> {
    if self.content.trim().is_empty() {
      return Err(ContentError::MalformedContent("exercise content is empty".into()));
    }
    if !placeholder::has_marker(&self.content) {
      return Err(ContentError::MalformedContent("exercise content has no {{n}} markers".into()));
    }
    Ok(())
  }

  /// Soft checks on what the model was asked for but is not enforced.
  pub fn shape_warnings(&self) -> Vec<String> {
    let mut notes = vec![];
    let marker_ids = placeholder::marker_ids(&self.content);
    for b in &self.blanks {
      if b.options.len() != 4 {
        notes.push(format!("blank {} has {} options", b.id, b.options.len()));
      }
      let hits = b.options.iter().filter(|o| **o == b.correct_answer).count();
      if hits != 1 {
        notes.push(format!("blank {} lists its correct answer {} times", b.id, hits));
      }
      if !marker_ids.contains(&b.id) {
        notes.push(format!("blank {} has no marker in content", b.id));
      }
    }
    for id in &marker_ids {
      if self.blank(*id).is_none() {
        notes.push(format!("marker {{{{{}}}}} has no blank", id));
      }
    }
    notes
  }
}
