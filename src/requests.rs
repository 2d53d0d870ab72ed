//! Request builders for the three model operations.
//!
//! Wording comes from `Prompts`; this module only decides which template, model tier,
//! temperature and output schema each operation uses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Prompts;
use crate::domain::{clamp_temperature, CefrLevel, DEFAULT_TEMPERATURE};
use crate::util::fill_template;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelTier {
  Fast,
  Strong,
}

/// JSON schema the model output must follow.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseSchema {
  pub name: &'static str,
  pub schema: Value,
}

/// A provider-neutral completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
  pub tier: ModelTier,
  pub system: String,
  pub user: String,
  pub temperature: Option<f32>,
  pub schema: Option<ResponseSchema>,
}

/// What the learner asked for when pressing "generate".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
  #[serde(default)]
  pub topic: Option<String>,
  #[serde(default)]
  pub level: CefrLevel,
  pub language: String,
  #[serde(default = "default_temperature")]
  pub temperature: f32,
}

fn default_temperature() -> f32 {
  DEFAULT_TEMPERATURE
}

impl ExerciseRequest {
  /// Topic with surrounding whitespace removed; blank means "any topic".
  pub fn topic(&self) -> Option<&str> {
    self.topic.as_deref().map(str::trim).filter(|t| !t.is_empty())
  }
}

pub fn topics_schema() -> ResponseSchema {
  ResponseSchema {
    name: "topic_suggestions",
    schema: json!({
      "type": "object",
      "properties": {
        "topics": {
          "type": "array",
          "items": { "type": "string" },
          "description": "A list of 6 distinct, engaging, and specific topics for a newspaper-style article."
        }
      },
      "required": ["topics"],
      "additionalProperties": false
    }),
  }
}

pub fn exercise_schema() -> ResponseSchema {
  ResponseSchema {
    name: "cloze_exercise",
    schema: json!({
      "type": "object",
      "properties": {
        "title": {
          "type": "string",
          "description": "A catchy headline for the text in the target language."
        },
        "content": {
          "type": "string",
          "description": "The article text (2-3 paragraphs) in the target language. Replace 6-8 distinct collocations, idioms, or phrasal verbs with placeholders in the format {{1}}, {{2}}, etc. Do not include the answer in the text, only the placeholder."
        },
        "englishTranslation": {
          "type": "string",
          "description": "A complete natural translation of the full article (with the blanks filled in correctly) into English."
        },
        "blanks": {
          "type": "array",
          "description": "One entry per placeholder, 6-8 in total.",
          "items": {
            "type": "object",
            "properties": {
              "id": { "type": "integer", "description": "The ID matching the placeholder in content (e.g., 1)." },
              "correctAnswer": { "type": "string", "description": "The correct collocation/idiom in the target language." },
              "options": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Exactly 4 options in the target language: the correct answer and 3 plausible but incorrect distractors. They must be shuffled."
              },
              "explanation": { "type": "string", "description": "A brief explanation of why this lexical unit is correct in this context. Write this explanation in English." }
            },
            "required": ["id", "correctAnswer", "options", "explanation"],
            "additionalProperties": false
          }
        }
      },
      "required": ["title", "content", "englishTranslation", "blanks"],
      "additionalProperties": false
    }),
  }
}

pub fn topics_request(prompts: &Prompts, temperature: f32) -> ModelRequest {
  ModelRequest {
    tier: ModelTier::Fast,
    system: prompts.topics_system.clone(),
    user: prompts.topics_user.clone(),
    temperature: Some(clamp_temperature(temperature)),
    schema: Some(topics_schema()),
  }
}

pub fn exercise_request(prompts: &Prompts, req: &ExerciseRequest) -> ModelRequest {
  let level = req.level.to_string();
  let topic = req.topic().unwrap_or(&prompts.default_topic);
  let user = fill_template(
    &prompts.exercise_user_template,
    &[("language", req.language.as_str()), ("level", level.as_str()), ("topic", topic)],
  );
  ModelRequest {
    tier: ModelTier::Strong,
    system: prompts.exercise_system.clone(),
    user,
    temperature: Some(clamp_temperature(req.temperature)),
    schema: Some(exercise_schema()),
  }
}

pub fn translate_request(prompts: &Prompts, text: &str, target_language: &str) -> ModelRequest {
  let user = fill_template(&prompts.translate_user_template, &[("language", target_language), ("text", text)]);
  ModelRequest {
    tier: ModelTier::Fast,
    system: prompts.translate_system.clone(),
    user,
    temperature: None,
    schema: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req(topic: Option<&str>) -> ExerciseRequest {
    ExerciseRequest { topic: topic.map(Into::into), level: CefrLevel::C1, language: "Italian".into(), temperature: 3.0 }
  }

  #[test]
  fn exercise_prompt_names_language_level_topic() {
    let r = exercise_request(&Prompts::default(), &req(Some("  Coffee Culture in Vienna ")));
    assert_eq!(r.tier, ModelTier::Strong);
    assert!(r.user.contains("student learning Italian"));
    assert!(r.user.contains("Target CEFR Level: C1"));
    assert!(r.user.contains("Topic: Coffee Culture in Vienna\n"));
    assert!(r.user.contains("{{1}}, {{2}}"));
    assert!(r.user.contains("150-200 words"));
    assert_eq!(r.temperature, Some(1.5));
    assert_eq!(r.schema.as_ref().map(|s| s.name), Some("cloze_exercise"));
  }

  #[test]
  fn blank_topic_uses_default() {
    let r = exercise_request(&Prompts::default(), &req(Some("   ")));
    assert!(r.user.contains("Topic: General Interest (Science, Culture, or News)"));
  }

  #[test]
  fn exercise_schema_requires_wire_fields() {
    let s = exercise_schema().schema;
    assert_eq!(s["required"], json!(["title", "content", "englishTranslation", "blanks"]));
    assert_eq!(s["properties"]["blanks"]["items"]["properties"]["id"]["type"], "integer");
  }

  #[test]
  fn translate_request_is_plain_text() {
    let r = translate_request(&Prompts::default(), "Ciao {language}", "French");
    assert!(r.schema.is_none());
    assert!(r.temperature.is_none());
    assert!(r.user.starts_with("Translate the following text into French."));
    assert!(r.user.contains("Text: \"Ciao {language}\""));
  }

  #[test]
  fn topics_request_uses_fast_tier_and_schema() {
    let r = topics_request(&Prompts::default(), 0.1);
    assert_eq!(r.tier, ModelTier::Fast);
    assert_eq!(r.temperature, Some(0.2));
    assert_eq!(r.schema.map(|s| s.name), Some("topic_suggestions"));
  }

  #[test]
  fn exercise_request_defaults_from_json() {
    let r: ExerciseRequest = serde_json::from_str(r#"{"language":"Urdu"}"#).unwrap();
    assert_eq!(r.level, CefrLevel::B2);
    assert_eq!(r.temperature, DEFAULT_TEMPERATURE);
    assert_eq!(r.topic(), None);
  }
}
