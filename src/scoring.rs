//! Scoring, per-blank review, and the shareable results summary.

use serde::Serialize;

use crate::domain::{AnswerMap, BlankId, CefrLevel, Exercise};
use crate::placeholder::linearize_with_answers;

/// Longest exercise excerpt embedded in the share body.
pub const SHARE_PREVIEW_MAX_CHARS: usize = 1500;

const COMPOSE_URL: &str = "https://mail.google.com/mail/?view=cm&fs=1";

/// Number of blanks whose selected option equals the correct answer.
pub fn score(exercise: &Exercise, answers: &AnswerMap) -> usize {
  exercise
    .blanks
    .iter()
    .filter(|b| answers.get(&b.id).is_some_and(|a| *a == b.correct_answer))
    .count()
}

/// Submission gate: one answer for every blank.
pub fn is_complete(exercise: &Exercise, answers: &AnswerMap) -> bool {
  answers.len() == exercise.blanks.len() && exercise.blanks.iter().all(|b| answers.contains_key(&b.id))
}

pub fn percentage(score: usize, total: usize) -> u32 {
  if total == 0 { return 0; }
  ((score as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankReview {
  pub id: BlankId,
  pub correct_answer: String,
  pub selected: Option<String>,
  pub is_correct: bool,
  pub explanation: String,
}

/// Per-blank feedback in blank order.
pub fn review(exercise: &Exercise, answers: &AnswerMap) -> Vec<BlankReview> {
  exercise
    .blanks
    .iter()
    .map(|b| {
      let selected = answers.get(&b.id).cloned();
      BlankReview {
        id: b.id,
        correct_answer: b.correct_answer.clone(),
        is_correct: selected.as_deref() == Some(b.correct_answer.as_str()),
        selected,
        explanation: b.explanation.clone(),
      }
    })
    .collect()
}

/// Inputs of the share summary besides the exercise itself.
#[derive(Clone, Debug)]
pub struct ShareContext<'a> {
  pub topic: Option<&'a str>,
  pub level: CefrLevel,
  pub language: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShareMessage {
  pub subject: String,
  pub body: String,
  pub url: String,
}

pub fn build_share_text(exercise: &Exercise, answers: &AnswerMap, ctx: &ShareContext<'_>, score: usize) -> String {
  let total = exercise.blanks.len();
  let topic = ctx.topic.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("General");

  let mut body = String::from("My Lexical Gap Challenge Results\n\n");
  body.push_str(&format!("Language: {}\n", ctx.language));
  body.push_str(&format!("Topic: {}\n", topic));
  body.push_str(&format!("Level: {}\n", ctx.level));
  body.push_str(&format!("Score: {}/{} ({}%)\n\n", score, total, percentage(score, total)));
  body.push_str("--- Text Snippet ---\n");
  body.push_str(&format!("{}\n\n", exercise.title));

  let preview = linearize_with_answers(exercise, answers);
  if preview.chars().count() > SHARE_PREVIEW_MAX_CHARS {
    body.extend(preview.chars().take(SHARE_PREVIEW_MAX_CHARS));
    body.push_str("...");
  } else {
    body.push_str(&preview);
  }

  body.push_str("\n\n--- Vocabulary Notes ---\n");
  for b in &exercise.blanks {
    body.push_str(&format!("• {}: {}\n", b.correct_answer, b.explanation));
  }
  body
}

pub fn share_subject(language: &str, score: usize, total: usize) -> String {
  format!("{} Lexical Challenge Result: {}/{}", language, score, total)
}

/// Webmail compose link carrying the summary; nothing is sent from here.
pub fn compose_url(subject: &str, body: &str) -> String {
  format!("{}&su={}&body={}", COMPOSE_URL, urlencoding::encode(subject), urlencoding::encode(body))
}

pub fn share_message(exercise: &Exercise, answers: &AnswerMap, ctx: &ShareContext<'_>) -> ShareMessage {
  let s = score(exercise, answers);
  let subject = share_subject(ctx.language, s, exercise.blanks.len());
  let body = build_share_text(exercise, answers, ctx, s);
  let url = compose_url(&subject, &body);
  ShareMessage { subject, body, url }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Blank;
  use uuid::Uuid;

  fn football() -> Exercise {
    let blank = |id, answer: &str, explanation: &str| Blank {
      id,
      correct_answer: answer.into(),
      options: vec![answer.into(), "went".into(), "ran".into(), "sat".into()],
      explanation: explanation.into(),
    };
    Exercise {
      id: Uuid::nil(),
      title: "Match day".into(),
      content: "I {{1}} the ball and {{2}} home.".into(),
      reference_translation: String::new(),
      blanks: vec![blank(1, "kicked off", "Phrasal verb for starting play."), blank(2, "headed", "Movement towards.")],
    }
  }

  fn ctx() -> ShareContext<'static> {
    ShareContext { topic: None, level: CefrLevel::B2, language: "English" }
  }

  #[test]
  fn scores_the_worked_scenario() {
    let ex = football();
    let answers = AnswerMap::from([(1, "kicked off".to_string()), (2, "went".to_string())]);
    assert_eq!(score(&ex, &answers), 1);
    assert!(is_complete(&ex, &answers));
  }

  #[test]
  fn score_is_monotone_and_full_only_when_all_correct() {
    let ex = football();
    let mut answers = AnswerMap::new();
    let mut previous = score(&ex, &answers);
    assert_eq!(previous, 0);
    for b in &ex.blanks {
      answers.insert(b.id, b.correct_answer.clone());
      let now = score(&ex, &answers);
      assert!(now >= previous);
      previous = now;
    }
    assert_eq!(previous, ex.blanks.len());

    answers.insert(2, "ran".into());
    assert!(score(&ex, &answers) < ex.blanks.len());
  }

  #[test]
  fn partial_map_is_incomplete() {
    let ex = football();
    let answers = AnswerMap::from([(1, "kicked off".to_string())]);
    assert!(!is_complete(&ex, &answers));
    let stray = AnswerMap::from([(1, "kicked off".to_string()), (9, "x".to_string())]);
    assert!(!is_complete(&ex, &stray));
  }

  #[test]
  fn review_marks_each_blank() {
    let ex = football();
    let answers = AnswerMap::from([(1, "kicked off".to_string())]);
    let r = review(&ex, &answers);
    assert!(r[0].is_correct);
    assert!(!r[1].is_correct);
    assert_eq!(r[1].selected, None);
  }

  #[test]
  fn share_text_layout() {
    let ex = football();
    let answers = AnswerMap::from([(1, "kicked off".to_string()), (2, "went".to_string())]);
    let body = build_share_text(&ex, &answers, &ctx(), 1);
    let expected = "My Lexical Gap Challenge Results\n\n\
      Language: English\n\
      Topic: General\n\
      Level: B2\n\
      Score: 1/2 (50%)\n\n\
      --- Text Snippet ---\n\
      Match day\n\n\
      I [kicked off] the ball and [went] home.\n\n\
      --- Vocabulary Notes ---\n\
      • kicked off: Phrasal verb for starting play.\n\
      • headed: Movement towards.\n";
    assert_eq!(body, expected);
  }

  #[test]
  fn share_text_truncates_long_previews() {
    let mut ex = football();
    ex.content = format!("{}{{{{1}}}}", "é".repeat(2000));
    let body = build_share_text(&ex, &AnswerMap::new(), &ctx(), 0);
    let snippet = format!("{}...", "é".repeat(SHARE_PREVIEW_MAX_CHARS));
    assert!(body.contains(&snippet));
    assert!(!body.contains("[No Answer]"));
  }

  #[test]
  fn percentage_rounds_and_handles_empty() {
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(0, 0), 0);
  }

  #[test]
  fn compose_url_is_escaped() {
    let msg = share_message(&football(), &AnswerMap::new(), &ShareContext { topic: Some("Cafés & Bars"), ..ctx() });
    assert_eq!(msg.subject, "English Lexical Challenge Result: 0/2");
    assert!(msg.url.starts_with("https://mail.google.com/mail/?view=cm&fs=1&su=English%20Lexical"));
    assert!(msg.url.contains("Caf%C3%A9s%20%26%20Bars"));
    assert!(!msg.url.contains('\n'));
  }
}
