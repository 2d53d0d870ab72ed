//! Placeholder reconciliation for exercise bodies.
//!
//! Exercise content carries blanks as `{{<decimal id>}}` markers embedded in prose.
//! Two operations are defined over it:
//!
//! - [`segment`] splits the body into literal text and blank references, in order,
//!   for interleaving prose with answer controls.
//! - [`resolve`] linearizes the body by substituting every marker through a resolver.
//!   Both the reference-translation path and the share export go through it, so the
//!   text sent for translation and the text exported agree with what is rendered.
//!
//! A marker whose id does not fit a [`BlankId`] is not a marker: it stays literal.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::domain::{AnswerMap, Blank, BlankId, Exercise};

/// Rendered in exports for a blank the learner left empty.
pub const NO_ANSWER: &str = "No Answer";

fn marker_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\{\{(\d+)\}\}").expect("marker pattern is a valid regex"))
}

/// One contiguous unit of exercise content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
  Literal(String),
  BlankRef(BlankId),
}

fn parse_id(caps: &Captures) -> Option<BlankId> {
  caps.get(1).and_then(|m| m.as_str().parse::<BlankId>().ok())
}

/// Split content into literal and blank-reference segments, left to right.
///
/// Empty literals are never emitted. Ids are reported even when no blank carries
/// them; dropping unknown ids is up to the renderer.
pub fn segment(content: &str) -> Vec<Segment> {
  let mut parts = Vec::new();
  let mut last = 0;

  for caps in marker_re().captures_iter(content) {
    let (Some(whole), Some(id)) = (caps.get(0), parse_id(&caps)) else { continue };
    if whole.start() > last {
      parts.push(Segment::Literal(content[last..whole.start()].to_string()));
    }
    parts.push(Segment::BlankRef(id));
    last = whole.end();
  }

  if last < content.len() {
    parts.push(Segment::Literal(content[last..].to_string()));
  }
  parts
}

/// Replace every marker with `resolver(blank)`.
///
/// Markers without a matching blank resolve to the empty string. Repeated ids are
/// substituted identically at each occurrence.
pub fn resolve<F>(content: &str, blanks: &[Blank], resolver: F) -> String
where
  F: Fn(&Blank) -> String,
{
  marker_re()
    .replace_all(content, |caps: &Captures| match parse_id(caps) {
      Some(id) => blanks.iter().find(|b| b.id == id).map(|b| resolver(b)).unwrap_or_default(),
      None => caps[0].to_string(),
    })
    .into_owned()
}

/// Clean text with every blank filled by its correct answer.
pub fn linearize_correct(exercise: &Exercise) -> String {
  resolve(&exercise.content, &exercise.blanks, |b| b.correct_answer.clone())
}

/// Export text: each blank as `[<selected option>]`, or `[No Answer]`.
pub fn linearize_with_answers(exercise: &Exercise, answers: &AnswerMap) -> String {
  resolve(&exercise.content, &exercise.blanks, |b| {
    format!("[{}]", answers.get(&b.id).map(String::as_str).unwrap_or(NO_ANSWER))
  })
}

/// Marker ids in order of appearance, repeats included.
pub fn marker_ids(content: &str) -> Vec<BlankId> {
  marker_re().captures_iter(content).filter_map(|caps| parse_id(&caps)).collect()
}

pub fn has_marker(content: &str) -> bool {
  marker_re().captures_iter(content).any(|caps| parse_id(&caps).is_some())
}

pub fn render_marker(id: BlankId) -> String {
  format!("{{{{{}}}}}", id)
}
