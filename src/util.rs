//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Char-safe prefix of at most `max` characters.
pub fn preview(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  let total = s.chars().count();
  if total <= max { s.to_string() } else { format!("{}… ({} chars total)", preview(s, max), total) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{lang} text in {lang} at {level}", &[("lang", "French"), ("level", "B1")]);
    assert_eq!(out, "French text in French at B1");
  }

  #[test]
  fn fill_template_leaves_unknown_keys() {
    assert_eq!(fill_template("{missing}", &[("other", "x")]), "{missing}");
  }

  #[test]
  fn trunc_for_log_is_char_safe() {
    let s = "日本語のテキスト";
    let out = trunc_for_log(s, 3);
    assert!(out.starts_with("日本語…"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
