//! Small utility helpers used across modules.

use uuid::Uuid;

/// Canonical form of an answer token: trimmed and lower-cased.
/// Every widget reports tokens in this form so the backend payload is stable.
pub fn normalize_token(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Fresh identifier for one quiz attempt. Never reused across restarts.
pub fn new_session_id() -> String {
  format!("session_{}", Uuid::new_v4().simple())
}

/// Fresh server-side handle for one open quiz.
pub fn new_quiz_id() -> String {
  Uuid::new_v4().to_string()
}

/// Progress through the catalog as a whole percentage, counting the current question.
pub fn progress_percent(index: usize, total: usize) -> u8 {
  if total == 0 { return 0; }
  let pct = ((index + 1) as f64 / total as f64 * 100.0).round();
  pct.clamp(0.0, 100.0) as u8
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
