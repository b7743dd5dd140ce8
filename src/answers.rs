//! Answer values and the per-attempt answer store.
//!
//! The store is owned by one quiz controller and only ever written through
//! `record`, which keeps the latest value per question (never a history).

use std::collections::BTreeMap;

use serde::Serialize;

/// One question's answer. The shape follows the question's interaction type.
/// Serialized untagged, so the backend sees a plain string, array or object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
  /// Single token (card select, slider, swipe, emoji picker).
  Single(String),
  /// Set of tokens, kept in catalog option order.
  Multi(Vec<String>),
  /// Option token -> on/off.
  Flags(BTreeMap<String, bool>),
  /// Ordered picks, at most two.
  Ranked(Vec<String>),
  /// Left token -> right token.
  Pairs(BTreeMap<String, String>),
  Text(String),
}

impl AnswerValue {
  /// True if the value carries no user choice at all.
  pub fn is_empty(&self) -> bool {
    match self {
      AnswerValue::Single(s) => s.is_empty(),
      AnswerValue::Text(s) => s.trim().is_empty(),
      AnswerValue::Multi(v) | AnswerValue::Ranked(v) => v.is_empty(),
      AnswerValue::Flags(m) => m.is_empty(),
      AnswerValue::Pairs(m) => m.is_empty(),
    }
  }
}

/// Question id -> latest answer. Absence means unanswered.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerStore {
  entries: BTreeMap<u32, AnswerValue>,
}

impl AnswerStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, question_id: u32) -> Option<&AnswerValue> {
    self.entries.get(&question_id)
  }

  /// Overwrite the answer for one question. Returns the previous value.
  pub fn record(&mut self, question_id: u32, value: AnswerValue) -> Option<AnswerValue> {
    self.entries.insert(question_id, value)
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&u32, &AnswerValue)> {
    self.entries.iter()
  }
}
