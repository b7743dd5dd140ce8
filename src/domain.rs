//! Domain models received from the recommendation backend: scored product records.

use serde::{Deserialize, Serialize};

/// Backend's confidence label. Accepted in any case, sent back capitalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
  #[serde(alias = "low", alias = "LOW")]
  Low,
  #[serde(alias = "medium", alias = "MEDIUM")]
  Medium,
  #[serde(alias = "high", alias = "HIGH")]
  High,
}
impl Default for Confidence {
  fn default() -> Self { Confidence::Low }
}

/// One scored product suggestion. Read-only; display order is the backend's order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
  pub product_name: String,
  pub brand: String,
  #[serde(default)]
  pub category: String,
  pub score: f64, // 0-10
  #[serde(default)]
  pub confidence: Confidence,
  #[serde(default)]
  pub reasoning: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub detailed_explanation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hair_routine: Option<String>,
}

/// Full backend reply for one submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsData {
  pub session_id: String,
  pub recommendations: Vec<RecommendationRecord>,
  #[serde(default)]
  pub timestamp: String,
}
