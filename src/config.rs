//! Configuration: recommendation backend settings from env, quiz content from TOML.
//!
//! TOML schema (QUIZ_CONFIG_PATH):
//!
//! ```toml
//! [[questions]]
//! id = 1
//! prompt = "How does your hair usually feel?"
//! type = "single_select"
//! options = ["Soft", { label = "Very dry", value = "very_dry" }]
//!
//! # Optional: flatten answers into named fields for backends that expect them.
//! [field_names]
//! 1 = "q1_hair_feel"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::catalog::QuestionCfg;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
  /// Question id (as written in TOML) -> backend field name.
  #[serde(default)]
  pub field_names: HashMap<String, String>,
}

impl QuizConfig {
  /// Field names keyed by numeric question id. Non-numeric keys are skipped with a warning.
  pub fn field_map(&self) -> BTreeMap<u32, String> {
    let mut out = BTreeMap::new();
    for (k, v) in &self.field_names {
      match k.trim().parse::<u32>() {
        Ok(id) => {
          out.insert(id, v.clone());
        }
        Err(_) => warn!(target: "hair_quiz", key = %k, "Ignoring field_names entry with non-numeric question id"),
      }
    }
    out
  }
}

/// Where and how to reach the recommendation backend.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommenderSettings {
  pub base_url: String,
  pub endpoint: String,
  pub fetch_questions: bool,
  pub timeout: Option<Duration>,
}

impl RecommenderSettings {
  /// Read RECOMMENDER_* variables. None when no base URL is set (local fallback mode).
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("RECOMMENDER_BASE_URL").ok()?;
    let endpoint = std::env::var("RECOMMENDER_ENDPOINT").unwrap_or_else(|_| "/diagnose".into());
    let fetch_questions = std::env::var("RECOMMENDER_FETCH_QUESTIONS")
      .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
      .unwrap_or(false);
    let timeout = std::env::var("RECOMMENDER_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .map(Duration::from_secs);

    Some(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      endpoint: normalize_endpoint(&endpoint),
      fetch_questions,
      timeout,
    })
  }
}

/// How long an untouched quiz stays registered when QUIZ_IDLE_SECS is unset.
pub const DEFAULT_QUIZ_IDLE: Duration = Duration::from_secs(30 * 60);

/// QUIZ_IDLE_SECS as a duration; unset or unparsable gives the default.
pub fn quiz_idle_ttl_from_env() -> Duration {
  parse_idle_secs(std::env::var("QUIZ_IDLE_SECS").ok().as_deref())
}

fn parse_idle_secs(raw: Option<&str>) -> Duration {
  match raw.map(str::trim) {
    None => DEFAULT_QUIZ_IDLE,
    Some(s) => match s.parse::<u64>() {
      Ok(secs) => Duration::from_secs(secs),
      Err(_) => {
        warn!(target: "hair_quiz", value = %s, "Ignoring unparsable QUIZ_IDLE_SECS");
        DEFAULT_QUIZ_IDLE
      }
    },
  }
}

fn normalize_endpoint(endpoint: &str) -> String {
  let e = endpoint.trim();
  if e.starts_with('/') { e.to_string() } else { format!("/{}", e) }
}

pub fn parse_quiz_config(src: &str) -> Result<QuizConfig, toml::de::Error> {
  toml::from_str::<QuizConfig>(src)
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_quiz_config(&s) {
      Ok(cfg) => {
        info!(target: "hair_quiz", %path, questions = cfg.questions.len(), "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "hair_quiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "hair_quiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
