//! Minimal client for the external recommendation backend.
//!
//! One POST per completed quiz, no caching, no retry. The canonical request is
//! `{ "session_id", "answers": { "<question id>": value } }`. Backends that want
//! one named field per question get the same answers flattened at this
//! boundary (see `field_names`), so nothing upstream knows about that shape.
//!
//! NOTE: we log sizes and status codes, not answer contents.

use std::collections::BTreeMap;
use std::time::Instant;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument};

use crate::answers::AnswerStore;
use crate::catalog::{Catalog, QuestionCfg};
use crate::config::RecommenderSettings;
use crate::domain::RecommendationsData;
use crate::error::RecommenderError;
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct Recommender {
  pub client: reqwest::Client,
  pub base_url: String,
  pub endpoint: String,
  /// Question id -> backend field name. Empty means the generic `answers` map.
  pub field_names: BTreeMap<u32, String>,
}

impl Recommender {
  pub fn new(settings: &RecommenderSettings, field_names: BTreeMap<u32, String>) -> Result<Self, RecommenderError> {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = settings.timeout {
      builder = builder.timeout(t);
    }
    let client = builder.build()?;
    Ok(Self {
      client,
      base_url: settings.base_url.clone(),
      endpoint: settings.endpoint.clone(),
      field_names,
    })
  }

  /// Test helper: generic schema, default endpoint, short timeout.
  #[cfg(test)]
  pub fn for_base_url(base_url: &str) -> Self {
    let settings = RecommenderSettings {
      base_url: base_url.trim_end_matches('/').to_string(),
      endpoint: "/diagnose".into(),
      fetch_questions: false,
      timeout: Some(std::time::Duration::from_secs(5)),
    };
    Self::new(&settings, BTreeMap::new()).expect("reqwest client")
  }

  /// Build the JSON body for one submission.
  pub fn request_body(&self, session_id: &str, answers: &AnswerStore) -> Result<Value, RecommenderError> {
    if self.field_names.is_empty() {
      return Ok(json!({ "session_id": session_id, "answers": answers }));
    }

    let mut body = Map::new();
    body.insert("session_id".into(), Value::String(session_id.to_string()));
    for (id, value) in answers.iter() {
      let key = self
        .field_names
        .get(id)
        .cloned()
        .unwrap_or_else(|| format!("q{}", id));
      body.insert(key, serde_json::to_value(value)?);
    }
    Ok(Value::Object(body))
  }

  /// Submit answers and return the backend's ranked records unchanged.
  #[instrument(level = "info", skip(self, answers), fields(%session_id, answers = answers.len(), endpoint = %self.endpoint))]
  pub async fn recommend(&self, session_id: &str, answers: &AnswerStore) -> Result<RecommendationsData, RecommenderError> {
    let url = format!("{}{}", self.base_url, self.endpoint);
    let body = self.request_body(session_id, answers)?;
    let start = Instant::now();

    let res = self.client.post(&url)
      .header(USER_AGENT, "hair-quiz-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&body).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let text = res.text().await.unwrap_or_default();
      let message = extract_backend_error(&text).unwrap_or_else(|| trunc_for_log(&text, 200));
      error!(target: "hair_quiz", status = status.as_u16(), elapsed = ?start.elapsed(), "Recommendation backend returned an error");
      return Err(RecommenderError::Status { status: status.as_u16(), message });
    }

    let bytes = res.bytes().await?;
    let data: RecommendationsData = serde_json::from_slice(&bytes)?;
    info!(
      target: "hair_quiz",
      elapsed = ?start.elapsed(),
      bytes = bytes.len(),
      recommendations = data.recommendations.len(),
      "Recommendations received"
    );
    Ok(data)
  }

  /// Fetch the backend's question catalog (`GET /questions`).
  #[instrument(level = "info", skip(self))]
  pub async fn fetch_questions(&self) -> Result<Catalog, RecommenderError> {
    #[derive(Deserialize)]
    struct QuestionsWrap { questions: Vec<QuestionCfg> }

    let url = format!("{}/questions", self.base_url);
    let res = self.client.get(&url)
      .header(USER_AGENT, "hair-quiz-backend/0.1")
      .send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let text = res.text().await.unwrap_or_default();
      let message = extract_backend_error(&text).unwrap_or_else(|| trunc_for_log(&text, 200));
      return Err(RecommenderError::Status { status: status.as_u16(), message });
    }

    let bytes = res.bytes().await?;
    let wrap: QuestionsWrap = serde_json::from_slice(&bytes)?;
    Ok(Catalog::from_config(wrap.questions)?)
  }
}

/// Try to extract a clean error message from a FastAPI-style `{"detail": ...}` body.
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { detail: Value }
  match serde_json::from_str::<EWrap>(body) {
    Ok(EWrap { detail: Value::String(s) }) => Some(s),
    Ok(EWrap { detail }) => Some(detail.to_string()),
    Err(_) => None,
  }
}
