//! Error types for catalog loading, the recommendation backend, and quiz lookups.

use thiserror::Error;

/// A question catalog that cannot drive a quiz.
#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
  #[error("catalog has no questions")]
  Empty,

  #[error("question id {0} appears more than once")]
  DuplicateId(u32),

  #[error("question {id} ({interaction}) needs at least one option")]
  MissingOptions { id: u32, interaction: String },

  #[error("matching question {0} needs at least one target")]
  MissingTargets(u32),
}

/// Failures talking to the external recommendation backend.
/// All of them end up as one opaque message on the quiz error screen.
#[derive(Error, Debug)]
pub enum RecommenderError {
  #[error("recommendation backend unreachable: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("recommendation backend HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("invalid recommendation payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("invalid question catalog from backend: {0}")]
  Catalog(#[from] CatalogError),
}

#[derive(Error, Debug, PartialEq)]
pub enum QuizError {
  #[error("Unknown quizId: {0}")]
  UnknownQuiz(String),
}
