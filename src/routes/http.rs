//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Unknown quiz ids map to 404 with an `{ error }` body.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::error::QuizError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::widgets::WidgetEvent;

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let status = match self {
      QuizError::UnknownQuiz(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    ok: true,
    questions: state.catalog.len(),
    recommender: state.recommender.is_some(),
    open_quizzes: state.quiz_count().await,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_questions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(QuestionsOut { questions: list_questions(&state) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_start_quiz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let view = start_quiz(&state).await;
  info!(target: "quiz", quiz_id = %view.quiz_id, "HTTP quiz started");
  (StatusCode::CREATED, Json(view))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(quiz_view(&state, &quiz_id).await?))
}

#[instrument(level = "info", skip(state, event), fields(%quiz_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
  Json(event): Json<WidgetEvent>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(submit_answer(&state, &quiz_id, &event).await?))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_post_next(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, QuizError> {
  let view = go_next(&state, &quiz_id).await?;
  info!(target: "quiz", %quiz_id, status = view.status, "HTTP next");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_post_previous(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(go_previous(&state, &quiz_id).await?))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_post_restart(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(restart_quiz(&state, &quiz_id).await?))
}

#[instrument(level = "info", skip(state), fields(%quiz_id, %index))]
pub async fn http_post_details(
  State(state): State<Arc<AppState>>,
  Path((quiz_id, index)): Path<(String, usize)>,
) -> Result<Json<QuizView>, QuizError> {
  Ok(Json(toggle_details(&state, &quiz_id, index).await?))
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn http_delete_quiz(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
) -> Result<Json<DeletedOut>, QuizError> {
  end_quiz(&state, &quiz_id).await?;
  Ok(Json(DeletedOut { ok: true }))
}
