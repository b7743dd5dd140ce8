//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Opening, viewing and closing quizzes in the registry
//!   - Routing widget events and navigation to the right controller
//!   - Running the single recommendation request when a quiz is completed
//!
//! The registry lock is held only around controller transitions. The backend
//! call in `go_next` runs with no lock held; its result is applied afterwards
//! and dropped by the controller if the quiz was restarted meanwhile.

use std::time::Instant;

use tracing::{error, info, instrument, warn};

use crate::catalog::QuestionDescriptor;
use crate::domain::RecommendationsData;
use crate::error::QuizError;
use crate::fallback::local_recommendations;
use crate::protocol::{to_view, QuizView};
use crate::quiz::{Advance, QuizController, Submission};
use crate::state::{AppState, QuizSlot};
use crate::util::new_quiz_id;
use crate::widgets::WidgetEvent;

pub fn list_questions(state: &AppState) -> Vec<QuestionDescriptor> {
  state.catalog.questions().to_vec()
}

#[instrument(level = "info", skip(state))]
pub async fn start_quiz(state: &AppState) -> QuizView {
  state.sweep_idle(Instant::now()).await;
  let quiz_id = new_quiz_id();
  let quiz = QuizController::new(state.catalog.clone());
  let view = to_view(&quiz_id, &quiz);
  state.quizzes.write().await.insert(quiz_id.clone(), QuizSlot::new(quiz));
  info!(target: "quiz", %quiz_id, session_id = %view.session_id, questions = state.catalog.len(), "Quiz started");
  view
}

#[instrument(level = "debug", skip(state), fields(%quiz_id))]
pub async fn quiz_view(state: &AppState, quiz_id: &str) -> Result<QuizView, QuizError> {
  let quizzes = state.quizzes.read().await;
  let slot = quizzes.get(quiz_id).ok_or_else(|| QuizError::UnknownQuiz(quiz_id.to_string()))?;
  Ok(to_view(quiz_id, &slot.quiz))
}

/// Run `f` on the controller under the write lock and return the resulting view.
async fn with_quiz<F>(state: &AppState, quiz_id: &str, f: F) -> Result<QuizView, QuizError>
where
  F: FnOnce(&mut QuizController),
{
  let mut quizzes = state.quizzes.write().await;
  let quiz = quizzes.get_mut(quiz_id).ok_or_else(|| QuizError::UnknownQuiz(quiz_id.to_string()))?.touch();
  f(quiz);
  Ok(to_view(quiz_id, quiz))
}

#[instrument(level = "info", skip(state, event), fields(%quiz_id))]
pub async fn submit_answer(state: &AppState, quiz_id: &str, event: &WidgetEvent) -> Result<QuizView, QuizError> {
  with_quiz(state, quiz_id, |quiz| {
    quiz.on_answer(event);
  })
  .await
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn go_previous(state: &AppState, quiz_id: &str) -> Result<QuizView, QuizError> {
  with_quiz(state, quiz_id, |quiz| {
    quiz.previous();
  })
  .await
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn restart_quiz(state: &AppState, quiz_id: &str) -> Result<QuizView, QuizError> {
  with_quiz(state, quiz_id, |quiz| quiz.restart()).await
}

#[instrument(level = "info", skip(state), fields(%quiz_id, %index))]
pub async fn toggle_details(state: &AppState, quiz_id: &str, index: usize) -> Result<QuizView, QuizError> {
  with_quiz(state, quiz_id, |quiz| {
    quiz.toggle_details(index);
  })
  .await
}

#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn end_quiz(state: &AppState, quiz_id: &str) -> Result<(), QuizError> {
  if state.remove_quiz(quiz_id).await {
    info!(target: "quiz", %quiz_id, "Quiz ended");
    Ok(())
  } else {
    Err(QuizError::UnknownQuiz(quiz_id.to_string()))
  }
}

/// Advance one question. On the last question this awaits the recommendation
/// request and returns the results (or error) view.
#[instrument(level = "info", skip(state), fields(%quiz_id))]
pub async fn go_next(state: &AppState, quiz_id: &str) -> Result<QuizView, QuizError> {
  let submission = {
    let mut quizzes = state.quizzes.write().await;
    let quiz = quizzes.get_mut(quiz_id).ok_or_else(|| QuizError::UnknownQuiz(quiz_id.to_string()))?.touch();
    match quiz.next() {
      Advance::Submit(sub) => sub,
      Advance::Moved(_) | Advance::Blocked => return Ok(to_view(quiz_id, quiz)),
    }
  };

  let session_id = submission.session_id.clone();
  let outcome = recommend(state, submission).await;

  let mut quizzes = state.quizzes.write().await;
  let quiz = quizzes.get_mut(quiz_id).ok_or_else(|| QuizError::UnknownQuiz(quiz_id.to_string()))?.touch();
  if !quiz.complete(&session_id, outcome) {
    info!(target: "quiz", %quiz_id, %session_id, "Recommendation arrived after restart; ignored");
  }
  Ok(to_view(quiz_id, quiz))
}

/// One recommendation request, or the local lookup when no backend is configured.
async fn recommend(state: &AppState, sub: Submission) -> Result<RecommendationsData, String> {
  match &state.recommender {
    Some(r) => r.recommend(&sub.session_id, &sub.answers).await.map_err(|e| {
      error!(target: "hair_quiz", session_id = %sub.session_id, error = %e, "Recommendation request failed");
      e.to_string()
    }),
    None => {
      warn!(target: "hair_quiz", session_id = %sub.session_id, "No recommendation backend; using local recommendations");
      Ok(local_recommendations(&sub.session_id, &sub.answers))
    }
  }
}
