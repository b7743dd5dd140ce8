//! Quiz controller: the single linear wizard over the question catalog.
//!
//! States: `Active(i)` → … → `Submitting` → `Results` | `Error`.
//! The controller never performs I/O itself. `next` on the last question hands
//! back a `Submission`; the caller runs the recommendation call and feeds the
//! outcome to `complete`. A completion for an older session id is dropped, so a
//! restart while a request is in flight simply wins.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::answers::{AnswerStore, AnswerValue};
use crate::catalog::{Catalog, QuestionDescriptor};
use crate::domain::RecommendationsData;
use crate::util::new_session_id;
use crate::widgets::{self, Outcome, WidgetEvent};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizState {
  Active { index: usize },
  Submitting,
  Results { data: RecommendationsData },
  Error { message: String },
}

/// Everything one recommendation request needs, captured at submit time.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
  pub session_id: String,
  pub answers: AnswerStore,
}

/// Result of pressing "Next".
#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
  Moved(usize),
  /// Last question done: run exactly one recommendation call with this.
  Submit(Submission),
  /// Guard failed or not in an active state; nothing changed.
  Blocked,
}

pub struct QuizController {
  catalog: Arc<Catalog>,
  state: QuizState,
  answers: AnswerStore,
  session_id: String,
  expanded: BTreeSet<usize>,
}

impl QuizController {
  pub fn new(catalog: Arc<Catalog>) -> Self {
    Self {
      catalog,
      state: QuizState::Active { index: 0 },
      answers: AnswerStore::new(),
      session_id: new_session_id(),
      expanded: BTreeSet::new(),
    }
  }

  pub fn state(&self) -> &QuizState {
    &self.state
  }

  pub fn answers(&self) -> &AnswerStore {
    &self.answers
  }

  pub fn session_id(&self) -> &str {
    &self.session_id
  }

  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  /// Index of the question on screen, if any.
  pub fn current_index(&self) -> Option<usize> {
    match self.state {
      QuizState::Active { index } => Some(index),
      _ => None,
    }
  }

  pub fn current_question(&self) -> Option<&QuestionDescriptor> {
    self.current_index().and_then(|i| self.catalog.get(i))
  }

  pub fn current_answer(&self) -> Option<&AnswerValue> {
    self.current_question().and_then(|q| self.answers.get(q.id))
  }

  /// Route a widget event to the current question. Returns true if the store changed.
  pub fn on_answer(&mut self, event: &WidgetEvent) -> bool {
    let Some(question) = self.current_question() else { return false };
    let id = question.id;
    match widgets::apply(question, self.answers.get(id), event) {
      Outcome::Report(value) => {
        debug!(target: "quiz", question_id = id, "Answer recorded");
        self.answers.record(id, value);
        true
      }
      Outcome::Ignored => {
        debug!(target: "quiz", question_id = id, ?event, "Widget ignored event");
        false
      }
    }
  }

  pub fn can_go_next(&self) -> bool {
    match self.current_question() {
      Some(q) => q.optional || widgets::is_complete(q, self.answers.get(q.id)),
      None => false,
    }
  }

  pub fn can_go_previous(&self) -> bool {
    matches!(self.current_index(), Some(i) if i > 0)
  }

  pub fn is_last_question(&self) -> bool {
    self.current_index() == Some(self.catalog.len().saturating_sub(1))
  }

  pub fn next(&mut self) -> Advance {
    let Some(index) = self.current_index() else {
      debug!(target: "quiz", state = ?self.state_name(), "Next ignored outside active state");
      return Advance::Blocked;
    };
    if !self.can_go_next() {
      return Advance::Blocked;
    }

    if index + 1 < self.catalog.len() {
      self.state = QuizState::Active { index: index + 1 };
      Advance::Moved(index + 1)
    } else {
      self.state = QuizState::Submitting;
      info!(target: "quiz", session_id = %self.session_id, answers = self.answers.len(), "Quiz complete; submitting");
      Advance::Submit(Submission {
        session_id: self.session_id.clone(),
        answers: self.answers.clone(),
      })
    }
  }

  /// Step back one question. Later answers are kept.
  pub fn previous(&mut self) -> bool {
    match self.current_index() {
      Some(i) if i > 0 => {
        self.state = QuizState::Active { index: i - 1 };
        true
      }
      _ => false,
    }
  }

  /// Back to the first question with an empty store and a fresh session id.
  pub fn restart(&mut self) {
    self.answers.clear();
    self.expanded.clear();
    self.session_id = new_session_id();
    self.state = QuizState::Active { index: 0 };
    info!(target: "quiz", session_id = %self.session_id, "Quiz restarted");
  }

  /// Apply the outcome of a submission. Returns false if it was stale and dropped.
  pub fn complete(&mut self, session_id: &str, outcome: Result<RecommendationsData, String>) -> bool {
    if self.state != QuizState::Submitting || session_id != self.session_id {
      warn!(target: "quiz", %session_id, current = %self.session_id, "Dropping stale submission result");
      return false;
    }
    self.expanded.clear();
    self.state = match outcome {
      Ok(data) => QuizState::Results { data },
      Err(message) => QuizState::Error { message },
    };
    true
  }

  /// Flip the detail panel of one result record. Only valid on the results screen.
  pub fn toggle_details(&mut self, record: usize) -> bool {
    let QuizState::Results { data } = &self.state else { return false };
    // An empty reply renders one fallback card.
    if record >= data.recommendations.len().max(1) {
      return false;
    }
    if !self.expanded.remove(&record) {
      self.expanded.insert(record);
    }
    true
  }

  pub fn expanded(&self) -> &BTreeSet<usize> {
    &self.expanded
  }

  pub fn state_name(&self) -> &'static str {
    match self.state {
      QuizState::Active { .. } => "active",
      QuizState::Submitting => "submitting",
      QuizState::Results { .. } => "results",
      QuizState::Error { .. } => "error",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::QuestionCfg;
  use crate::domain::{Confidence, RecommendationRecord};
  use crate::widgets::SwipeDirection;
  use serde_json::json;

  fn three_questions() -> Arc<Catalog> {
    let cfg: Vec<QuestionCfg> = serde_json::from_value(json!([
      {"id": 1, "prompt": "Hair condition?", "type": "single_select", "options": ["Dry", "Oily", "Normal"]},
      {"id": 2, "prompt": "Concerns?", "type": "multi_select", "options": ["Frizz", "Breakage", "Dullness"]},
      {"id": 3, "prompt": "Damage 1-10?", "type": "slider"}
    ]))
    .unwrap();
    Arc::new(Catalog::from_config(cfg).unwrap())
  }

  fn select(v: &str) -> WidgetEvent {
    WidgetEvent::Select { value: v.into() }
  }

  fn data(session_id: &str) -> RecommendationsData {
    RecommendationsData {
      session_id: session_id.into(),
      recommendations: vec![RecommendationRecord {
        product_name: "Total Repair".into(),
        brand: "Gliss".into(),
        category: String::new(),
        score: 7.2,
        confidence: Confidence::High,
        reasoning: "Strong fit".into(),
        detailed_explanation: None,
        hair_routine: None,
      }],
      timestamp: "now".into(),
    }
  }

  fn answer_all(quiz: &mut QuizController) -> Submission {
    assert!(quiz.on_answer(&select("Dry")));
    assert_eq!(quiz.next(), Advance::Moved(1));
    assert!(quiz.on_answer(&WidgetEvent::Toggle { value: "Frizz".into() }));
    assert_eq!(quiz.next(), Advance::Moved(2));
    assert!(quiz.on_answer(&WidgetEvent::Slide { position: 7 }));
    match quiz.next() {
      Advance::Submit(s) => s,
      other => panic!("expected submit, got {:?}", other),
    }
  }

  #[test]
  fn starts_on_first_question() {
    let quiz = QuizController::new(three_questions());
    assert_eq!(quiz.state(), &QuizState::Active { index: 0 });
    assert!(quiz.answers().is_empty());
    assert!(!quiz.can_go_previous());
  }

  #[test]
  fn next_is_blocked_until_answered() {
    let mut quiz = QuizController::new(three_questions());
    assert!(!quiz.can_go_next());
    assert_eq!(quiz.next(), Advance::Blocked);
    assert_eq!(quiz.current_index(), Some(0));

    quiz.on_answer(&select("oily"));
    assert!(quiz.can_go_next());
    assert_eq!(quiz.next(), Advance::Moved(1));
  }

  #[test]
  fn ignored_events_do_not_unblock_next() {
    let mut quiz = QuizController::new(three_questions());
    assert!(!quiz.on_answer(&select("purple")));
    assert!(!quiz.on_answer(&WidgetEvent::Swipe { direction: SwipeDirection::Right }));
    assert!(!quiz.can_go_next());
  }

  #[test]
  fn previous_is_noop_on_first_question() {
    let mut quiz = QuizController::new(three_questions());
    assert!(!quiz.previous());
    assert_eq!(quiz.current_index(), Some(0));
  }

  #[test]
  fn going_back_keeps_later_answers() {
    let mut quiz = QuizController::new(three_questions());
    quiz.on_answer(&select("Dry"));
    quiz.next();
    quiz.on_answer(&WidgetEvent::Toggle { value: "Breakage".into() });
    assert!(quiz.previous());
    quiz.on_answer(&select("Normal"));
    assert_eq!(quiz.answers().get(1), Some(&AnswerValue::Single("normal".into())));
    assert_eq!(quiz.answers().get(2), Some(&AnswerValue::Multi(vec!["breakage".into()])));
    quiz.next();
    assert!(quiz.can_go_next());
  }

  #[test]
  fn last_next_submits_all_answers_once() {
    let mut quiz = QuizController::new(three_questions());
    let sub = answer_all(&mut quiz);
    assert_eq!(sub.session_id, quiz.session_id());
    assert_eq!(
      serde_json::to_value(&sub.answers).unwrap(),
      json!({"1": "dry", "2": ["frizz"], "3": "7"})
    );
    assert_eq!(quiz.state(), &QuizState::Submitting);
    // A second click while in flight does nothing.
    assert_eq!(quiz.next(), Advance::Blocked);
    assert!(!quiz.previous());
  }

  #[test]
  fn completion_moves_to_results_or_error() {
    let mut quiz = QuizController::new(three_questions());
    let sub = answer_all(&mut quiz);
    assert!(quiz.complete(&sub.session_id, Ok(data(&sub.session_id))));
    assert!(matches!(quiz.state(), QuizState::Results { .. }));

    let mut quiz = QuizController::new(three_questions());
    let sub = answer_all(&mut quiz);
    assert!(quiz.complete(&sub.session_id, Err("connection refused".into())));
    assert_eq!(quiz.state(), &QuizState::Error { message: "connection refused".into() });
  }

  #[test]
  fn restart_clears_answers_and_rotates_session() {
    let mut quiz = QuizController::new(three_questions());
    let sub = answer_all(&mut quiz);
    quiz.complete(&sub.session_id, Ok(data(&sub.session_id)));

    quiz.restart();
    assert_eq!(quiz.state(), &QuizState::Active { index: 0 });
    assert!(quiz.answers().is_empty());
    assert_ne!(quiz.session_id(), sub.session_id);
    assert!(!quiz.can_go_next());
    assert_eq!(quiz.next(), Advance::Blocked);
  }

  #[test]
  fn stale_completion_after_restart_is_dropped() {
    let mut quiz = QuizController::new(three_questions());
    let sub = answer_all(&mut quiz);
    quiz.restart();
    assert!(!quiz.complete(&sub.session_id, Ok(data(&sub.session_id))));
    assert_eq!(quiz.state(), &QuizState::Active { index: 0 });
  }

  #[test]
  fn optional_free_text_can_be_skipped() {
    let cfg: Vec<QuestionCfg> = serde_json::from_value(json!([
      {"id": 10, "prompt": "Routine?", "type": "chat-input"}
    ]))
    .unwrap();
    let mut quiz = QuizController::new(Arc::new(Catalog::from_config(cfg).unwrap()));
    assert!(quiz.can_go_next());
    assert!(matches!(quiz.next(), Advance::Submit(_)));
  }

  #[test]
  fn detail_panels_toggle_independently() {
    let mut quiz = QuizController::new(three_questions());
    assert!(!quiz.toggle_details(0));

    let sub = answer_all(&mut quiz);
    let mut d = data(&sub.session_id);
    d.recommendations.push(d.recommendations[0].clone());
    quiz.complete(&sub.session_id, Ok(d));
    let before = quiz.answers().clone();

    assert!(quiz.toggle_details(1));
    assert!(quiz.expanded().contains(&1));
    assert!(!quiz.expanded().contains(&0));
    assert!(quiz.toggle_details(1));
    assert!(quiz.expanded().is_empty());
    assert!(!quiz.toggle_details(2));
    assert_eq!(quiz.answers(), &before);
  }
}
