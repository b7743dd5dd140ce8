//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! The same `QuizView` goes out over both transports so a client can switch freely.

use serde::{Deserialize, Serialize};

use crate::answers::AnswerStore;
use crate::catalog::QuestionDescriptor;
use crate::presentation::{results_view, ResultsView};
use crate::quiz::{QuizController, QuizState};
use crate::util::progress_percent;
use crate::widgets::{self, WidgetEvent, WidgetView};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Questions,
    StartQuiz,
    GetQuiz {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
    Answer {
        #[serde(rename = "quizId")]
        quiz_id: String,
        event: WidgetEvent,
    },
    Next {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
    Previous {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
    Restart {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
    ToggleDetails {
        #[serde(rename = "quizId")]
        quiz_id: String,
        index: usize,
    },
    EndQuiz {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Questions { questions: Vec<QuestionDescriptor> },
    Quiz { quiz: QuizView },
    Ended { quiz_id: String },
    Error { message: String },
}

/// The question on screen, with everything needed to draw it.
#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub progress_percent: u8,
    pub question: QuestionDescriptor,
    pub widget: WidgetView,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub is_last: bool,
}

/// DTO used by both WS and HTTP for quiz delivery.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub quiz_id: String,
    pub session_id: String,
    /// "active", "submitting", "results" or "error".
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    pub answers: AnswerStore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot a controller into its public view.
pub fn to_view(quiz_id: &str, quiz: &QuizController) -> QuizView {
    let question = match (quiz.current_index(), quiz.current_question()) {
        (Some(index), Some(q)) => {
            let total = quiz.catalog().len();
            Some(QuestionView {
                index,
                total,
                progress_percent: progress_percent(index, total),
                question: q.clone(),
                widget: widgets::view(q, quiz.current_answer()),
                can_go_next: quiz.can_go_next(),
                can_go_previous: quiz.can_go_previous(),
                is_last: quiz.is_last_question(),
            })
        }
        _ => None,
    };

    let (results, error) = match quiz.state() {
        QuizState::Results { data } => (Some(results_view(data, quiz.expanded())), None),
        QuizState::Error { message } => (None, Some(message.clone())),
        _ => (None, None),
    };

    QuizView {
        quiz_id: quiz_id.to_string(),
        session_id: quiz.session_id().to_string(),
        status: quiz.state_name(),
        question,
        answers: quiz.answers().clone(),
        results,
        error,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub questions: usize,
    pub recommender: bool,
    pub open_quizzes: usize,
}

#[derive(Serialize)]
pub struct QuestionsOut {
    pub questions: Vec<QuestionDescriptor>,
}

#[derive(Serialize)]
pub struct DeletedOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn parses_client_messages_with_camel_case_ids() {
        let msg: ClientWsMessage = serde_json::from_value(json!({
            "type": "answer",
            "quizId": "quiz_1",
            "event": {"action": "select", "value": "Dry"}
        }))
        .unwrap();
        match msg {
            ClientWsMessage::Answer { quiz_id, event } => {
                assert_eq!(quiz_id, "quiz_1");
                assert_eq!(event, WidgetEvent::Select { value: "Dry".into() });
            }
            other => panic!("unexpected message: {:?}", other),
        }

        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type": "toggle_details", "quizId": "q", "index": 2}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::ToggleDetails { index: 2, .. }));
    }

    #[test]
    fn fresh_quiz_view_shows_first_question() {
        let quiz = QuizController::new(Arc::new(Catalog::builtin()));
        let view = to_view("quiz_1", &quiz);
        assert_eq!(view.status, "active");
        let q = view.question.as_ref().unwrap();
        assert_eq!(q.index, 0);
        assert_eq!(q.total, 10);
        assert_eq!(q.progress_percent, 10);
        assert!(!q.can_go_next);
        assert!(!q.can_go_previous);
        assert!(view.results.is_none());

        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v["quiz_id"], "quiz_1");
        assert_eq!(v["answers"], json!({}));
        assert!(v.get("error").is_none());
    }

    #[test]
    fn server_messages_are_tagged() {
        let v = serde_json::to_value(ServerWsMessage::Ended { quiz_id: "q".into() }).unwrap();
        assert_eq!(v, json!({"type": "ended", "quiz_id": "q"}));
        let v = serde_json::to_value(ServerWsMessage::Pong).unwrap();
        assert_eq!(v, json!({"type": "pong"}));
    }
}
