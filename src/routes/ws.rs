//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! A socket is one page instance: quizzes it starts are removed when it closes.

use std::collections::HashSet;
use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::QuizError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, QuizView, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "hair_quiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "hair_quiz", "WebSocket connected");
  let mut conn = WsConnection::new(state);
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = conn.reply_to_text(&txt).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "hair_quiz", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  conn.close().await;
  info!(target: "hair_quiz", "WebSocket disconnected");
}

/// Per-socket state: the quizzes this connection started and still owns.
pub struct WsConnection {
  state: Arc<AppState>,
  owned: HashSet<String>,
}

impl WsConnection {
  pub fn new(state: Arc<AppState>) -> Self {
    Self { state, owned: HashSet::new() }
  }

  /// Parse, dispatch, serialize.
  pub async fn reply_to_text(&mut self, txt: &str) -> String {
    let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
      Ok(incoming) => {
        debug!(target: "hair_quiz", "WS received: {:?}", &incoming);
        let starts = matches!(incoming, ClientWsMessage::StartQuiz);
        let reply = handle_client_ws(incoming, &self.state).await;
        self.track(starts, &reply);
        reply
      }
      Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
    };

    serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    })
  }

  /// Only quizzes started here are owned; viewing another socket's quiz is not.
  fn track(&mut self, started: bool, reply: &ServerWsMessage) {
    match reply {
      ServerWsMessage::Quiz { quiz } if started => {
        self.owned.insert(quiz.quiz_id.clone());
      }
      ServerWsMessage::Ended { quiz_id } => {
        self.owned.remove(quiz_id);
      }
      _ => {}
    }
  }

  /// Drop every quiz this socket still owns.
  pub async fn close(self) {
    let mut released = 0;
    for quiz_id in &self.owned {
      if self.state.remove_quiz(quiz_id).await {
        released += 1;
      }
    }
    if released > 0 {
      info!(target: "quiz", released, "Released quizzes of closed WebSocket");
    }
  }
}

fn quiz_reply(res: Result<QuizView, QuizError>) -> ServerWsMessage {
  match res {
    Ok(quiz) => ServerWsMessage::Quiz { quiz },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::Questions => ServerWsMessage::Questions { questions: list_questions(state) },

    ClientWsMessage::StartQuiz => {
      let quiz = start_quiz(state).await;
      info!(target: "quiz", quiz_id = %quiz.quiz_id, "WS quiz started");
      ServerWsMessage::Quiz { quiz }
    }

    ClientWsMessage::GetQuiz { quiz_id } => quiz_reply(quiz_view(state, &quiz_id).await),

    ClientWsMessage::Answer { quiz_id, event } => quiz_reply(submit_answer(state, &quiz_id, &event).await),

    ClientWsMessage::Next { quiz_id } => quiz_reply(go_next(state, &quiz_id).await),

    ClientWsMessage::Previous { quiz_id } => quiz_reply(go_previous(state, &quiz_id).await),

    ClientWsMessage::Restart { quiz_id } => quiz_reply(restart_quiz(state, &quiz_id).await),

    ClientWsMessage::ToggleDetails { quiz_id, index } => quiz_reply(toggle_details(state, &quiz_id, index).await),

    ClientWsMessage::EndQuiz { quiz_id } => {
      let res = end_quiz(state, &quiz_id).await;
      match res {
        Ok(()) => ServerWsMessage::Ended { quiz_id },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}
