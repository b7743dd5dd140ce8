//! Application state: the question catalog, the optional recommendation client,
//! and the in-memory registry of open quizzes.
//!
//! Catalog precedence at startup:
//!   1. backend `GET /questions` (only when RECOMMENDER_FETCH_QUESTIONS is set)
//!   2. `[[questions]]` from the TOML file at QUIZ_CONFIG_PATH
//!   3. the built-in ten-question game
//!
//! A failing source is logged and the next one is tried.
//!
//! Registry entries carry a last-touched instant. Quizzes idle for longer than
//! QUIZ_IDLE_SECS are swept whenever a new quiz starts; a quiz waiting on the
//! recommendation backend is never swept.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::{load_quiz_config_from_env, quiz_idle_ttl_from_env, RecommenderSettings, DEFAULT_QUIZ_IDLE};
use crate::quiz::{QuizController, QuizState};
use crate::recommender::Recommender;

/// One registered quiz and when it was last used.
pub struct QuizSlot {
    pub quiz: QuizController,
    pub touched: Instant,
}

impl QuizSlot {
    pub fn new(quiz: QuizController) -> Self {
        Self { quiz, touched: Instant::now() }
    }

    /// Mark the quiz as used and hand out the controller.
    pub fn touch(&mut self) -> &mut QuizController {
        self.touched = Instant::now();
        &mut self.quiz
    }
}

#[derive(Clone)]
pub struct AppState {
    pub quizzes: Arc<RwLock<HashMap<String, QuizSlot>>>,
    pub catalog: Arc<Catalog>,
    pub recommender: Option<Recommender>,
    pub idle_ttl: Duration,
}

impl AppState {
    /// Build state from env: load TOML config, init the recommender, resolve the catalog.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Self {
        let cfg_opt = load_quiz_config_from_env();
        let field_names: BTreeMap<u32, String> = cfg_opt
            .as_ref()
            .map(|c| c.field_map())
            .unwrap_or_default();

        let settings = RecommenderSettings::from_env();
        let recommender = match &settings {
            Some(s) => match Recommender::new(s, field_names.clone()) {
                Ok(r) => {
                    info!(target: "hair_quiz", base_url = %r.base_url, endpoint = %r.endpoint, named_fields = field_names.len(), "Recommendation backend enabled.");
                    Some(r)
                }
                Err(e) => {
                    error!(target: "hair_quiz", error = %e, "Failed to build recommendation client; using local recommendations.");
                    None
                }
            },
            None => {
                info!(target: "hair_quiz", "Recommendation backend disabled (no RECOMMENDER_BASE_URL). Using local recommendations.");
                None
            }
        };

        let mut catalog: Option<Catalog> = None;

        if let (Some(r), Some(s)) = (&recommender, &settings) {
            if s.fetch_questions {
                match r.fetch_questions().await {
                    Ok(c) => {
                        info!(target: "hair_quiz", questions = c.len(), source = "backend", "Question catalog loaded");
                        catalog = Some(c);
                    }
                    Err(e) => warn!(target: "hair_quiz", error = %e, "Fetching questions from backend failed; trying local sources"),
                }
            }
        }

        if catalog.is_none() {
            if let Some(cfg) = cfg_opt.filter(|c| !c.questions.is_empty()) {
                match Catalog::from_config(cfg.questions) {
                    Ok(c) => {
                        info!(target: "hair_quiz", questions = c.len(), source = "toml", "Question catalog loaded");
                        catalog = Some(c);
                    }
                    Err(e) => error!(target: "hair_quiz", error = %e, "Invalid questions in TOML config; using built-in catalog"),
                }
            }
        }

        let catalog = catalog.unwrap_or_else(|| {
            let c = Catalog::builtin();
            info!(target: "hair_quiz", questions = c.len(), source = "builtin", "Question catalog loaded");
            c
        });

        let idle_ttl = quiz_idle_ttl_from_env();
        info!(target: "hair_quiz", idle_secs = idle_ttl.as_secs(), "Quiz registry idle limit");
        Self::with_parts(catalog, recommender).with_idle_ttl(idle_ttl)
    }

    /// Assemble state from already-built parts.
    pub fn with_parts(catalog: Catalog, recommender: Option<Recommender>) -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(HashMap::new())),
            catalog: Arc::new(catalog),
            recommender,
            idle_ttl: DEFAULT_QUIZ_IDLE,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Drop every quiz idle for at least `idle_ttl` as of `now`. Returns how many went.
    #[instrument(level = "debug", skip(self, now))]
    pub async fn sweep_idle(&self, now: Instant) -> usize {
        let mut quizzes = self.quizzes.write().await;
        let before = quizzes.len();
        quizzes.retain(|_, slot| {
            *slot.quiz.state() == QuizState::Submitting
                || now.saturating_duration_since(slot.touched) < self.idle_ttl
        });
        let swept = before - quizzes.len();
        if swept > 0 {
            info!(target: "quiz", swept, remaining = quizzes.len(), "Swept idle quizzes");
        }
        swept
    }

    /// Drop a quiz. Returns false if it was not registered.
    #[instrument(level = "debug", skip(self), fields(%quiz_id))]
    pub async fn remove_quiz(&self, quiz_id: &str) -> bool {
        self.quizzes.write().await.remove(quiz_id).is_some()
    }

    pub async fn quiz_count(&self) -> usize {
        self.quizzes.read().await.len()
    }
}
