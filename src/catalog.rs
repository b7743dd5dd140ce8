//! Question catalog: the ordered, immutable list of questions one quiz walks through.
//!
//! Sources, in priority order:
//!   - `GET /questions` on the recommendation backend (when enabled)
//!   - `[[questions]]` in the TOML file at QUIZ_CONFIG_PATH
//!   - the built-in ten-question game below
//!
//! Every source goes through `QuestionCfg`, which accepts both the backend's
//! field names (`title`, `single_choice`) and the game's tags (`card-select`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::util::normalize_token;

/// Closed set of answering modalities. Dispatch on this is a plain `match`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
  #[serde(
    alias = "single_choice",
    alias = "card-select",
    alias = "mcq",
    alias = "emoji-selector",
    alias = "treasure-pick",
    alias = "character-builder"
  )]
  SingleSelect,
  #[serde(alias = "multiple_choice", alias = "multi-select")]
  MultiSelect,
  #[serde(alias = "toggle-puzzle")]
  Toggle,
  #[serde(alias = "damage-slider", alias = "range")]
  Slider,
  #[serde(alias = "swipe-choice")]
  Swipe,
  #[serde(alias = "drag-rank")]
  Rank,
  #[serde(alias = "puzzle-matching")]
  Match,
  #[serde(alias = "chat-input")]
  FreeText,
}

impl InteractionType {
  pub fn as_str(&self) -> &'static str {
    match self {
      InteractionType::SingleSelect => "single_select",
      InteractionType::MultiSelect => "multi_select",
      InteractionType::Toggle => "toggle",
      InteractionType::Slider => "slider",
      InteractionType::Swipe => "swipe",
      InteractionType::Rank => "rank",
      InteractionType::Match => "match",
      InteractionType::FreeText => "free_text",
    }
  }

  /// Free text has no options; a slider without options is the numeric 1-10 scale.
  fn needs_options(&self) -> bool {
    !matches!(self, InteractionType::FreeText | InteractionType::Slider)
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionDescriptor {
  pub label: String,
  /// Canonical answer token, already normalized.
  pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuestionDescriptor {
  pub id: u32,
  pub prompt: String,
  pub interaction: InteractionType,
  pub options: Vec<OptionDescriptor>,
  /// Right-hand items of a matching question; empty otherwise.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub targets: Vec<OptionDescriptor>,
  /// Optional questions may be left empty before moving on.
  pub optional: bool,
}

/// Option as written in config or returned by the backend: a bare label or `{label, value}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionCfg {
  Bare(String),
  Full {
    label: String,
    #[serde(default)]
    value: Option<String>,
  },
}

impl From<OptionCfg> for OptionDescriptor {
  fn from(cfg: OptionCfg) -> Self {
    match cfg {
      OptionCfg::Bare(label) => OptionDescriptor { value: normalize_token(&label), label },
      OptionCfg::Full { label, value } => {
        let value = normalize_token(value.as_deref().unwrap_or(&label));
        OptionDescriptor { label, value }
      }
    }
  }
}

/// Question entry accepted from TOML configuration or the backend's `/questions`.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub id: u32,
  #[serde(alias = "title", alias = "question")]
  pub prompt: String,
  #[serde(rename = "type", alias = "interaction")]
  pub interaction: InteractionType,
  #[serde(default)]
  pub options: Vec<OptionCfg>,
  #[serde(default)]
  pub targets: Vec<OptionCfg>,
  #[serde(default)]
  pub optional: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
  questions: Vec<QuestionDescriptor>,
}

impl Catalog {
  /// Validate and freeze a list of configured questions. Order is kept as given.
  pub fn from_config(entries: Vec<QuestionCfg>) -> Result<Self, CatalogError> {
    if entries.is_empty() {
      return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(entries.len());
    for cfg in entries {
      if !seen.insert(cfg.id) {
        return Err(CatalogError::DuplicateId(cfg.id));
      }
      if cfg.interaction.needs_options() && cfg.options.is_empty() {
        return Err(CatalogError::MissingOptions {
          id: cfg.id,
          interaction: cfg.interaction.as_str().to_string(),
        });
      }
      if cfg.interaction == InteractionType::Match && cfg.targets.is_empty() {
        return Err(CatalogError::MissingTargets(cfg.id));
      }

      let optional = cfg.optional.unwrap_or(cfg.interaction == InteractionType::FreeText);
      questions.push(QuestionDescriptor {
        id: cfg.id,
        prompt: cfg.prompt,
        interaction: cfg.interaction,
        options: cfg.options.into_iter().map(OptionDescriptor::from).collect(),
        targets: cfg.targets.into_iter().map(OptionDescriptor::from).collect(),
        optional,
      });
    }

    Ok(Self { questions })
  }

  /// The built-in game flow. Used when neither the backend nor TOML supplies questions.
  pub fn builtin() -> Self {
    use InteractionType::*;
    let q = |id: u32, prompt: &str, interaction: InteractionType, options: &[&str]| QuestionDescriptor {
      id,
      prompt: prompt.to_string(),
      interaction,
      options: bare(options),
      targets: Vec::new(),
      optional: interaction == FreeText,
    };

    let mut weather = q(8, "How does weather affect your hair?", Match, &["Sun", "Wind", "Humidity", "Cold"]);
    weather.targets = bare(&["Frizz", "Damage", "Dullness", "Breakage"]);

    Self {
      questions: vec![
        q(1, "What best describes your hair condition?", SingleSelect, &["Healthy", "Dry", "Oily", "Mixed"]),
        q(2, "How damaged is your hair?", Slider, &["Not damaged", "Slightly damaged", "Moderately damaged", "Severely damaged"]),
        q(3, "What is your natural hair texture?", Swipe, &["Straight", "Wavy", "Curly", "Coily"]),
        q(4, "What are your TOP 2 hair concerns?", Rank, &["Frizz", "Breakage", "Dullness", "Scalp issues"]),
        q(5, "How often do you style or treat your hair?", Toggle, &["Heat styling", "Coloring", "Chemical treatments"]),
        q(6, "What is your main hair goal?", SingleSelect, &["Repair", "Smooth", "Shine"]),
        q(7, "What is your scalp condition?", SingleSelect, &["Healthy", "Itchy", "Dandruff", "Sensitive"]),
        weather,
        q(9, "What is your hair volume preference?", SingleSelect, &["Fine", "Medium", "Thick", "Very thick"]),
        q(10, "Describe your current hair routine.", FreeText, &[]),
      ],
    }
  }

  pub fn questions(&self) -> &[QuestionDescriptor] {
    &self.questions
  }

  pub fn get(&self, index: usize) -> Option<&QuestionDescriptor> {
    self.questions.get(index)
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }
}

fn bare(labels: &[&str]) -> Vec<OptionDescriptor> {
  labels
    .iter()
    .map(|l| OptionDescriptor::from(OptionCfg::Bare(l.to_string())))
    .collect()
}
