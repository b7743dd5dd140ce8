//! Built-in recommendations and small static lookups.
//!
//! Used when no recommendation backend is configured, and as the displayed
//! line when the backend answers with an empty list. These are fixed lookups,
//! not a ranking of any kind.

use chrono::Utc;

use crate::answers::{AnswerStore, AnswerValue};
use crate::domain::{Confidence, RecommendationRecord, RecommendationsData};

/// Local stand-in for the backend: picks one product line from the answers.
pub fn local_recommendations(session_id: &str, answers: &AnswerStore) -> RecommendationsData {
  RecommendationsData {
    session_id: session_id.to_string(),
    recommendations: vec![pick_local_product(answers)],
    timestamp: Utc::now().to_rfc3339(),
  }
}

/// Heavy damage wins, then a shine goal, then the everyday line.
pub fn pick_local_product(answers: &AnswerStore) -> RecommendationRecord {
  let tokens: Vec<&str> = answers
    .iter()
    .filter_map(|(_, v)| match v {
      AnswerValue::Single(s) => Some(s.as_str()),
      _ => None,
    })
    .collect();

  let damaged = tokens
    .iter()
    .any(|t| t.contains("severely") || t.contains("moderately"));
  let wants_shine = tokens.iter().any(|t| t.contains("shine"));

  if damaged {
    local_record(
      "Gliss Repair Intensive",
      "treatment",
      "Deep repair treatment for damaged hair",
      &[
        "Use 2-3 times per week",
        "Apply to damp hair, focus on ends",
        "Leave for 10-15 minutes",
        "Rinse thoroughly with cool water",
      ],
    )
  } else if wants_shine {
    local_record(
      "Gliss Shine Serum",
      "serum",
      "Luminous shine and smoothness",
      &[
        "Apply to damp hair before styling",
        "Use a small amount on ends",
        "Blow dry for maximum shine",
        "Reapply as needed throughout the day",
      ],
    )
  } else {
    local_record(
      "Gliss Daily Care",
      "shampoo",
      "Complete hair care solution",
      &[
        "Use daily shampoo and conditioner",
        "Apply treatment once per week",
        "Use heat protectant before styling",
        "Finish with shine spray",
      ],
    )
  }
}

/// Shown when the backend returns no recommendations at all.
pub fn empty_list_fallback() -> RecommendationRecord {
  RecommendationRecord {
    product_name: "Ultimate Repair Shampoo".into(),
    brand: "Gliss".into(),
    category: "shampoo".into(),
    score: 8.5,
    confidence: Confidence::High,
    reasoning: "Our most advanced repair line designed to transform damaged hair into strong, healthy strands.".into(),
    detailed_explanation: None,
    hair_routine: None,
  }
}

fn local_record(name: &str, category: &str, description: &str, routine: &[&str]) -> RecommendationRecord {
  RecommendationRecord {
    product_name: name.into(),
    brand: "Gliss".into(),
    category: category.into(),
    score: 8.5,
    confidence: Confidence::High,
    reasoning: description.into(),
    detailed_explanation: None,
    hair_routine: Some(routine.join(". ")),
  }
}
