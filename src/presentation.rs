//! Results screen: display metadata layered over the backend's records.
//!
//! Nothing here reorders, rescores or rewrites a record. Score bands only pick
//! an emoji and a color; the product lookup only adds static copy for the top card.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{Confidence, RecommendationRecord, RecommendationsData};
use crate::fallback::empty_list_fallback;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
  High,
  Medium,
  Low,
}

impl ScoreBand {
  pub fn emoji(&self) -> &'static str {
    match self {
      ScoreBand::High => "🌟",
      ScoreBand::Medium => "⭐",
      ScoreBand::Low => "💫",
    }
  }

  pub fn color(&self) -> &'static str {
    match self {
      ScoreBand::High => "green",
      ScoreBand::Medium => "yellow",
      ScoreBand::Low => "red",
    }
  }
}

pub fn score_band(score: f64) -> ScoreBand {
  if score >= 8.0 {
    ScoreBand::High
  } else if score >= 6.0 {
    ScoreBand::Medium
  } else {
    ScoreBand::Low
  }
}

pub fn confidence_color(c: Confidence) -> &'static str {
  match c {
    Confidence::High => "green",
    Confidence::Medium => "yellow",
    Confidence::Low => "gray",
  }
}

pub fn category_icon(category: &str) -> &'static str {
  match category.to_lowercase().as_str() {
    "shampoo" => "🧴",
    "conditioner" => "💧",
    "treatment" => "✨",
    _ => "💇‍♀️",
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductDetails {
  pub features: &'static str,
  pub target_profile: &'static str,
  pub ingredients: Vec<&'static str>,
}

/// Marketing copy per product line, keyed by the backend's product name.
pub fn product_details(product_name: &str) -> ProductDetails {
  match product_name {
    "Ultimate Repair" | "Ultimate Repair Shampoo" => ProductDetails {
      features: "Resistance reconstruction, repair strengthening, intensive treatment",
      target_profile: "Damaged, colored, dry, bleached, brittle, weak hair with breakage and split ends",
      ingredients: vec!["Black Pearl Extract", "Liquid Keratin Complex", "Repair Molecules"],
    },
    "Total Repair" => ProductDetails {
      features: "Moisturizing, suppleness, shine enhancement, deep hydration",
      target_profile: "Dry, damaged, colored, bleached, dull hair needing moisture and shine",
      ingredients: vec!["Hydrolyzed Keratin", "Floral Nectar", "Moisture Lock Complex"],
    },
    _ => ProductDetails {
      features: "Advanced formula for your hair needs",
      target_profile: "Tailored to restore balance and strength",
      ingredients: vec!["Keratin", "Argan Oil", "Biotin"],
    },
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailsView {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detailed_explanation: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hair_routine: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordView {
  pub rank: usize,
  #[serde(flatten)]
  pub record: RecommendationRecord,
  pub band: ScoreBand,
  pub emoji: &'static str,
  pub color: &'static str,
  pub confidence_color: &'static str,
  pub category_icon: &'static str,
  pub expanded: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HairLineView {
  pub name: String,
  pub match_score: f64,
  pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InfoCard {
  pub title: &'static str,
  pub text: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tip: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultsView {
  pub session_id: String,
  pub timestamp: String,
  /// True when the backend returned nothing and the static line is shown.
  pub fallback: bool,
  pub hair_line: HairLineView,
  pub top_details: ProductDetails,
  pub records: Vec<RecordView>,
  /// Detail panel content for expanded records, keyed by record index.
  pub details: BTreeMap<usize, DetailsView>,
  pub ingredients: Vec<InfoCard>,
  pub routine: Vec<InfoCard>,
}

pub fn results_view(data: &RecommendationsData, expanded: &BTreeSet<usize>) -> ResultsView {
  let fallback = data.recommendations.is_empty();
  let records: Vec<RecommendationRecord> = if fallback {
    vec![empty_list_fallback()]
  } else {
    data.recommendations.clone()
  };

  let top = &records[0];
  let hair_line = if fallback {
    HairLineView {
      name: "Ultimate Repair Line".into(),
      match_score: top.score,
      description: top.reasoning.clone(),
    }
  } else {
    HairLineView {
      name: format!("{} Line", top.product_name),
      match_score: top.score,
      description: format!(
        "The {} line is perfectly matched to address your specific hair concerns with targeted ingredients and advanced technology.",
        top.product_name
      ),
    }
  };
  let top_details = product_details(&top.product_name);

  let details = records
    .iter()
    .enumerate()
    .filter(|(i, _)| expanded.contains(i))
    .map(|(i, r)| {
      (
        i,
        DetailsView {
          detailed_explanation: r.detailed_explanation.clone(),
          hair_routine: r.hair_routine.clone(),
        },
      )
    })
    .collect();

  let records = records
    .into_iter()
    .enumerate()
    .map(|(i, record)| {
      let band = score_band(record.score);
      RecordView {
        rank: i + 1,
        band,
        emoji: band.emoji(),
        color: band.color(),
        confidence_color: confidence_color(record.confidence),
        category_icon: category_icon(&record.category),
        expanded: expanded.contains(&i),
        record,
      }
    })
    .collect();

  ResultsView {
    session_id: data.session_id.clone(),
    timestamp: data.timestamp.clone(),
    fallback,
    hair_line,
    top_details,
    records,
    details,
    ingredients: ingredient_cards(),
    routine: routine_cards(),
  }
}

fn ingredient_cards() -> Vec<InfoCard> {
  vec![
    InfoCard { title: "Keratin", text: "Strengthens and repairs damaged strands", tip: None },
    InfoCard { title: "Argan Oil", text: "Provides deep hydration and shine", tip: None },
    InfoCard { title: "Biotin", text: "Promotes hair growth and elasticity", tip: None },
  ]
}

fn routine_cards() -> Vec<InfoCard> {
  vec![
    InfoCard {
      title: "Cleanse & Prep",
      text: "Use the repair shampoo 2–3 times weekly for gentle cleansing.",
      tip: Some("Massage scalp to boost circulation."),
    },
    InfoCard {
      title: "Condition & Treat",
      text: "Apply conditioner or mask from mid-length to ends for hydration and smoothness.",
      tip: Some("Leave in for 3 minutes before rinsing."),
    },
    InfoCard {
      title: "Protect & Style",
      text: "Finish with leave-in care or oil for protection and shine.",
      tip: Some("Always use heat protection when styling."),
    },
  ]
}
