//! Interaction widgets: how each question type turns a user gesture into an answer.
//!
//! A widget is stateless. It gets the question, the current answer (possibly
//! none) and one event, and either reports a new normalized value or ignores
//! the event. Ignored events are local guard rejections (unknown token, third
//! ranking pick, event meant for another widget) and never reach the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerValue;
use crate::catalog::{InteractionType, OptionDescriptor, QuestionDescriptor};
use crate::util::normalize_token;

/// Ranking accepts at most this many picks.
pub const RANK_LIMIT: usize = 2;
/// Bounds of the numeric slider (a slider question without options).
pub const SLIDER_MIN: u32 = 1;
pub const SLIDER_MAX: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
  Left,
  Right,
}

/// One user gesture on the current question's widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WidgetEvent {
  Select { value: String },
  Toggle { value: String },
  Slide { position: u32 },
  Swipe { direction: SwipeDirection },
  Pick { value: String },
  Unpick { value: String },
  Match { left: String, right: String },
  Unmatch { left: String },
  Text { text: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
  Report(AnswerValue),
  Ignored,
}

/// Apply one event. Pure: the caller stores the reported value.
pub fn apply(question: &QuestionDescriptor, current: Option<&AnswerValue>, event: &WidgetEvent) -> Outcome {
  use InteractionType as T;
  use WidgetEvent as E;

  match (question.interaction, event) {
    (T::SingleSelect, E::Select { value }) => match resolve(&question.options, value) {
      Some(token) => Outcome::Report(AnswerValue::Single(token)),
      None => Outcome::Ignored,
    },

    (T::MultiSelect, E::Toggle { value }) => {
      let Some(token) = resolve(&question.options, value) else { return Outcome::Ignored };
      let mut chosen: Vec<String> = match current {
        Some(AnswerValue::Multi(v)) => v.clone(),
        _ => Vec::new(),
      };
      if let Some(pos) = chosen.iter().position(|t| *t == token) {
        chosen.remove(pos);
      } else {
        chosen.push(token);
      }
      Outcome::Report(AnswerValue::Multi(in_option_order(&question.options, chosen)))
    }

    (T::Toggle, E::Toggle { value }) => {
      let Some(token) = resolve(&question.options, value) else { return Outcome::Ignored };
      let mut flags: BTreeMap<String, bool> = match current {
        Some(AnswerValue::Flags(m)) => m.clone(),
        _ => question.options.iter().map(|o| (o.value.clone(), false)).collect(),
      };
      let flag = flags.entry(token).or_insert(false);
      *flag = !*flag;
      Outcome::Report(AnswerValue::Flags(flags))
    }

    (T::Slider, E::Slide { position }) => {
      if question.options.is_empty() {
        if (SLIDER_MIN..=SLIDER_MAX).contains(position) {
          Outcome::Report(AnswerValue::Single(position.to_string()))
        } else {
          Outcome::Ignored
        }
      } else {
        match question.options.get(*position as usize) {
          Some(o) => Outcome::Report(AnswerValue::Single(o.value.clone())),
          None => Outcome::Ignored,
        }
      }
    }

    (T::Swipe, E::Swipe { direction }) => {
      let at = swipe_index(question, current);
      let next = match direction {
        SwipeDirection::Left if at > 0 => at - 1,
        SwipeDirection::Right if at + 1 < question.options.len() => at + 1,
        _ => return Outcome::Ignored,
      };
      Outcome::Report(AnswerValue::Single(question.options[next].value.clone()))
    }

    (T::Rank, E::Pick { value }) => {
      let Some(token) = resolve(&question.options, value) else { return Outcome::Ignored };
      let mut ranked = ranked_of(current);
      if ranked.contains(&token) || ranked.len() >= RANK_LIMIT {
        return Outcome::Ignored;
      }
      ranked.push(token);
      Outcome::Report(AnswerValue::Ranked(ranked))
    }

    (T::Rank, E::Unpick { value }) => {
      let Some(token) = resolve(&question.options, value) else { return Outcome::Ignored };
      let mut ranked = ranked_of(current);
      let before = ranked.len();
      ranked.retain(|t| *t != token);
      if ranked.len() == before {
        return Outcome::Ignored;
      }
      Outcome::Report(AnswerValue::Ranked(ranked))
    }

    (T::Match, E::Match { left, right }) => {
      let (Some(l), Some(r)) = (resolve(&question.options, left), resolve(&question.targets, right)) else {
        return Outcome::Ignored;
      };
      let mut pairs = pairs_of(current);
      // One pair per left item and per target: dropping a left item again moves it,
      // a target already taken by another left item refuses the drop.
      if pairs.iter().any(|(k, v)| *v == r && *k != l) {
        return Outcome::Ignored;
      }
      pairs.insert(l, r);
      Outcome::Report(AnswerValue::Pairs(pairs))
    }

    (T::Match, E::Unmatch { left }) => {
      let Some(l) = resolve(&question.options, left) else { return Outcome::Ignored };
      let mut pairs = pairs_of(current);
      if pairs.remove(&l).is_none() {
        return Outcome::Ignored;
      }
      Outcome::Report(AnswerValue::Pairs(pairs))
    }

    (T::FreeText, E::Text { text }) => Outcome::Report(AnswerValue::Text(text.clone())),

    _ => Outcome::Ignored,
  }
}

/// True if `value` is enough to leave a required question.
pub fn is_complete(question: &QuestionDescriptor, value: Option<&AnswerValue>) -> bool {
  let Some(value) = value else { return false };
  match (question.interaction, value) {
    // Ranking is complete once every available slot is taken.
    (InteractionType::Rank, AnswerValue::Ranked(v)) => v.len() >= RANK_LIMIT.min(question.options.len()),
    // Matching is complete once every left item that can be paired is.
    (InteractionType::Match, AnswerValue::Pairs(m)) => m.len() >= question.options.len().min(question.targets.len()),
    _ => !value.is_empty(),
  }
}

//
// Rendering
//

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceView {
  pub label: String,
  pub value: String,
  pub selected: bool,
  /// 1-based position for ranking widgets.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rank: Option<usize>,
  /// Right-hand token this left item is matched to.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub matched_to: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SliderView {
  pub min: u32,
  pub max: u32,
  pub position: u32,
}

/// What the client needs to draw the widget. Derived from props alone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WidgetView {
  pub interaction: InteractionType,
  pub choices: Vec<ChoiceView>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub targets: Vec<ChoiceView>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slider: Option<SliderView>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub swipe_index: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pick_limit: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text: Option<String>,
}

pub fn view(question: &QuestionDescriptor, current: Option<&AnswerValue>) -> WidgetView {
  let ranked = ranked_of(current);
  let pairs = pairs_of(current);

  let choices = question
    .options
    .iter()
    .map(|o| {
      let selected = match current {
        Some(AnswerValue::Single(s)) => *s == o.value,
        Some(AnswerValue::Multi(v)) | Some(AnswerValue::Ranked(v)) => v.contains(&o.value),
        Some(AnswerValue::Flags(m)) => m.get(&o.value).copied().unwrap_or(false),
        Some(AnswerValue::Pairs(m)) => m.contains_key(&o.value),
        _ => false,
      };
      ChoiceView {
        label: o.label.clone(),
        value: o.value.clone(),
        selected,
        rank: ranked.iter().position(|t| *t == o.value).map(|i| i + 1),
        matched_to: pairs.get(&o.value).cloned(),
      }
    })
    .collect();

  let targets = question
    .targets
    .iter()
    .map(|o| ChoiceView {
      label: o.label.clone(),
      value: o.value.clone(),
      selected: pairs.values().any(|r| *r == o.value),
      rank: None,
      matched_to: None,
    })
    .collect();

  let slider = (question.interaction == InteractionType::Slider).then(|| slider_view(question, current));
  let swipe_index = (question.interaction == InteractionType::Swipe).then(|| swipe_index(question, current));
  let pick_limit = (question.interaction == InteractionType::Rank).then_some(RANK_LIMIT);
  let text = match (question.interaction, current) {
    (InteractionType::FreeText, Some(AnswerValue::Text(t))) => Some(t.clone()),
    (InteractionType::FreeText, _) => Some(String::new()),
    _ => None,
  };

  WidgetView {
    interaction: question.interaction,
    choices,
    targets,
    slider,
    swipe_index,
    pick_limit,
    text,
  }
}

fn slider_view(question: &QuestionDescriptor, current: Option<&AnswerValue>) -> SliderView {
  let token = match current {
    Some(AnswerValue::Single(s)) => Some(s.as_str()),
    _ => None,
  };
  if question.options.is_empty() {
    let position = token.and_then(|t| t.parse().ok()).unwrap_or(SLIDER_MIN);
    SliderView { min: SLIDER_MIN, max: SLIDER_MAX, position }
  } else {
    let position = token
      .and_then(|t| question.options.iter().position(|o| o.value == t))
      .unwrap_or(0);
    SliderView {
      min: 0,
      max: question.options.len().saturating_sub(1) as u32,
      position: position as u32,
    }
  }
}

//
// Helpers
//

/// Match a token against options by value or label, case-insensitively.
/// Returns the option's canonical value.
fn resolve(options: &[OptionDescriptor], token: &str) -> Option<String> {
  let needle = normalize_token(token);
  options
    .iter()
    .find(|o| o.value == needle || normalize_token(&o.label) == needle)
    .map(|o| o.value.clone())
}

fn in_option_order(options: &[OptionDescriptor], chosen: Vec<String>) -> Vec<String> {
  options
    .iter()
    .filter(|o| chosen.contains(&o.value))
    .map(|o| o.value.clone())
    .collect()
}

fn swipe_index(question: &QuestionDescriptor, current: Option<&AnswerValue>) -> usize {
  match current {
    Some(AnswerValue::Single(s)) => question.options.iter().position(|o| o.value == *s).unwrap_or(0),
    _ => 0,
  }
}

fn ranked_of(current: Option<&AnswerValue>) -> Vec<String> {
  match current {
    Some(AnswerValue::Ranked(v)) => v.clone(),
    _ => Vec::new(),
  }
}

fn pairs_of(current: Option<&AnswerValue>) -> BTreeMap<String, String> {
  match current {
    Some(AnswerValue::Pairs(m)) => m.clone(),
    _ => BTreeMap::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;

  fn question(index: usize) -> QuestionDescriptor {
    Catalog::builtin().questions()[index].clone()
  }

  fn report(outcome: Outcome) -> AnswerValue {
    match outcome {
      Outcome::Report(v) => v,
      Outcome::Ignored => panic!("event was ignored"),
    }
  }

  #[test]
  fn unanswered_widgets_render_unselected() {
    for q in Catalog::builtin().questions() {
      let v = view(q, None);
      assert!(v.choices.iter().all(|c| !c.selected && c.rank.is_none() && c.matched_to.is_none()));
      assert!(v.targets.iter().all(|c| !c.selected));
    }
    let slider = view(&question(1), None).slider.unwrap();
    assert_eq!((slider.min, slider.max, slider.position), (0, 3, 0));
    assert_eq!(view(&question(2), None).swipe_index, Some(0));
    assert_eq!(view(&question(9), None).text.as_deref(), Some(""));
  }

  #[test]
  fn single_select_reports_lowercased_token() {
    let q = question(0);
    let v = report(apply(&q, None, &WidgetEvent::Select { value: "Dry".into() }));
    assert_eq!(v, AnswerValue::Single("dry".into()));
    assert!(view(&q, Some(&v)).choices[1].selected);
  }

  #[test]
  fn unknown_tokens_and_foreign_events_are_ignored() {
    let q = question(0);
    assert_eq!(apply(&q, None, &WidgetEvent::Select { value: "Purple".into() }), Outcome::Ignored);
    assert_eq!(apply(&q, None, &WidgetEvent::Slide { position: 2 }), Outcome::Ignored);
  }

  #[test]
  fn multi_select_toggle_twice_is_idempotent() {
    let q: QuestionDescriptor = {
      let mut q = question(0);
      q.interaction = InteractionType::MultiSelect;
      q
    };
    let start = AnswerValue::Multi(vec!["dry".into()]);
    let once = report(apply(&q, Some(&start), &WidgetEvent::Toggle { value: "Oily".into() }));
    assert_eq!(once, AnswerValue::Multi(vec!["dry".into(), "oily".into()]));
    let twice = report(apply(&q, Some(&once), &WidgetEvent::Toggle { value: "oily".into() }));
    assert_eq!(twice, start);
  }

  #[test]
  fn multi_select_keeps_option_order() {
    let mut q = question(0);
    q.interaction = InteractionType::MultiSelect;
    let a = report(apply(&q, None, &WidgetEvent::Toggle { value: "Mixed".into() }));
    let b = report(apply(&q, Some(&a), &WidgetEvent::Toggle { value: "Healthy".into() }));
    assert_eq!(b, AnswerValue::Multi(vec!["healthy".into(), "mixed".into()]));
  }

  #[test]
  fn toggle_widget_reports_full_flag_map() {
    let q = question(4);
    let v = report(apply(&q, None, &WidgetEvent::Toggle { value: "Coloring".into() }));
    let AnswerValue::Flags(flags) = &v else { panic!("expected flags") };
    assert_eq!(flags.len(), 3);
    assert_eq!(flags.get("coloring"), Some(&true));
    assert_eq!(flags.get("heat styling"), Some(&false));
    let back = report(apply(&q, Some(&v), &WidgetEvent::Toggle { value: "coloring".into() }));
    let AnswerValue::Flags(flags) = back else { panic!("expected flags") };
    assert!(flags.values().all(|on| !on));
  }

  #[test]
  fn ranking_rejects_a_third_pick() {
    let q = question(3);
    let one = report(apply(&q, None, &WidgetEvent::Pick { value: "Frizz".into() }));
    let two = report(apply(&q, Some(&one), &WidgetEvent::Pick { value: "Breakage".into() }));
    assert_eq!(two, AnswerValue::Ranked(vec!["frizz".into(), "breakage".into()]));
    assert_eq!(apply(&q, Some(&two), &WidgetEvent::Pick { value: "Dullness".into() }), Outcome::Ignored);
    assert_eq!(apply(&q, Some(&one), &WidgetEvent::Pick { value: "frizz".into() }), Outcome::Ignored);

    let v = view(&q, Some(&two));
    assert_eq!(v.choices[0].rank, Some(1));
    assert_eq!(v.choices[1].rank, Some(2));
    assert_eq!(v.choices[2].rank, None);
  }

  #[test]
  fn ranking_unpick_frees_a_slot() {
    let q = question(3);
    let two = AnswerValue::Ranked(vec!["frizz".into(), "breakage".into()]);
    let one = report(apply(&q, Some(&two), &WidgetEvent::Unpick { value: "frizz".into() }));
    assert_eq!(one, AnswerValue::Ranked(vec!["breakage".into()]));
    assert!(!is_complete(&q, Some(&one)));
    assert!(is_complete(&q, Some(&two)));
  }

  #[test]
  fn option_slider_reports_option_at_position() {
    let q = question(1);
    let v = report(apply(&q, None, &WidgetEvent::Slide { position: 2 }));
    assert_eq!(v, AnswerValue::Single("moderately damaged".into()));
    assert_eq!(apply(&q, None, &WidgetEvent::Slide { position: 4 }), Outcome::Ignored);
    assert_eq!(view(&q, Some(&v)).slider.map(|s| s.position), Some(2));
  }

  #[test]
  fn numeric_slider_stays_in_range() {
    let mut q = question(1);
    q.options.clear();
    let mut last = None;
    for step in 1..=7 {
      last = Some(report(apply(&q, last.as_ref(), &WidgetEvent::Slide { position: step })));
    }
    assert_eq!(last, Some(AnswerValue::Single("7".into())));
    assert_eq!(apply(&q, None, &WidgetEvent::Slide { position: 0 }), Outcome::Ignored);
    assert_eq!(apply(&q, None, &WidgetEvent::Slide { position: 11 }), Outcome::Ignored);
  }

  #[test]
  fn swipe_pages_within_bounds() {
    let q = question(2);
    assert_eq!(apply(&q, None, &WidgetEvent::Swipe { direction: SwipeDirection::Left }), Outcome::Ignored);
    let v = report(apply(&q, None, &WidgetEvent::Swipe { direction: SwipeDirection::Right }));
    assert_eq!(v, AnswerValue::Single("wavy".into()));
    let last = AnswerValue::Single("coily".into());
    assert_eq!(apply(&q, Some(&last), &WidgetEvent::Swipe { direction: SwipeDirection::Right }), Outcome::Ignored);
  }

  #[test]
  fn matching_keeps_one_pair_per_left_item() {
    let q = question(7);
    let a = report(apply(&q, None, &WidgetEvent::Match { left: "Sun".into(), right: "Frizz".into() }));
    let b = report(apply(&q, Some(&a), &WidgetEvent::Match { left: "sun".into(), right: "Damage".into() }));
    let AnswerValue::Pairs(pairs) = &b else { panic!("expected pairs") };
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs.get("sun").map(String::as_str), Some("damage"));

    assert_eq!(
      apply(&q, Some(&b), &WidgetEvent::Match { left: "Sun".into(), right: "Rain".into() }),
      Outcome::Ignored
    );
    let cleared = report(apply(&q, Some(&b), &WidgetEvent::Unmatch { left: "Sun".into() }));
    assert!(cleared.is_empty());
    assert_eq!(view(&q, Some(&b)).choices[0].matched_to.as_deref(), Some("damage"));
  }

  #[test]
  fn matching_refuses_a_target_taken_by_another_item() {
    let q = question(7);
    let a = report(apply(&q, None, &WidgetEvent::Match { left: "Sun".into(), right: "Frizz".into() }));
    assert_eq!(
      apply(&q, Some(&a), &WidgetEvent::Match { left: "Wind".into(), right: "Frizz".into() }),
      Outcome::Ignored
    );
    // Re-dropping the same pair is not a conflict.
    assert_eq!(apply(&q, Some(&a), &WidgetEvent::Match { left: "sun".into(), right: "frizz".into() }), Outcome::Report(a.clone()));

    let freed = report(apply(&q, Some(&a), &WidgetEvent::Unmatch { left: "Sun".into() }));
    let b = report(apply(&q, Some(&freed), &WidgetEvent::Match { left: "Wind".into(), right: "Frizz".into() }));
    let AnswerValue::Pairs(pairs) = &b else { panic!("expected pairs") };
    assert_eq!(pairs.get("wind").map(String::as_str), Some("frizz"));
  }

  #[test]
  fn matching_completes_only_when_every_item_is_paired() {
    let q = question(7);
    let mut value: Option<AnswerValue> = None;
    for (left, right) in [("Sun", "Damage"), ("Wind", "Breakage"), ("Humidity", "Frizz")] {
      value = Some(report(apply(&q, value.as_ref(), &WidgetEvent::Match { left: left.into(), right: right.into() })));
      assert!(!is_complete(&q, value.as_ref()));
    }
    value = Some(report(apply(&q, value.as_ref(), &WidgetEvent::Match { left: "Cold".into(), right: "Dullness".into() })));
    assert!(is_complete(&q, value.as_ref()));
  }

  #[test]
  fn free_text_is_reported_verbatim() {
    let q = question(9);
    let v = report(apply(&q, None, &WidgetEvent::Text { text: "Wash Twice a week".into() }));
    assert_eq!(v, AnswerValue::Text("Wash Twice a week".into()));
  }

  #[test]
  fn events_deserialize_from_tagged_json() {
    let e: WidgetEvent = serde_json::from_str(r#"{"action":"swipe","direction":"right"}"#).unwrap();
    assert_eq!(e, WidgetEvent::Swipe { direction: SwipeDirection::Right });
    let e: WidgetEvent = serde_json::from_str(r#"{"action":"match","left":"sun","right":"damage"}"#).unwrap();
    assert!(matches!(e, WidgetEvent::Match { .. }));
  }
}
