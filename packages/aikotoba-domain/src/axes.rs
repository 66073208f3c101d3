use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed set of dimensions a diagnosis is scored along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoveAxis {
	Passion,
	Serenity,
	Dependence,
	Autonomy,
	Expressive,
	Restrained,
	Enduring,
	Fleeting,
	Poetic,
	Pragmatic,
}

pub type AxisScores = BTreeMap<LoveAxis, f64>;

impl LoveAxis {
	pub const ALL: [Self; 10] = [
		Self::Passion,
		Self::Serenity,
		Self::Dependence,
		Self::Autonomy,
		Self::Expressive,
		Self::Restrained,
		Self::Enduring,
		Self::Fleeting,
		Self::Poetic,
		Self::Pragmatic,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Passion => "passion",
			Self::Serenity => "serenity",
			Self::Dependence => "dependence",
			Self::Autonomy => "autonomy",
			Self::Expressive => "expressive",
			Self::Restrained => "restrained",
			Self::Enduring => "enduring",
			Self::Fleeting => "fleeting",
			Self::Poetic => "poetic",
			Self::Pragmatic => "pragmatic",
		}
	}
}

/// Normalizes externally supplied axis scores into the canonical mapping:
/// every axis present, values clamped to [0, 1] and rounded to 3 decimals.
/// Missing or non-numeric values fall back to the 0.5 midpoint. Idempotent.
pub fn normalize_scores(raw: &Map<String, Value>) -> AxisScores {
	LoveAxis::ALL.iter().map(|axis| (*axis, clamp_score(raw.get(axis.as_str())))).collect()
}

fn clamp_score(value: Option<&Value>) -> f64 {
	let Some(number) = value.and_then(Value::as_f64).filter(|v| v.is_finite()) else {
		return 0.5;
	};

	round3(number.clamp(0.0, 1.0))
}

fn round3(value: f64) -> f64 {
	(value * 1_000.0).round() / 1_000.0
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(pairs: &[(&str, Value)]) -> Map<String, Value> {
		pairs.iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
	}

	#[test]
	fn covers_every_axis() {
		let scores = normalize_scores(&Map::new());
		assert_eq!(scores.len(), LoveAxis::ALL.len());
		assert!(scores.values().all(|v| *v == 0.5));
	}

	#[test]
	fn clamps_out_of_range_values() {
		let scores = normalize_scores(&raw(&[
			("passion", Value::from(-5.0)),
			("serenity", Value::from(5.0)),
		]));
		assert_eq!(scores[&LoveAxis::Passion], 0.0);
		assert_eq!(scores[&LoveAxis::Serenity], 1.0);
	}

	#[test]
	fn rounds_to_three_decimals() {
		let scores = normalize_scores(&raw(&[("poetic", Value::from(0.6789))]));
		assert_eq!(scores[&LoveAxis::Poetic], 0.679);
	}

	#[test]
	fn non_numeric_values_become_midpoint() {
		let scores = normalize_scores(&raw(&[("autonomy", Value::from("high"))]));
		assert_eq!(scores[&LoveAxis::Autonomy], 0.5);
	}

	#[test]
	fn is_idempotent() {
		let first = normalize_scores(&raw(&[
			("passion", Value::from(0.123_456)),
			("fleeting", Value::from(2.0)),
			("enduring", Value::from(-1.0)),
		]));
		let as_raw: Map<String, Value> = first
			.iter()
			.map(|(axis, value)| (axis.as_str().to_string(), Value::from(*value)))
			.collect();
		let second = normalize_scores(&as_raw);
		assert_eq!(first, second);
	}
}
