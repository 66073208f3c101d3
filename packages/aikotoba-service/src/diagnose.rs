use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use aikotoba_domain::{
	answer::{self, Answer, CanonicalAnswer},
	axes::{self, AxisScores},
	excerpt,
	lexicon::LoveWord,
};

use crate::{DiagnoseService, Error, Result, ValidationCode, prompts};

/// Pre-written interpretation used when the reflection step fails; the
/// reflection must never fail the overall request.
const FALLBACK_INTERPRETATION: &str = "あなたの言葉には、静かに相手を想う気配が残っています。\
うまく言い切れない部分も含めて、その揺らぎ自体があなたの愛のかたちです。";
const FALLBACK_TONE_HINT: &str = "やわらか";

const MIN_PICKS: usize = 1;
const MAX_PICKS: usize = 3;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnoseRequest {
	pub answers: Vec<Answer>,
	#[serde(default = "default_reflect")]
	pub reflect: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Analysis {
	pub summary: String,
	pub scores: AxisScores,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pick {
	pub id: String,
	pub term: String,
	pub lang: String,
	pub gloss: String,
	pub reason: String,
	pub catchphrase: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchResult {
	pub picks: Vec<Pick>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reflection {
	pub excerpts: Vec<String>,
	pub interpretation: String,
	pub tone_hint: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagnoseResponse {
	pub analysis: Analysis,
	pub result: MatchResult,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reflection: Option<Reflection>,
}

#[derive(Debug, Deserialize)]
struct AnalyzerPayload {
	summary: String,
	#[serde(default)]
	scores: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct MatcherPayload {
	picks: Vec<PickPayload>,
}

#[derive(Debug, Deserialize)]
struct PickPayload {
	id: String,
	term: String,
	lang: String,
	#[serde(default)]
	gloss: Option<String>,
	reason: String,
	catchphrase: String,
}

#[derive(Debug, Deserialize)]
struct ReflectionPayload {
	interpretation: String,
	#[serde(rename = "toneHint")]
	tone_hint: String,
}

impl DiagnoseService {
	/// Runs the full diagnosis pipeline. All request validation happens
	/// before the first provider call; failures in the analyzer, ranking,
	/// or matcher steps abort the request with no partial result.
	pub async fn diagnose(&self, req: DiagnoseRequest) -> Result<DiagnoseResponse> {
		let canonical = self.validate(&req)?;
		let free_text = clip_chars(
			&answer::to_embedding_text(&canonical),
			self.cfg.matching.max_free_text_chars as usize,
		);

		let analyzer_messages = prompts::analyzer(&free_text);
		let analyzer_value = self.complete_step("analyzer", &analyzer_messages).await?;
		let analyzer = parse_step::<AnalyzerPayload>("analyzer", analyzer_value)?;

		if analyzer.summary.trim().is_empty() {
			return Err(Error::UpstreamParse { step: "analyzer" });
		}

		let scores = axes::normalize_scores(&analyzer.scores);
		let query_text = format!("{free_text}\n要約: {}", analyzer.summary);
		let candidates = self
			.rank_candidates(&query_text, self.cfg.matching.candidate_k as usize)
			.await?;

		let matcher_messages = prompts::matcher(&analyzer.summary, &scores, &candidates);
		let matcher_value = self.complete_step("matcher", &matcher_messages).await?;
		let matcher = parse_step::<MatcherPayload>("matcher", matcher_value)?;
		let picks = self.validate_picks(matcher.picks, &candidates)?;

		let reflection = if req.reflect {
			Some(self.reflect(&canonical, &analyzer.summary, &query_text).await)
		} else {
			None
		};

		Ok(DiagnoseResponse {
			analysis: Analysis { summary: analyzer.summary, scores },
			result: MatchResult { picks },
			reflection,
		})
	}

	fn validate(&self, req: &DiagnoseRequest) -> Result<Vec<CanonicalAnswer>> {
		if req.answers.is_empty() {
			return Err(Error::Validation {
				code: ValidationCode::InvalidRequest,
				message: "The request must include at least one answer.".to_string(),
			});
		}

		let canonical = answer::canonicalize_batch(&req.answers)?;

		if answer::to_embedding_text(&canonical).trim().is_empty() {
			return Err(Error::Validation {
				code: ValidationCode::Empty,
				message: "The answer set has no usable text.".to_string(),
			});
		}

		Ok(canonical)
	}

	fn validate_picks(&self, picks: Vec<PickPayload>, candidates: &[LoveWord]) -> Result<Vec<Pick>> {
		if !(MIN_PICKS..=MAX_PICKS).contains(&picks.len()) {
			return Err(Error::UpstreamParse { step: "matcher" });
		}

		picks
			.into_iter()
			.map(|pick| {
				if !candidates.iter().any(|candidate| candidate.id == pick.id) {
					return Err(Error::UpstreamParse { step: "matcher" });
				}

				let gloss = match pick.gloss.filter(|gloss| !gloss.trim().is_empty()) {
					Some(gloss) => gloss,
					None => self
						.lexicon
						.get(&pick.id)
						.map(|word| word.gloss.clone())
						.unwrap_or_default(),
				};

				Ok(Pick {
					id: pick.id,
					term: pick.term,
					lang: pick.lang,
					gloss,
					reason: pick.reason,
					catchphrase: pick.catchphrase,
				})
			})
			.collect()
	}

	/// The optional reflection step. Locally extracted excerpts ground the
	/// prompt and are always what the caller sees; provider-echoed excerpts
	/// are discarded. Any failure here degrades to a fixed interpretation.
	async fn reflect(
		&self,
		canonical: &[CanonicalAnswer],
		summary: &str,
		query_text: &str,
	) -> Reflection {
		let excerpts =
			excerpt::extract_excerpts(canonical, self.cfg.matching.max_excerpts as usize);

		match self.try_reflect(&excerpts, summary, query_text).await {
			Ok(payload) => Reflection {
				excerpts,
				interpretation: payload.interpretation,
				tone_hint: payload.tone_hint,
			},
			Err(err) => {
				tracing::warn!(error = %err, "Reflection step failed; using the fallback interpretation.");

				Reflection {
					excerpts,
					interpretation: FALLBACK_INTERPRETATION.to_string(),
					tone_hint: FALLBACK_TONE_HINT.to_string(),
				}
			},
		}
	}

	async fn try_reflect(
		&self,
		excerpts: &[String],
		summary: &str,
		query_text: &str,
	) -> Result<ReflectionPayload> {
		let shortlist = self
			.rank_candidates(query_text, self.cfg.matching.reflection_k as usize)
			.await?;
		let messages = prompts::reflection(summary, excerpts, &shortlist);
		let value = self.complete_step("reflection", &messages).await?;
		let payload = parse_step::<ReflectionPayload>("reflection", value)?;

		if payload.interpretation.trim().is_empty() {
			return Err(Error::UpstreamParse { step: "reflection" });
		}

		Ok(payload)
	}
}

fn parse_step<T>(step: &'static str, value: Value) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	serde_json::from_value(value).map_err(|err| {
		tracing::error!(step, error = %err, "Upstream response failed schema validation.");

		Error::UpstreamParse { step }
	})
}

fn clip_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}

fn default_reflect() -> bool {
	true
}
