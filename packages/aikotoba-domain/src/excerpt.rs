use std::{cmp::Ordering, collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::answer::{AnswerKind, CanonicalAnswer};

const EMOTION: &[&str] =
	&["うれし", "寂し", "切な", "痛", "安心", "落ち着", "ドキ", "震え", "怖", "ほっと", "愛し"];
const ACTION: &[&str] =
	&["待つ", "抱き", "手紙", "見守", "話", "変わ", "寄り添", "離れ", "信じ", "謝", "支え"];
const SENSORY: &[&str] =
	&["夕焼け", "香り", "静けさ", "余韻", "影", "風", "光", "鼓動", "温度", "雨音", "湯気"];

const MIN_PHRASE_CHARS: usize = 20;
const MAX_PHRASE_CHARS: usize = 48;
const WINDOW_STRIDE: usize = 36;
const WINDOW_CHARS: usize = 42;
const MIN_EXCERPT_CHARS: usize = 16;
const MAX_EXCERPT_CHARS: usize = 60;
const DUPLICATE_JACCARD: f64 = 0.6;
const FALLBACK_MIN_CHARS: usize = 20;
const FALLBACK_MAX_CHARS: usize = 40;

/// Masking rules applied in order; each rule operates on the output of the
/// previous one, so overlapping categories resolve deterministically.
static MASK_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
	[
		(r"@[0-9A-Za-z_.]+", "@…"),
		(r"[0-9A-Za-z._%+-]+@[0-9A-Za-z.-]+\.[A-Za-z]{2,}", "［連絡先］"),
		(r"(?-u:\b)0\d{1,4}[- ]?\d{1,4}[- ]?\d{3,4}(?-u:\b)", "［連絡先］"),
		(r".{0,8}(?:市|区|町|村|駅)", "［場所］"),
		(r"(?:[一-龥々]{1,4}|[ぁ-んァ-ン]{2,4})(?:さん|くん|ちゃん)", "［名前］"),
	]
	.into_iter()
	.map(|(pattern, replacement)| {
		(Regex::new(pattern).expect("mask pattern is a checked constant"), replacement)
	})
	.collect()
});

static FILLER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new("(です|ます|でした|だと思う|かな|かも)").expect("filler pattern is a checked constant")
});

/// Selects up to `max_excerpts` short, masked, de-duplicated quotations from
/// the free-text answers. Never fails; an all-empty input yields an empty
/// list.
pub fn extract_excerpts(answers: &[CanonicalAnswer], max_excerpts: usize) -> Vec<String> {
	if max_excerpts == 0 {
		return Vec::new();
	}

	let texts: Vec<String> = answers
		.iter()
		.filter(|answer| {
			matches!(answer.kind, AnswerKind::Open | AnswerKind::YesNoOpen)
				&& !answer.value.trim().is_empty()
		})
		.map(|answer| normalize_whitespace(answer.value.trim()))
		.collect();

	let mut scored: Vec<(String, f64)> = texts
		.iter()
		.flat_map(|text| split_to_phrases(text))
		.map(|phrase| mask_pii(&phrase))
		.filter(|phrase| is_reasonable_length(phrase))
		.map(|phrase| {
			let score = score_phrase(&phrase);
			(phrase, score)
		})
		.collect();

	scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

	let mut picked: Vec<String> = Vec::new();

	for (phrase, _) in scored {
		if picked.len() >= max_excerpts {
			break;
		}
		if picked.iter().all(|existing| char_jaccard(existing, &phrase) < DUPLICATE_JACCARD) {
			picked.push(phrase);
		}
	}

	if picked.is_empty()
		&& let Some(fallback) = texts
			.iter()
			.map(|text| mask_pii(&compress(text)))
			.find(|text| text.chars().count() >= FALLBACK_MIN_CHARS)
	{
		picked.push(char_prefix(&fallback, FALLBACK_MAX_CHARS));
	}

	picked.iter().map(|phrase| ensure_terminal_punctuation(phrase)).collect()
}

fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_to_phrases(text: &str) -> Vec<String> {
	let segments: Vec<&str> = text
		.split(['。', '！', '？', '!', '?'])
		.flat_map(|segment| segment.split(['、', ',']))
		.map(str::trim)
		.filter(|segment| !segment.is_empty())
		.collect();
	let mut phrases = Vec::new();

	for segment in segments {
		let len = segment.chars().count();

		if (MIN_PHRASE_CHARS..=MAX_PHRASE_CHARS).contains(&len) {
			phrases.push(segment.to_string());
		} else if len > MAX_PHRASE_CHARS {
			// Overlapping windows so boundary content is not lost.
			let chars: Vec<char> = segment.chars().collect();
			let mut start = 0;

			while start < chars.len() {
				let end = (start + WINDOW_CHARS).min(chars.len());
				if end - start >= MIN_PHRASE_CHARS {
					phrases.push(chars[start..end].iter().collect());
				}

				start += WINDOW_STRIDE;
			}
		}
	}

	phrases
}

fn mask_pii(text: &str) -> String {
	MASK_RULES.iter().fold(text.to_string(), |masked, (pattern, replacement)| {
		pattern.replace_all(&masked, *replacement).into_owned()
	})
}

fn is_reasonable_length(text: &str) -> bool {
	let len = text.chars().count();
	let latin = text.chars().filter(char::is_ascii_alphanumeric).count();

	(MIN_EXCERPT_CHARS..=MAX_EXCERPT_CHARS).contains(&len) && latin <= len.div_ceil(10)
}

fn score_phrase(text: &str) -> f64 {
	let emotion = keyword_density(text, EMOTION);
	let action = if ACTION.iter().any(|keyword| text.contains(keyword)) { 1.0 } else { 0.0 };
	let sensory = keyword_density(text, SENSORY);
	let len = text.chars().count() as f64;
	let length = ((len - 18.0) / (44.0 - 18.0)).clamp(0.0, 1.0);

	0.35 * emotion + 0.25 * action + 0.2 * sensory + 0.2 * length
}

fn keyword_density(text: &str, dictionary: &[&str]) -> f64 {
	let hits = dictionary.iter().filter(|keyword| text.contains(*keyword)).count();

	(hits as f64 / 2.0).min(1.0)
}

fn char_jaccard(a: &str, b: &str) -> f64 {
	let set_a: BTreeSet<char> = a.chars().collect();
	let set_b: BTreeSet<char> = b.chars().collect();
	let intersection = set_a.intersection(&set_b).count();
	let union = set_a.len() + set_b.len() - intersection;

	if union == 0 { 0.0 } else { intersection as f64 / union as f64 }
}

fn compress(text: &str) -> String {
	normalize_whitespace(FILLER.replace_all(text, "").trim())
}

fn char_prefix(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}

fn ensure_terminal_punctuation(text: &str) -> String {
	if text.chars().last().map(|ch| matches!(ch, '。' | '.' | '!' | '？' | '?')).unwrap_or(false) {
		text.to_string()
	} else {
		format!("{text}。")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::answer::{Answer, canonicalize_batch};

	fn open_answers(values: &[&str]) -> Vec<CanonicalAnswer> {
		let answers: Vec<Answer> = values
			.iter()
			.enumerate()
			.map(|(index, value)| Answer {
				id: index as u32 + 1,
				kind: AnswerKind::Open,
				prompt: format!("質問{}", index + 1),
				value: value.to_string(),
			})
			.collect();

		canonicalize_batch(&answers).expect("valid answers")
	}

	#[test]
	fn empty_input_yields_empty_list() {
		assert!(extract_excerpts(&[], 2).is_empty());
	}

	#[test]
	fn zero_requested_excerpts_yields_empty_list() {
		let answers = open_answers(&["夕焼けを見ていたら急に寂しくなって、誰かに会いたくなった。"]);
		assert!(extract_excerpts(&answers, 0).is_empty());
	}

	#[test]
	fn never_returns_more_than_requested() {
		let answers = open_answers(&[
			"夕焼けの光を見ていると急に寂しくなって誰かに会いたくなる気がした。",
			"雨音を聞きながら手紙を書いていると心がゆっくり落ち着いていく。",
			"相手の鼓動を感じながら寄り添っていると深い安心に包まれていく。",
		]);
		let excerpts = extract_excerpts(&answers, 2);
		assert!(excerpts.len() <= 2);
		assert!(!excerpts.is_empty());
	}

	#[test]
	fn excerpts_end_with_terminal_punctuation() {
		let answers = open_answers(&["静けさの中で寄り添っていると安心できて嬉しい"]);
		for excerpt in extract_excerpts(&answers, 2) {
			let last = excerpt.chars().last().expect("non-empty excerpt");
			assert!(matches!(last, '。' | '.' | '!' | '？' | '?'), "got: {excerpt}");
		}
	}

	#[test]
	fn masks_email_addresses() {
		let answers =
			open_answers(&["寂しくなると taro.yamada@example.com に連絡したくなって落ち着かない。"]);
		let excerpts = extract_excerpts(&answers, 2);
		for excerpt in &excerpts {
			assert!(!excerpt.contains("taro.yamada@example.com"), "got: {excerpt}");
		}
	}

	#[test]
	fn masks_honorific_names() {
		let answers =
			open_answers(&["太郎さんと静かな夕焼けの下でゆっくり寄り添っている時間がいちばん落ち着く。"]);
		let excerpts = extract_excerpts(&answers, 2);
		assert!(!excerpts.is_empty());
		for excerpt in &excerpts {
			assert!(!excerpt.contains("太郎さん"), "got: {excerpt}");
			assert!(excerpt.contains("［名前］"), "got: {excerpt}");
		}
	}

	#[test]
	fn masks_phone_numbers() {
		let masked = mask_pii("つい090-1234-5678に電話してしまいそうになる夜がある");
		assert!(!masked.contains("090-1234-5678"));
		assert!(masked.contains("［連絡先］"));
	}

	#[test]
	fn selected_excerpts_are_not_near_duplicates() {
		let answers = open_answers(&[
			"夕焼けの光を見ると寂しくなって誰かに会いたくなる。夕焼けの光を見ると寂しくて誰かに会いたい。",
		]);
		let excerpts = extract_excerpts(&answers, 2);
		if excerpts.len() == 2 {
			assert!(char_jaccard(&excerpts[0], &excerpts[1]) < DUPLICATE_JACCARD);
		}
	}

	#[test]
	fn long_segments_are_windowed_below_the_maximum() {
		let long = "あ".repeat(120);
		for phrase in split_to_phrases(&long) {
			assert!(phrase.chars().count() <= WINDOW_CHARS);
			assert!(phrase.chars().count() >= MIN_PHRASE_CHARS);
		}
	}

	#[test]
	fn short_fragments_are_discarded() {
		assert!(split_to_phrases("短い、とても、短い").is_empty());
	}

	#[test]
	fn latin_heavy_fragments_are_rejected() {
		assert!(!is_reasonable_length("ABCDEFGHIJKLMNOPQRSTUVWX"));
	}

	#[test]
	fn fallback_uses_compressed_source_text() {
		// Every comma-separated fragment is below the phrase minimum, so the
		// compressed source text is the only viable excerpt.
		let answers = open_answers(&["沈黙の時間も苦にならない、そんな相手だと安心です、たぶんそういうことかな"]);
		let excerpts = extract_excerpts(&answers, 2);
		assert_eq!(excerpts.len(), 1);
		assert!(excerpts[0].chars().count() <= FALLBACK_MAX_CHARS + 1);
		assert!(excerpts[0].ends_with('。'));
		assert!(!excerpts[0].contains("です"));
	}
}
