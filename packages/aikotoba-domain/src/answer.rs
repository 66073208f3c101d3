use serde::{Deserialize, Serialize};

pub const YES_TOKEN: &str = "はい";
pub const NO_TOKEN: &str = "いいえ";
pub const NOTE_SEPARATOR: char = '/';

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Answer {id} is empty.")]
	EmptyAnswer { id: u32 },
	#[error("Answer {id} is not a valid yes/no value.")]
	InvalidYesNo { id: u32 },
	#[error("Question id {id} appears more than once.")]
	DuplicateQuestion { id: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKind {
	#[serde(rename = "open")]
	Open,
	#[serde(rename = "yesno")]
	YesNo,
	#[serde(rename = "yesno+open")]
	YesNoOpen,
	#[serde(rename = "choice")]
	Choice,
}

/// One raw answer as submitted by the quiz UI. `value` is uninterpreted
/// until canonicalization runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
	pub id: u32,
	pub kind: AnswerKind,
	pub prompt: String,
	pub value: String,
}

/// A validated answer in canonical form. For `yesno+open` the value is
/// re-joined as `"<choice> / <note>"` when a note exists.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalAnswer {
	pub id: u32,
	pub kind: AnswerKind,
	pub prompt: String,
	pub value: String,
}

pub fn canonicalize(answer: &Answer) -> Result<CanonicalAnswer> {
	let value = match answer.kind {
		AnswerKind::Open | AnswerKind::Choice => {
			let trimmed = answer.value.trim();
			if trimmed.is_empty() {
				return Err(Error::EmptyAnswer { id: answer.id });
			}

			trimmed.to_string()
		},
		AnswerKind::YesNo => {
			let trimmed = answer.value.trim();
			if !is_yes_no_token(trimmed) {
				return Err(Error::InvalidYesNo { id: answer.id });
			}

			trimmed.to_string()
		},
		AnswerKind::YesNoOpen => {
			let (choice, note) = split_choice_and_note(&answer.value, answer.id)?;
			if note.is_empty() {
				choice.to_string()
			} else {
				format!("{choice} {NOTE_SEPARATOR} {note}")
			}
		},
	};

	Ok(CanonicalAnswer {
		id: answer.id,
		kind: answer.kind,
		prompt: answer.prompt.clone(),
		value,
	})
}

/// Validates and canonicalizes a full answer batch: rejects duplicate ids,
/// sorts by id so downstream steps see a deterministic order, then applies
/// the per-kind rules.
pub fn canonicalize_batch(answers: &[Answer]) -> Result<Vec<CanonicalAnswer>> {
	let mut sorted: Vec<&Answer> = answers.iter().collect();

	sorted.sort_by_key(|answer| answer.id);

	for pair in sorted.windows(2) {
		if pair[0].id == pair[1].id {
			return Err(Error::DuplicateQuestion { id: pair[0].id });
		}
	}

	sorted.iter().map(|answer| canonicalize(answer)).collect()
}

/// Serializes canonical answers into the single query text used for
/// embedding lookups.
pub fn to_embedding_text(answers: &[CanonicalAnswer]) -> String {
	answers
		.iter()
		.map(|answer| format!("Q{}:{}\nAn:{}", answer.id, answer.prompt, answer.value))
		.collect::<Vec<_>>()
		.join("\n")
}

fn is_yes_no_token(value: &str) -> bool {
	value == YES_TOKEN || value == NO_TOKEN
}

/// Splits a `yesno+open` value at the first separator only. A note that
/// itself contains the separator is kept in full, separators included.
fn split_choice_and_note(raw: &str, id: u32) -> Result<(&'static str, String)> {
	let (choice_part, note_part) = match raw.split_once(NOTE_SEPARATOR) {
		Some((choice, note)) => (choice, note.trim().to_string()),
		None => (raw, String::new()),
	};
	let choice = match choice_part.trim() {
		YES_TOKEN => YES_TOKEN,
		NO_TOKEN => NO_TOKEN,
		_ => return Err(Error::InvalidYesNo { id }),
	};

	Ok((choice, note_part))
}
