use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read lexicon file at {path:?}.")]
	ReadLexicon { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse lexicon file at {path:?}.")]
	ParseLexicon { path: std::path::PathBuf, source: serde_json::Error },
	#[error("Lexicon entry id {id} appears more than once.")]
	DuplicateId { id: String },
}

/// One vocabulary entry. Loaded once at startup and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoveWord {
	pub id: String,
	pub term: String,
	pub lang: String,
	pub gloss: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub culture_note: Option<String>,
}

impl LoveWord {
	/// The text embedded for similarity ranking against the query.
	pub fn reference_text(&self) -> String {
		format!(
			"{}\n{}\n{}\n{}",
			self.term,
			self.gloss,
			self.tags.join(", "),
			self.culture_note.as_deref().unwrap_or(""),
		)
	}
}

#[derive(Clone, Debug)]
pub struct ScoredWord {
	pub word: LoveWord,
	pub similarity: f32,
}

#[derive(Debug)]
pub struct Lexicon {
	words: Vec<LoveWord>,
}

impl Lexicon {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadLexicon { path: path.to_path_buf(), source: err })?;
		let words: Vec<LoveWord> = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseLexicon { path: path.to_path_buf(), source: err })?;

		Self::from_words(words)
	}

	pub fn from_words(words: Vec<LoveWord>) -> Result<Self> {
		let mut seen = std::collections::HashSet::new();

		for word in &words {
			if !seen.insert(word.id.as_str()) {
				return Err(Error::DuplicateId { id: word.id.clone() });
			}
		}

		Ok(Self { words })
	}

	pub fn words(&self) -> &[LoveWord] {
		&self.words
	}

	pub fn get(&self, id: &str) -> Option<&LoveWord> {
		self.words.iter().find(|word| word.id == id)
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}

/// Orders scored entries by similarity descending, then moves every
/// home-language entry behind all other languages before truncating to `k`.
/// The reorder deliberately suppresses over-representation of the home
/// language among the top candidates.
pub fn shortlist(mut scored: Vec<ScoredWord>, home_lang: &str, k: usize) -> Vec<LoveWord> {
	scored.sort_by(|a, b| {
		b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
	});

	let (home, others): (Vec<ScoredWord>, Vec<ScoredWord>) =
		scored.into_iter().partition(|entry| entry.word.lang == home_lang);

	others.into_iter().chain(home).take(k).map(|entry| entry.word).collect()
}
