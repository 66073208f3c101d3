use aikotoba_domain::{
	lexicon::{LoveWord, ScoredWord, shortlist},
	similarity::cosine_sim,
};

use crate::{DiagnoseService, Error, Result};

impl DiagnoseService {
	/// Ranks the whole lexicon against `query_text` and returns the top `k`
	/// entries with home-language entries demoted behind all others.
	/// Reference-text vectors are memoized across requests; the query vector
	/// is embedded fresh every time.
	pub async fn rank_candidates(&self, query_text: &str, k: usize) -> Result<Vec<LoveWord>> {
		if self.lexicon.is_empty() || k == 0 {
			return Ok(Vec::new());
		}

		let query_vectors = self.embed_texts(&[query_text.to_string()]).await?;
		let Some(query_vector) = query_vectors.into_iter().next() else {
			return Err(Error::UpstreamUnavailable {
				message: "Embedding provider returned no vector for the query text.".to_string(),
			});
		};

		let words = self.lexicon.words();
		let references: Vec<String> = words.iter().map(LoveWord::reference_text).collect();
		let mut vectors: Vec<Option<Vec<f32>>> =
			references.iter().map(|text| self.embedding_cache().get(text)).collect();
		let missing: Vec<usize> =
			vectors.iter().enumerate().filter(|(_, v)| v.is_none()).map(|(i, _)| i).collect();

		if !missing.is_empty() {
			let texts: Vec<String> =
				missing.iter().map(|&index| references[index].clone()).collect();
			let fetched = self.embed_texts(&texts).await?;

			if fetched.len() != missing.len() {
				return Err(Error::UpstreamUnavailable {
					message: format!(
						"Embedding provider returned {} vectors for {} lexicon entries.",
						fetched.len(),
						missing.len(),
					),
				});
			}

			tracing::debug!(fetched = missing.len(), "Embedded uncached lexicon references.");

			for (&index, vector) in missing.iter().zip(fetched) {
				self.embedding_cache().insert(references[index].clone(), vector.clone());
				vectors[index] = Some(vector);
			}
		}

		let mut scored = Vec::with_capacity(words.len());

		for (word, vector) in words.iter().zip(vectors) {
			let Some(vector) = vector else {
				return Err(Error::UpstreamUnavailable {
					message: "Embedding provider returned no vector for a lexicon entry."
						.to_string(),
				});
			};

			scored.push(ScoredWord {
				word: word.clone(),
				similarity: cosine_sim(&query_vector, &vector)?,
			});
		}

		Ok(shortlist(scored, &self.cfg.lexicon.home_lang, k))
	}
}
