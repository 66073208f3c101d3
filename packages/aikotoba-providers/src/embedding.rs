use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds a batch of texts in one provider call. The returned vectors are
/// aligned with the input order and checked against the configured
/// dimensionality so the similarity stage never sees mismatched vectors.
pub async fn embed(
	cfg: &aikotoba_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json, texts.len(), cfg.dimensions as usize)
}

fn parse_embedding_response(
	json: Value,
	expected_count: usize,
	expected_dim: usize,
) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json)
		.map_err(|err| eyre::eyre!("Embedding response has an unexpected shape: {err}."))?;

	if response.data.len() != expected_count {
		return Err(eyre::eyre!(
			"Embedding response returned {} vectors for {} inputs.",
			response.data.len(),
			expected_count,
		));
	}

	let mut indexed: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(fallback_index, item)| (item.index.unwrap_or(fallback_index), item.embedding))
		.collect();

	indexed.sort_by_key(|(index, _)| *index);

	for (_, vector) in &indexed {
		if vector.len() != expected_dim {
			return Err(eyre::eyre!(
				"Embedding vector has {} dimensions; expected {expected_dim}.",
				vector.len(),
			));
		}
	}

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reorders_vectors_by_index() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json, 2, 2).expect("parse failed");
		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn rejects_wrong_dimensionality() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": [1.0, 2.0, 3.0] }]
		});
		assert!(parse_embedding_response(json, 1, 2).is_err());
	}

	#[test]
	fn rejects_missing_vectors() {
		let json = serde_json::json!({ "data": [] });
		assert!(parse_embedding_response(json, 1, 2).is_err());
	}
}
