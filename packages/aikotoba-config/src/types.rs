use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub lexicon: Lexicon,
	pub matching: Matching,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Lexicon {
	pub path: String,
	/// Language tag whose entries are deprioritized in the shortlist so the
	/// matcher sees a linguistically diverse candidate set.
	pub home_lang: String,
}

#[derive(Debug, Deserialize)]
pub struct Matching {
	#[serde(default = "default_candidate_k")]
	pub candidate_k: u32,
	#[serde(default = "default_reflection_k")]
	pub reflection_k: u32,
	#[serde(default = "default_max_excerpts")]
	pub max_excerpts: u32,
	#[serde(default = "default_max_free_text_chars")]
	pub max_free_text_chars: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub chat: ChatProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChatProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

fn default_candidate_k() -> u32 {
	6
}

fn default_reflection_k() -> u32 {
	12
}

fn default_max_excerpts() -> u32 {
	2
}

fn default_max_free_text_chars() -> u32 {
	1_500
}
