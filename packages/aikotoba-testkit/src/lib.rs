//! Deterministic provider stubs and config fixtures for pipeline tests.
//! Nothing here performs network I/O.

use std::{
	collections::VecDeque,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use color_eyre::eyre;
use serde_json::Value;

use aikotoba_config::{ChatProviderConfig, Config, EmbeddingProviderConfig};
use aikotoba_domain::lexicon::{Lexicon, LoveWord};
use aikotoba_providers::ChatMessage;
use aikotoba_service::{BoxFuture, ChatProvider, EmbeddingProvider};

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "info"

[lexicon]
path      = "data/love_words.json"
home_lang = "ja"

[matching]
candidate_k         = 6
reflection_k        = 12
max_excerpts        = 2
max_free_text_chars = 1500

[providers.embedding]
api_base        = "http://127.0.0.1:1"
api_key         = "test-key"
path            = "/v1/embeddings"
model           = "test-embed"
dimensions      = 3
timeout_ms      = 1000
default_headers = {}

[providers.chat]
api_base        = "http://127.0.0.1:1"
api_key         = "test-key"
path            = "/v1/chat/completions"
model           = "test-chat"
temperature     = 0.2
timeout_ms      = 1000
default_headers = {}
"#;

/// A validated config pointing at unreachable provider endpoints; combine
/// with the scripted providers below.
pub fn sample_config() -> Config {
	let cfg: Config = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");

	aikotoba_config::validate(&cfg).expect("Sample config must validate.");

	cfg
}

pub fn sample_word(
	id: &str,
	term: &str,
	lang: &str,
	gloss: &str,
	tags: &[&str],
	culture_note: Option<&str>,
) -> LoveWord {
	LoveWord {
		id: id.to_string(),
		term: term.to_string(),
		lang: lang.to_string(),
		gloss: gloss.to_string(),
		tags: tags.iter().map(|tag| tag.to_string()).collect(),
		culture_note: culture_note.map(|note| note.to_string()),
	}
}

/// A small fixed vocabulary with one home-language (ja) entry.
pub fn sample_lexicon() -> Lexicon {
	Lexicon::from_words(vec![
		sample_word(
			"pt-saudade",
			"saudade",
			"pt",
			"不在の人への甘い郷愁",
			&["郷愁", "不在"],
			Some("ファドの中心的主題。"),
		),
		sample_word("fi-kaiho", "kaiho", "fi", "届かないものへの静かな憧れ", &["憧れ"], None),
		sample_word(
			"ja-koi",
			"恋",
			"ja",
			"胸の高鳴りを伴う恋慕",
			&["高揚"],
			Some("和歌の伝統的主題。"),
		),
		sample_word("ar-ishq", "ishq", "ar", "我を忘れるほどの愛", &["献身"], None),
	])
	.expect("Sample lexicon ids are unique.")
}

type EmbedFn = dyn Fn(&str) -> Vec<f32> + Send + Sync;

/// Embedding stub that derives a vector from each input text through a
/// caller-supplied function, while recording every batch it receives.
pub struct ScriptedEmbedding {
	embed_fn: Box<EmbedFn>,
	calls: AtomicUsize,
	batches: Mutex<Vec<Vec<String>>>,
}

impl ScriptedEmbedding {
	pub fn new<F>(embed_fn: F) -> Self
	where
		F: Fn(&str) -> Vec<f32> + Send + Sync + 'static,
	{
		Self { embed_fn: Box::new(embed_fn), calls: AtomicUsize::new(0), batches: Mutex::new(Vec::new()) }
	}

	/// A stub whose vectors depend only on text length; good enough when a
	/// test cares about plumbing rather than similarity ordering.
	pub fn uniform(dimensions: usize) -> Self {
		Self::new(move |text| {
			let seed = (text.chars().count() % 7 + 1) as f32;

			(0..dimensions).map(|i| seed / (i as f32 + 1.0)).collect()
		})
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn batches(&self) -> Vec<Vec<String>> {
		self.batches.lock().expect("batch log lock").clone()
	}
}

impl EmbeddingProvider for ScriptedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.batches.lock().expect("batch log lock").push(texts.to_vec());

			Ok(texts.iter().map(|text| (self.embed_fn)(text)).collect())
		})
	}
}

pub enum ScriptedReply {
	Json(Value),
	Failure(String),
}

/// Chat stub that replays a fixed sequence of replies, one per call, and
/// records the prompts it was given.
pub struct ScriptedChat {
	replies: Mutex<VecDeque<ScriptedReply>>,
	calls: AtomicUsize,
	prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
	pub fn new(replies: Vec<ScriptedReply>) -> Self {
		Self {
			replies: Mutex::new(replies.into()),
			calls: AtomicUsize::new(0),
			prompts: Mutex::new(Vec::new()),
		}
	}

	pub fn from_values(values: Vec<Value>) -> Self {
		Self::new(values.into_iter().map(ScriptedReply::Json).collect())
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
		self.prompts.lock().expect("prompt log lock").clone()
	}
}

impl ChatProvider for ScriptedChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a ChatProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.prompts.lock().expect("prompt log lock").push(messages.to_vec());

			match self.replies.lock().expect("reply queue lock").pop_front() {
				Some(ScriptedReply::Json(value)) => Ok(value),
				Some(ScriptedReply::Failure(message)) => Err(eyre::eyre!(message)),
				None => Err(eyre::eyre!("Scripted chat replies are exhausted.")),
			}
		})
	}
}
