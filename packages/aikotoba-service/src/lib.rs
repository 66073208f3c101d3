pub mod diagnose;
pub mod prompts;
pub mod ranking;

mod error;

pub use diagnose::{
	Analysis, DiagnoseRequest, DiagnoseResponse, MatchResult, Pick, Reflection,
};
pub use error::{Error, Result, ValidationCode};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use aikotoba_config::{ChatProviderConfig, Config, EmbeddingProviderConfig};
use aikotoba_domain::lexicon::Lexicon;
use aikotoba_providers::{ChatMessage, chat, embedding};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(chat::complete(cfg, messages))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, chat: Arc<dyn ChatProvider>) -> Self {
		Self { embedding, chat }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), chat: provider }
	}
}

/// Process-wide memoization of embedding vectors keyed by exact text.
/// Only lexicon reference texts go through it, so unbounded growth is
/// capped by the fixed vocabulary size; query texts are never cached here.
#[derive(Default)]
pub struct EmbeddingCache {
	entries: std::sync::Mutex<ahash::AHashMap<String, Vec<f32>>>,
}

impl EmbeddingCache {
	pub fn get(&self, text: &str) -> Option<Vec<f32>> {
		self.entries.lock().ok()?.get(text).cloned()
	}

	pub fn insert(&self, text: String, vector: Vec<f32>) {
		if let Ok(mut entries) = self.entries.lock() {
			entries.insert(text, vector);
		}
	}

	pub fn seed<I>(&self, pairs: I)
	where
		I: IntoIterator<Item = (String, Vec<f32>)>,
	{
		if let Ok(mut entries) = self.entries.lock() {
			entries.extend(pairs);
		}
	}

	pub fn len(&self) -> usize {
		self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

pub struct DiagnoseService {
	pub cfg: Config,
	pub lexicon: Lexicon,
	pub providers: Providers,
	embedding_cache: EmbeddingCache,
}

impl DiagnoseService {
	pub fn new(cfg: Config, lexicon: Lexicon) -> Self {
		Self::with_providers(cfg, lexicon, Providers::default())
	}

	pub fn with_providers(cfg: Config, lexicon: Lexicon, providers: Providers) -> Self {
		Self { cfg, lexicon, providers, embedding_cache: EmbeddingCache::default() }
	}

	/// Replaces the owned embedding cache, e.g. with a pre-seeded one in
	/// tests.
	pub fn with_embedding_cache(mut self, cache: EmbeddingCache) -> Self {
		self.embedding_cache = cache;
		self
	}

	pub fn embedding_cache(&self) -> &EmbeddingCache {
		&self.embedding_cache
	}

	pub(crate) async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		Ok(self.providers.embedding.embed(&self.cfg.providers.embedding, texts).await?)
	}

	pub(crate) async fn complete_step(
		&self,
		step: &'static str,
		messages: &[ChatMessage],
	) -> Result<Value> {
		self.providers.chat.complete(&self.cfg.providers.chat, messages).await.map_err(|err| {
			tracing::error!(step, error = %err, "Chat provider call failed.");

			Error::UpstreamUnavailable { message: err.to_string() }
		})
	}
}
