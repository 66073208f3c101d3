mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatProviderConfig, Config, EmbeddingProviderConfig, Lexicon, Matching, Providers, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.lexicon.path.trim().is_empty() {
		return Err(Error::Validation { message: "lexicon.path must be non-empty.".to_string() });
	}
	if cfg.lexicon.home_lang.is_empty() {
		return Err(Error::Validation {
			message: "lexicon.home_lang must be non-empty.".to_string(),
		});
	}
	if cfg.matching.candidate_k == 0 {
		return Err(Error::Validation {
			message: "matching.candidate_k must be greater than zero.".to_string(),
		});
	}
	if cfg.matching.reflection_k < cfg.matching.candidate_k {
		return Err(Error::Validation {
			message: "matching.reflection_k must be at least matching.candidate_k.".to_string(),
		});
	}
	if cfg.matching.max_free_text_chars == 0 {
		return Err(Error::Validation {
			message: "matching.max_free_text_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.chat.temperature.is_finite() || cfg.providers.chat.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite non-negative number.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("chat", &cfg.providers.chat.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.lexicon.home_lang = cfg.lexicon.home_lang.trim().to_string();
	for base in
		[&mut cfg.providers.embedding.api_base, &mut cfg.providers.chat.api_base]
	{
		while base.ends_with('/') {
			base.pop();
		}
	}
}
