use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}

impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: "system".to_string(), content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: "user".to_string(), content: content.into() }
	}
}

/// Sends one chat completion request and parses the reply content as a
/// strict JSON object. `response_format` pins the provider to JSON output;
/// a reply that still fails to parse is a terminal error for the step, not
/// something a same-input retry would fix.
pub async fn complete(
	cfg: &aikotoba_config::ChatProviderConfig,
	messages: &[ChatMessage],
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
		"response_format": { "type": "json_object" },
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_json(json)
}

fn parse_completion_json(json: Value) -> Result<Value> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Chat response is missing message content."))?;
	let parsed: Value = serde_json::from_str(content)
		.map_err(|_| eyre::eyre!("Chat content is not valid JSON."))?;

	if !parsed.is_object() {
		return Err(eyre::eyre!("Chat content is not a JSON object."));
	}

	Ok(parsed)
}
