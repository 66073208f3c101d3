use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::json;
use tower::util::ServiceExt;

use aikotoba_api::{routes, state::AppState};
use aikotoba_service::{DiagnoseService, Providers};
use aikotoba_testkit::{
	ScriptedChat, ScriptedEmbedding, ScriptedReply, sample_config, sample_lexicon,
};

fn scripted_state(replies: Vec<ScriptedReply>) -> AppState {
	let service = DiagnoseService::with_providers(
		sample_config(),
		sample_lexicon(),
		Providers::new(
			Arc::new(ScriptedEmbedding::uniform(3)),
			Arc::new(ScriptedChat::new(replies)),
		),
	);

	AppState::from_service(service)
}

fn diagnose_request(answers: serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/v1/diagnose")
		.header("content-type", "application/json")
		.body(Body::from(json!({ "answers": answers, "reflect": false }).to_string()))
		.expect("Failed to build request.")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response body.")
}

#[tokio::test]
async fn health_returns_ok() {
	let app = routes::router(scripted_state(Vec::new()));
	let response = app
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn diagnose_returns_scores_and_picks() {
	let app = routes::router(scripted_state(vec![
		ScriptedReply::Json(json!({
			"summary": "静かな持続を好む愛のかたち。",
			"scores": { "serenity": 0.9, "enduring": 0.8 }
		})),
		ScriptedReply::Json(json!({
			"picks": [{
				"id": "pt-saudade",
				"term": "saudade",
				"lang": "pt",
				"gloss": "不在の人への甘い郷愁",
				"reason": "離れていても想いが薄れない持続性は、不在を甘く抱え続けるこの語の核心とよく重なる。",
				"catchphrase": "会えない時間も、愛のうち。"
			}]
		})),
	]));
	let response = app
		.oneshot(diagnose_request(json!([
			{ "id": 1, "kind": "open", "prompt": "質問1", "value": "離れていても相手を想い続ける。" }
		])))
		.await
		.expect("Failed to call /v1/diagnose.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = response_json(response).await;

	assert_eq!(body["analysis"]["scores"].as_object().map(|m| m.len()), Some(10));
	assert_eq!(body["analysis"]["scores"]["serenity"], 0.9);
	assert_eq!(body["result"]["picks"][0]["id"], "pt-saudade");
	assert!(body.get("reflection").is_none());
}

#[tokio::test]
async fn duplicate_question_ids_yield_bad_request() {
	let app = routes::router(scripted_state(Vec::new()));
	let response = app
		.oneshot(diagnose_request(json!([
			{ "id": 1, "kind": "open", "prompt": "質問1", "value": "一緒に過ごす時間。" },
			{ "id": 1, "kind": "open", "prompt": "質問1", "value": "繰り返しの質問。" }
		])))
		.await
		.expect("Failed to call /v1/diagnose.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = response_json(response).await;

	assert_eq!(body["error_code"], "duplicate_question");
	assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn invalid_yes_no_value_yields_bad_request() {
	let app = routes::router(scripted_state(Vec::new()));
	let response = app
		.oneshot(diagnose_request(json!([
			{ "id": 1, "kind": "yesno", "prompt": "質問1", "value": "たぶん" }
		])))
		.await
		.expect("Failed to call /v1/diagnose.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(response_json(response).await["error_code"], "invalid_yes_no");
}

#[tokio::test]
async fn analyzer_outage_yields_bad_gateway() {
	let app = routes::router(scripted_state(vec![ScriptedReply::Failure(
		"connection refused".to_string(),
	)]));
	let response = app
		.oneshot(diagnose_request(json!([
			{ "id": 1, "kind": "open", "prompt": "質問1", "value": "一緒に過ごす時間。" }
		])))
		.await
		.expect("Failed to call /v1/diagnose.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(response_json(response).await["error_code"], "upstream_unavailable");
}

#[tokio::test]
async fn malformed_matcher_payload_yields_bad_gateway() {
	let app = routes::router(scripted_state(vec![
		ScriptedReply::Json(json!({
			"summary": "静かな持続を好む愛のかたち。",
			"scores": {}
		})),
		ScriptedReply::Json(json!({ "picks": "not-a-list" })),
	]));
	let response = app
		.oneshot(diagnose_request(json!([
			{ "id": 1, "kind": "open", "prompt": "質問1", "value": "一緒に過ごす時間。" }
		])))
		.await
		.expect("Failed to call /v1/diagnose.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(response_json(response).await["error_code"], "upstream_parse");
}
