use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use aikotoba_service::{DiagnoseRequest, DiagnoseResponse, Error as ServiceError};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/diagnose", post(diagnose))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn diagnose(
	State(state): State<AppState>,
	Json(payload): Json<DiagnoseRequest>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
	let response = state.service.diagnose(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Validation { code, message } => {
				Self::new(StatusCode::BAD_REQUEST, code.as_str(), message, None)
			},
			ServiceError::UpstreamParse { step } => Self::new(
				StatusCode::BAD_GATEWAY,
				"upstream_parse",
				format!("The {step} step returned an unusable response."),
				None,
			),
			ServiceError::UpstreamUnavailable { .. } => Self::new(
				StatusCode::BAD_GATEWAY,
				"upstream_unavailable",
				"A language model call failed.",
				None,
			),
			ServiceError::DimensionMismatch(_) => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"internal",
				"Embedding dimensionality is inconsistent.",
				None,
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
