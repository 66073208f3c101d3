use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
	InvalidRequest,
	Empty,
	DuplicateQuestion,
	InvalidYesNo,
	EmptyAnswer,
}

impl ValidationCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::InvalidRequest => "invalid_request",
			Self::Empty => "empty",
			Self::DuplicateQuestion => "duplicate_question",
			Self::InvalidYesNo => "invalid_yes_no",
			Self::EmptyAnswer => "empty_answer",
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	Validation { code: ValidationCode, message: String },
	#[error("Upstream {step} response failed schema validation.")]
	UpstreamParse { step: &'static str },
	#[error("Upstream call failed: {message}")]
	UpstreamUnavailable { message: String },
	/// Programmer invariant: embedding dimensionality drifted between the
	/// query and a lexicon entry. Should not occur with a consistent
	/// embedding model configuration.
	#[error(transparent)]
	DimensionMismatch(#[from] aikotoba_domain::similarity::DimensionMismatch),
}

impl From<aikotoba_domain::answer::Error> for Error {
	fn from(err: aikotoba_domain::answer::Error) -> Self {
		use aikotoba_domain::answer::Error as AnswerError;

		let code = match err {
			AnswerError::EmptyAnswer { .. } => ValidationCode::EmptyAnswer,
			AnswerError::InvalidYesNo { .. } => ValidationCode::InvalidYesNo,
			AnswerError::DuplicateQuestion { .. } => ValidationCode::DuplicateQuestion,
		};

		Self::Validation { code, message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::UpstreamUnavailable { message: err.to_string() }
	}
}
