use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kinds surfaced in a `ResolutionResult`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidReference,
    FetchError,
    MalformedEmbeddedData,
    NoMediaFound,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidReference => "invalid reference",
            Self::FetchError => "fetch error",
            Self::MalformedEmbeddedData => "malformed embedded data",
            Self::NoMediaFound => "no media found",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a recognizable post, story or profile reference: {0:?}")]
    InvalidReference(String),
}

impl ParseError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidReference
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("timed out after {timeout_ms} ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },
}

impl FetchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::FetchError
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed embedded data: {0}")]
    MalformedEmbeddedData(#[from] serde_json::Error),
}

impl ExtractError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedEmbeddedData
    }
}

/* ---- HTTP surface ---- */

#[derive(Debug)]
pub enum AppError {
    /// Return just a status code with an empty body.
    Status(StatusCode),
    /// Return a status code with a plain-text message body.
    Msg(StatusCode, String),
    /// Internal error -> 500 with JSON body; logged.
    Anyhow(anyhow::Error),
}

impl From<StatusCode> for AppError {
    fn from(code: StatusCode) -> Self {
        Self::Status(code)
    }
}

impl From<(StatusCode, String)> for AppError {
    fn from((code, msg): (StatusCode, String)) -> Self {
        Self::Msg(code, msg)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Anyhow(e)
    }
}

impl From<ParseError> for AppError {
    fn from(e: ParseError) -> Self {
        Self::Msg(StatusCode::BAD_REQUEST, e.to_string())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Status(code) => code.into_response(),
            Self::Msg(code, msg) => (code, msg).into_response(),
            Self::Anyhow(err) => {
                tracing::error!("{:#}", err);
                let body = Json(ErrBody {
                    error: err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
