use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned when a submitted payload is not valid JSON.
pub const DECODE_ERROR_MESSAGE: &str = "Erro ao decodificar o JSON do corpo da requisição";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<envconfig::Error> for LoggerError {
    fn from(err: envconfig::Error) -> Self {
        LoggerError::Config(err.to_string())
    }
}

impl IntoResponse for LoggerError {
    fn into_response(self) -> Response {
        match self {
            LoggerError::Decode(_) => (StatusCode::BAD_REQUEST, DECODE_ERROR_MESSAGE).into_response(),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
