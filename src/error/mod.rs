use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LtpError {
    #[error("could not connect after {retries} retries")]
    DependencyUnavailable { retries: u32 },

    #[error("{0}")]
    DependencyError(String),

    #[error("{0}")]
    UpstreamReported(String),

    #[error("{0}")]
    InvalidTrade(String),

    #[error("unsupported pair: {0}")]
    UnsupportedPair(String),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LtpError>;

impl LtpError {
    /// Failures caused by the upstream being unreachable or erroring, as
    /// opposed to malformed data or bad input.
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            LtpError::DependencyUnavailable { .. }
                | LtpError::DependencyError(_)
                | LtpError::UpstreamReported(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LtpError::Validation(_) => StatusCode::BAD_REQUEST,
            LtpError::DependencyUnavailable { .. }
            | LtpError::DependencyError(_)
            | LtpError::UpstreamReported(_)
            | LtpError::InvalidTrade(_)
            | LtpError::UnsupportedPair(_)
            | LtpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LtpError> for StatusCode {
    fn from(err: LtpError) -> Self {
        err.status_code()
    }
}

impl IntoResponse for LtpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = LtpError::Validation("'pairs' param is required".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_dependency_failure());
    }

    #[test]
    fn dependency_and_trade_failures_map_to_server_error() {
        let errors = vec![
            LtpError::DependencyUnavailable { retries: 3 },
            LtpError::DependencyError("Kraken endpoint returned status code 503".to_string()),
            LtpError::UpstreamReported("EQuery:Unknown asset pair".to_string()),
            LtpError::InvalidTrade("no such key".to_string()),
            LtpError::UnsupportedPair("DOGE/USD".to_string()),
        ];
        for err in errors {
            assert_eq!(StatusCode::from(err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn unavailable_message_names_retry_count() {
        let err = LtpError::DependencyUnavailable { retries: 4 };
        assert_eq!(err.to_string(), "could not connect after 4 retries");
        assert!(err.is_dependency_failure());
        assert!(!LtpError::InvalidTrade("x".to_string()).is_dependency_failure());
    }
}
