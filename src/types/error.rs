//! Error types for TeamUp
//!
//! Every failure in the risk subsystem maps onto one of these variants, and
//! each variant maps onto a single HTTP status for the inbound surface.

use hyper::StatusCode;

/// Main error type for TeamUp operations
#[derive(Debug, thiserror::Error)]
pub enum TeamUpError {
    /// The shared daily oracle budget is spent
    #[error("Daily AI quota reached ({ceiling} calls)")]
    QuotaExceeded { ceiling: i64 },

    /// The oracle could not be reached, timed out, or answered with an error
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The oracle answered, but not in the agreed JSON shape
    #[error("Oracle response could not be parsed: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TeamUpError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Oracle(_) => StatusCode::BAD_GATEWAY,
            Self::Parse(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Oracle(_) => "oracle",
            Self::Parse(_) => "parse",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Convert to status code and body tuple for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, String) {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, body.to_string())
    }
}

impl From<std::io::Error> for TeamUpError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for TeamUpError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<mongodb::error::Error> for TeamUpError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for TeamUp operations
pub type Result<T> = std::result::Result<T, TeamUpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TeamUpError::QuotaExceeded { ceiling: 60 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            TeamUpError::Oracle("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TeamUpError::Parse("bad json".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            TeamUpError::NotFound("idea".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_parse_and_oracle_have_distinct_kinds() {
        assert_eq!(TeamUpError::Parse(String::new()).kind(), "parse");
        assert_eq!(TeamUpError::Oracle(String::new()).kind(), "oracle");
    }

    #[test]
    fn test_error_body_is_json() {
        let (status, body) = TeamUpError::QuotaExceeded { ceiling: 60 }.into_status_code_and_body();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["kind"], "quota_exceeded");
        assert!(value["error"].as_str().unwrap().contains("60"));
    }
}
