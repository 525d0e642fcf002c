//! JSON response helpers shared by all routes

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::types::{Result, TeamUpError};

/// JSON response with permissive CORS
pub fn json(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Serialize `value` with the given status
pub fn with_status<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(value) {
        Ok(body) => json(status, body),
        Err(e) => error(TeamUpError::Internal(format!("Response encoding failed: {}", e))),
    }
}

/// Map a service result onto a response
pub fn respond<T: Serialize>(status: StatusCode, result: Result<T>) -> Response<Full<Bytes>> {
    match result {
        Ok(value) => with_status(status, &value),
        Err(e) => error(e),
    }
}

/// Error response. Upstream and server failures log at error, the rest at warn.
pub fn error(err: TeamUpError) -> Response<Full<Bytes>> {
    match &err {
        TeamUpError::Oracle(_)
        | TeamUpError::Database(_)
        | TeamUpError::Config(_)
        | TeamUpError::Internal(_) => error!(kind = err.kind(), "{}", err),
        _ => warn!(kind = err.kind(), "{}", err),
    }
    let (status, body) = err.into_status_code_and_body();
    json(status, body)
}

/// CORS preflight response
pub fn preflight() -> Response<Full<Bytes>> {
    let mut response = json(StatusCode::OK, String::new());
    let headers = response.headers_mut();
    headers.remove(CONTENT_TYPE);
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    response
}

/// Not found response
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });
    json(StatusCode::NOT_FOUND, body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_status() {
        let response = error(TeamUpError::QuotaExceeded { ceiling: 60 });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_preflight_allows_all_methods() {
        let response = preflight();
        assert_eq!(response.status(), StatusCode::OK);
        let methods = response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).unwrap();
        assert!(methods.to_str().unwrap().contains("DELETE"));
    }
}
