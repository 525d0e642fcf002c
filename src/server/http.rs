//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Requests are routed on
//! method and path segments; handlers live in `routes`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::routes::{self, response};
use crate::services::TeamUpService;
use crate::types::{Result, TeamUpError};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub service: TeamUpService,
    /// "mongodb" or "memory"
    pub store_kind: &'static str,
    /// Model label, "none" without an oracle
    pub oracle_model: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        service: TeamUpService,
        store_kind: &'static str,
        oracle_model: impl Into<String>,
    ) -> Self {
        Self {
            args,
            service,
            store_kind,
            oracle_model: oracle_model.into(),
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "TeamUp listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - oracle and store fallbacks active");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let response = match (method, segments.as_slice()) {
        // Health check endpoints
        (Method::GET, ["health"]) | (Method::GET, ["healthz"]) => routes::health_check(&state),

        // CORS preflight
        (Method::OPTIONS, _) => response::preflight(),

        (Method::GET, ["api", "ideas"]) => routes::ideas::list(&state).await,

        (Method::POST, ["api", "ideas"]) => match read_json(req).await {
            Ok(body) => routes::ideas::post(&state, body).await,
            Err(e) => response::error(e),
        },

        (Method::POST, ["api", "ideas", id, "risk"]) => match read_json_or_default(req).await {
            Ok(body) => routes::ideas::risk(&state, id, body).await,
            Err(e) => response::error(e),
        },

        (Method::POST, ["api", "analyze-risk"]) => match read_json(req).await {
            Ok(body) => routes::ideas::analyze_risk(&state, body).await,
            Err(e) => response::error(e),
        },

        (Method::POST, ["api", "ideas", id, "simulate"]) => match read_json(req).await {
            Ok(body) => routes::ideas::simulate(&state, id, body).await,
            Err(e) => response::error(e),
        },

        (Method::GET, ["api", "ideas", id, "team"]) => routes::ideas::team(&state, id).await,

        (Method::DELETE, ["api", "ideas", id, "members", member_id]) => {
            routes::ideas::remove_member(&state, id, member_id).await
        }

        (Method::POST, ["api", "apply"]) => match read_json(req).await {
            Ok(body) => routes::applications::apply(&state, body).await,
            Err(e) => response::error(e),
        },

        (Method::GET, ["api", "applications", "idea", id]) => {
            routes::applications::for_idea(&state, id).await
        }

        (Method::GET, ["api", "applications", "my", member_id]) => {
            routes::applications::for_member(&state, member_id).await
        }

        (Method::PUT, ["api", "applications", id, "status"]) => match read_json(req).await {
            Ok(body) => routes::applications::update_status(&state, id, body).await,
            Err(e) => response::error(e),
        },

        (Method::GET, ["api", "admin", "stats"]) => routes::admin::stats(&state).await,

        (Method::GET, ["api", "admin", "data"]) => routes::admin::data(&state).await,

        (Method::DELETE, ["api", "admin", "delete", kind, id]) => {
            routes::admin::delete(&state, kind, id).await
        }

        // Not found
        _ => response::not_found(&path),
    };

    Ok(to_boxed(response))
}

async fn read_body(req: Request<Incoming>) -> Result<Bytes> {
    Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| TeamUpError::BadRequest(format!("Failed to read request body: {}", e)))
}

/// Decode a required JSON body
async fn read_json<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = read_body(req).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Decode an optional JSON body, falling back to `T::default()` when empty
async fn read_json_or_default<T: DeserializeOwned + Default>(req: Request<Incoming>) -> Result<T> {
    let body = read_body(req).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}
