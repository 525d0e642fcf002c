//! Admin routes
//!
//! - `GET /api/admin/stats`: member and idea counts plus today's oracle usage
//! - `GET /api/admin/data`: every member and idea
//! - `DELETE /api/admin/delete/{kind}/{id}`: hard delete a member or an idea

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use super::response;
use crate::server::AppState;

pub async fn stats(state: &AppState) -> Response<Full<Bytes>> {
    response::respond(StatusCode::OK, state.service.admin_stats().await)
}

pub async fn data(state: &AppState) -> Response<Full<Bytes>> {
    response::respond(StatusCode::OK, state.service.admin_data().await)
}

pub async fn delete(state: &AppState, kind: &str, id: &str) -> Response<Full<Bytes>> {
    response::respond(StatusCode::OK, state.service.admin_delete(kind, id).await)
}
