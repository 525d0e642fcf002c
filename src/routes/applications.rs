//! Application routes
//!
//! - `POST /api/apply`
//! - `GET  /api/applications/idea/{id}`
//! - `GET  /api/applications/my/{memberId}`
//! - `PUT  /api/applications/{id}/status`

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use super::response;
use crate::server::AppState;
use crate::services::{parse_id, ApplyRequest, StatusUpdateRequest};

pub async fn apply(state: &AppState, body: ApplyRequest) -> Response<Full<Bytes>> {
    response::respond(StatusCode::CREATED, state.service.apply(body).await)
}

pub async fn for_idea(state: &AppState, id: &str) -> Response<Full<Bytes>> {
    let result = async {
        let idea_id = parse_id(id, "idea")?;
        state.service.applicants(&idea_id).await
    }
    .await;
    response::respond(StatusCode::OK, result)
}

pub async fn for_member(state: &AppState, member_id: &str) -> Response<Full<Bytes>> {
    let result = async {
        let member_id = parse_id(member_id, "member")?;
        state.service.my_applications(&member_id).await
    }
    .await;
    response::respond(StatusCode::OK, result)
}

pub async fn update_status(
    state: &AppState,
    id: &str,
    body: StatusUpdateRequest,
) -> Response<Full<Bytes>> {
    let result = async {
        let application_id = parse_id(id, "application")?;
        state
            .service
            .update_application_status(&application_id, &body.status)
            .await
    }
    .await;
    response::respond(StatusCode::OK, result)
}
