//! Idea, team and risk routes
//!
//! - `GET  /api/ideas`
//! - `POST /api/ideas`
//! - `POST /api/ideas/{id}/risk`
//! - `POST /api/analyze-risk`
//! - `POST /api/ideas/{id}/simulate`
//! - `GET  /api/ideas/{id}/team`
//! - `DELETE /api/ideas/{id}/members/{memberId}`

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use super::response;
use crate::server::AppState;
use crate::services::{
    parse_id, AnalyzeRiskRequest, PostIdeaRequest, RiskRequest, RiskResponse, SimulateRequest,
};
use crate::types::TeamUpError;

pub async fn list(state: &AppState) -> Response<Full<Bytes>> {
    response::respond(StatusCode::OK, state.service.list_ideas().await)
}

pub async fn post(state: &AppState, body: PostIdeaRequest) -> Response<Full<Bytes>> {
    response::respond(StatusCode::CREATED, state.service.post_idea(body).await)
}

pub async fn risk(state: &AppState, id: &str, body: RiskRequest) -> Response<Full<Bytes>> {
    let result = async {
        let idea_id = parse_id(id, "idea")?;
        let assessment = state
            .service
            .compute_risk(&idea_id, body.force_refresh)
            .await?;
        Ok::<_, TeamUpError>(RiskResponse::from(assessment))
    }
    .await;
    response::respond(StatusCode::OK, result)
}

pub async fn analyze_risk(state: &AppState, body: AnalyzeRiskRequest) -> Response<Full<Bytes>> {
    risk(
        state,
        &body.idea_id,
        RiskRequest {
            force_refresh: body.force_refresh,
        },
    )
    .await
}

pub async fn simulate(state: &AppState, id: &str, body: SimulateRequest) -> Response<Full<Bytes>> {
    let result = async {
        let idea_id = parse_id(id, "idea")?;
        state.service.simulate(&idea_id, body.remediation).await
    }
    .await;
    response::respond(StatusCode::OK, result)
}

pub async fn team(state: &AppState, id: &str) -> Response<Full<Bytes>> {
    let result = async {
        let idea_id = parse_id(id, "idea")?;
        state.service.get_team(&idea_id).await
    }
    .await;
    response::respond(StatusCode::OK, result)
}

pub async fn remove_member(state: &AppState, id: &str, member_id: &str) -> Response<Full<Bytes>> {
    let result = async {
        let idea_id = parse_id(id, "idea")?;
        let member_id = parse_id(member_id, "member")?;
        state.service.remove_member(&idea_id, &member_id).await?;
        Ok::<_, TeamUpError>(serde_json::json!({ "removed": member_id.to_hex() }))
    }
    .await;
    response::respond(StatusCode::OK, result)
}
