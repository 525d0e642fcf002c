//! Request and response bodies of the HTTP surface
//!
//! Wire names are camelCase. Document ids are rendered as hex strings.

use serde::{Deserialize, Serialize};

use crate::db::schemas::{ApplicationDoc, IdeaDoc, MemberDoc, Metadata, RoleSlot};
use crate::risk::{Assessment, Remediation, RiskVerdict, VerdictSource};

fn rfc3339(metadata: &Metadata) -> Option<String> {
    metadata
        .created_at
        .and_then(|at| at.try_to_rfc3339_string().ok())
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleSlotView {
    pub role_name: String,
}

impl From<&RoleSlot> for RoleSlotView {
    fn from(slot: &RoleSlot) -> Self {
        Self {
            role_name: slot.role_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdeaRequest {
    pub title: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub expected_outcome: String,
    #[serde(default)]
    pub roles_needed: Vec<RoleSlotView>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaView {
    pub id: String,
    pub title: String,
    pub problem_statement: String,
    pub expected_outcome: String,
    pub roles_needed: Vec<RoleSlotView>,
    pub tags: Vec<String>,
    pub created_by: String,
    pub clarity_score: u8,
    pub risk_verdict: Option<RiskVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&IdeaDoc> for IdeaView {
    fn from(idea: &IdeaDoc) -> Self {
        Self {
            id: idea.id_hex(),
            title: idea.title.clone(),
            problem_statement: idea.problem_statement.clone(),
            expected_outcome: idea.expected_outcome.clone(),
            roles_needed: idea.roles_needed.iter().map(RoleSlotView::from).collect(),
            tags: idea.tags.clone(),
            created_by: idea.created_by.clone(),
            clarity_score: idea.clarity_score,
            risk_verdict: idea.risk_verdict.clone(),
            created_at: rfc3339(&idea.metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdeaResponse {
    pub idea: IdeaView,
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRiskRequest {
    pub idea_id: String,
    #[serde(default)]
    pub force_refresh: bool,
}

/// A verdict with its fields at the top level, plus where it came from
#[derive(Debug, Clone, Serialize)]
pub struct RiskResponse {
    #[serde(flatten)]
    pub verdict: RiskVerdict,
    pub source: VerdictSource,
}

impl From<Assessment> for RiskResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            verdict: assessment.verdict,
            source: assessment.source,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub remediation: Remediation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub primary_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_role: Option<String>,
    pub skills: Vec<String>,
    pub availability_hours: u32,
}

impl From<&MemberDoc> for MemberView {
    fn from(member: &MemberDoc) -> Self {
        Self {
            id: member._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: member.name.clone(),
            email: member.email.clone(),
            primary_role: member.primary_role.clone(),
            secondary_role: member.secondary_role.clone(),
            skills: member.skills.clone(),
            availability_hours: member.availability_hours,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub idea_id: String,
    pub member_id: String,
    pub applying_for_role: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: String,
    pub idea_id: String,
    /// Present in a member's own listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea_title: Option<String>,
    pub member_id: String,
    pub member_name: String,
    pub applying_for_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&ApplicationDoc> for ApplicationView {
    fn from(app: &ApplicationDoc) -> Self {
        Self {
            id: app._id.map(|id| id.to_hex()).unwrap_or_default(),
            idea_id: app.idea_id.to_hex(),
            idea_title: None,
            member_id: app.member_id.to_hex(),
            member_name: app.member_name.clone(),
            applying_for_role: app.applying_for_role.clone(),
            message: app.message.clone(),
            status: app.status.as_str().to_string(),
            created_at: rfc3339(&app.metadata),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub members: u64,
    pub ideas: u64,
    pub api_calls_today: i64,
    pub daily_quota: i64,
}

/// Everything an administrator can browse
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub members: Vec<MemberView>,
    pub ideas: Vec<IdeaView>,
}

/// Record type named in an admin delete path
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Member,
    Idea,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Idea => "idea",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "member" | "user" => Ok(Self::Member),
            "idea" => Ok(Self::Idea),
            other => Err(format!("unknown record type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AdminDeleted {
    pub kind: RecordKind,
    pub id: String,
}
