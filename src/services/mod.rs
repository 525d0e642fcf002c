//! Services layer for TeamUp
//!
//! Business logic behind the inbound surface. Route handlers parse requests
//! and delegate here; everything below talks to the store and the oracle
//! through the risk subsystem.
//!
//! ## Services
//!
//! - **TeamUp**: ideas, teams, applications and risk audits
//! - **Clarity**: oracle scoring of a newly posted idea

pub mod clarity;
pub mod teamup;
pub mod views;

pub use clarity::{ClarityAnalyzer, ClarityReport};
pub use teamup::{parse_id, TeamUpService};
pub use views::{
    AdminData, AdminDeleted, AdminStats, AnalyzeRiskRequest, ApplicationView, ApplyRequest, IdeaView, MemberView,
    PostIdeaRequest, PostIdeaResponse, RecordKind, RiskRequest, RiskResponse, SimulateRequest,
    StatusUpdateRequest,
};
