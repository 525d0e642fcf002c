//! Application document schema
//!
//! Links a member to an idea for a requested role. Status moves one way only:
//! pending -> accepted or pending -> rejected.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for applications
pub const APPLICATION_COLLECTION: &str = "applications";

/// Application status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Rejected)
        )
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

/// Application document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ApplicationDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub idea_id: ObjectId,

    pub member_id: ObjectId,

    /// Applicant display name at the time of applying
    pub member_name: String,

    /// Which slot they want
    pub applying_for_role: String,

    /// "Why me?"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub status: ApplicationStatus,
}

impl ApplicationDoc {
    /// Create a new pending application
    pub fn new(
        idea_id: ObjectId,
        member_id: ObjectId,
        member_name: impl Into<String>,
        applying_for_role: impl Into<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            idea_id,
            member_id,
            member_name: member_name.into(),
            applying_for_role: applying_for_role.into(),
            message: None,
            status: ApplicationStatus::Pending,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: ApplicationStatus) -> Self {
        self.status = status;
        self
    }
}

impl IntoIndexes for ApplicationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Team assembly: accepted applications of an idea
            (
                doc! { "idea_id": 1, "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("idea_status_index".to_string())
                        .build(),
                ),
            ),
            // One pending and one accepted application per idea and member
            (
                doc! { "idea_id": 1, "member_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "status": "pending" })
                        .name("open_pending_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "member_id": 1, "idea_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "status": "accepted" })
                        .name("open_accepted_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "member_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("member_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ApplicationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
