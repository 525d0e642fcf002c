//! Idea (project) document schema
//!
//! An idea carries the roles it needs, the creator's display name, the
//! clarity score assigned on posting, and the most recent risk verdict.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::risk::RiskVerdict;

/// Collection name for ideas
pub const IDEA_COLLECTION: &str = "ideas";

/// A role the idea needs filled
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSlot {
    /// e.g. "Frontend Developer"
    pub role_name: String,
}

impl RoleSlot {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
        }
    }
}

/// Idea document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IdeaDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    /// Why this matters
    pub problem_statement: String,

    /// MVP goal
    pub expected_outcome: String,

    /// Ordered role slots
    #[serde(default)]
    pub roles_needed: Vec<RoleSlot>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Creator display name. Soft reference to a member, not a foreign key.
    pub created_by: String,

    /// Oracle-assigned clarity score, 0..=100
    #[serde(default)]
    pub clarity_score: u8,

    /// Most recent risk verdict, absent until the first audit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_verdict: Option<RiskVerdict>,
}

impl IdeaDoc {
    /// Create a new idea document
    pub fn new(
        title: String,
        problem_statement: String,
        expected_outcome: String,
        roles_needed: Vec<RoleSlot>,
        created_by: String,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            problem_statement,
            expected_outcome,
            roles_needed,
            tags: Vec::new(),
            created_by,
            clarity_score: 0,
            risk_verdict: None,
        }
    }

    /// Role names in slot order
    pub fn role_names(&self) -> Vec<&str> {
        self.roles_needed.iter().map(|r| r.role_name.as_str()).collect()
    }

    /// Hex id, empty if the document has not been stored yet
    pub fn id_hex(&self) -> String {
        self._id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

impl IntoIndexes for IdeaDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Newest-first listing
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "title": 1 },
                Some(IndexOptions::builder().name("title_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for IdeaDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
