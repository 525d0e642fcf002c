//! Member document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for members
pub const MEMBER_COLLECTION: &str = "members";

/// Member document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MemberDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Display name (ideas reference their creator by this)
    pub name: String,

    pub email: String,

    /// e.g. "Backend Developer"
    pub primary_role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_role: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    /// Committed hours per day
    pub availability_hours: u32,
}

impl MemberDoc {
    /// Create a new member document
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        primary_role: impl Into<String>,
        availability_hours: u32,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name: name.into(),
            email: email.into(),
            primary_role: primary_role.into(),
            secondary_role: None,
            skills: Vec::new(),
            availability_hours,
        }
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl IntoIndexes for MemberDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            // Creator resolution looks members up by display name
            (
                doc! { "name": 1 },
                Some(IndexOptions::builder().name("name_index".to_string()).build()),
            ),
        ]
    }
}

impl MutMetadata for MemberDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
