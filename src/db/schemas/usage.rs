//! Daily oracle usage counter
//!
//! One document per UTC calendar day. Documents are created lazily on the
//! first charge of a day and never reset in place.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for usage counters
pub const USAGE_COLLECTION: &str = "usage";

/// Usage counter document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UsageDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// `YYYY-MM-DD`, UTC
    pub date: String,

    /// Oracle calls charged on this day
    #[serde(default)]
    pub api_calls: i64,
}

impl IntoIndexes for UsageDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "date": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("date_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for UsageDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
