//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{
    options::{FindOptions, IndexOptions, UpdateModifications, UpdateOptions},
    results::{DeleteResult, UpdateResult},
    Client, Collection, IndexModel,
};
use futures_util::{Stream, TryStreamExt};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::TeamUpError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, TeamUpError> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| TeamUpError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| TeamUpError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, TeamUpError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, TeamUpError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), TeamUpError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| TeamUpError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps.
    /// A unique-index violation is a `Conflict`.
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, TeamUpError> {
        let metadata = item.mut_metadata();
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = self.inner.insert_one(item).await.map_err(|e| {
            if is_duplicate_key(&e) {
                TeamUpError::Conflict(format!(
                    "{} already holds a matching document",
                    self.inner.name()
                ))
            } else {
                TeamUpError::Database(format!("Insert failed: {}", e))
            }
        })?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| TeamUpError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, TeamUpError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| TeamUpError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter, optionally sorted
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, TeamUpError> {
        let options = FindOptions::builder().sort(sort).build();

        let cursor = self
            .inner
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| TeamUpError::Database(format!("Find failed: {}", e)))?;

        collect_documents(cursor).await
    }

    /// Update one document
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, TeamUpError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| TeamUpError::Database(format!("Update failed: {}", e)))
    }

    /// Create the document matching `filter` if it does not exist yet.
    ///
    /// Concurrent creators race on a unique index; the loser gets a
    /// duplicate-key error, which means the document now exists.
    pub async fn ensure_one(&self, filter: Document, on_insert: Document) -> Result<(), TeamUpError> {
        let options = UpdateOptions::builder().upsert(true).build();
        match self
            .inner
            .update_one(filter, doc! { "$setOnInsert": on_insert })
            .with_options(options)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Ok(()),
            Err(e) => Err(TeamUpError::Database(format!("Upsert failed: {}", e))),
        }
    }

    /// Hard delete one document
    pub async fn delete_one(&self, filter: Document) -> Result<DeleteResult, TeamUpError> {
        self.inner
            .delete_one(filter)
            .await
            .map_err(|e| TeamUpError::Database(format!("Delete failed: {}", e)))
    }

    /// Hard delete every document matching a filter
    pub async fn delete_many(&self, filter: Document) -> Result<DeleteResult, TeamUpError> {
        self.inner
            .delete_many(filter)
            .await
            .map_err(|e| TeamUpError::Database(format!("Delete failed: {}", e)))
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64, TeamUpError> {
        self.inner
            .count_documents(filter)
            .await
            .map_err(|e| TeamUpError::Database(format!("Count failed: {}", e)))
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

/// Drain a cursor. A document that fails to decode fails the whole read.
pub(crate) async fn collect_documents<T, E, S>(stream: S) -> Result<Vec<T>, TeamUpError>
where
    S: Stream<Item = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    stream.try_collect().await.map_err(|e| {
        error!("Error reading document: {}", e);
        TeamUpError::Database(format!("Document decode failed: {}", e))
    })
}

/// Whether a MongoDB error is a duplicate-key violation (code 11000)
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == 11000,
        ErrorKind::Command(e) => e.code == 11000,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    #[tokio::test]
    async fn test_collect_documents_keeps_order() {
        let docs = stream::iter(vec![Ok::<_, String>(1), Ok(2), Ok(3)]);
        assert_eq!(collect_documents(docs).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_undecodable_document_fails_the_read() {
        let docs = stream::iter(vec![
            Ok(1),
            Err("invalid type: floating point `2.5`, expected u32".to_string()),
            Ok(3),
        ]);

        let err = collect_documents(docs).await.unwrap_err();
        match err {
            TeamUpError::Database(msg) => assert!(msg.contains("2.5")),
            other => panic!("expected a database error, got {:?}", other),
        }
    }

    #[test]
    fn test_member_with_fractional_hours_does_not_decode() {
        let raw = doc! {
            "name": "Mike Builder",
            "email": "mike@example.com",
            "primary_role": "Backend Developer",
            "availability_hours": 2.5,
        };
        assert!(bson::from_document::<crate::db::schemas::MemberDoc>(raw).is_err());
    }
}
