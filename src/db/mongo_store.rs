//! MongoDB implementation of `TeamStore`

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use tracing::debug;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    ApplicationDoc, ApplicationStatus, IdeaDoc, MemberDoc, UsageDoc, APPLICATION_COLLECTION,
    IDEA_COLLECTION, MEMBER_COLLECTION, USAGE_COLLECTION,
};
use crate::db::store::TeamStore;
use crate::risk::RiskVerdict;
use crate::types::{Result, TeamUpError};

/// MongoDB-backed store
pub struct MongoTeamStore {
    ideas: MongoCollection<IdeaDoc>,
    members: MongoCollection<MemberDoc>,
    applications: MongoCollection<ApplicationDoc>,
    usage: MongoCollection<UsageDoc>,
}

impl MongoTeamStore {
    /// Open all collections and apply their indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            ideas: mongo.collection(IDEA_COLLECTION).await?,
            members: mongo.collection(MEMBER_COLLECTION).await?,
            applications: mongo.collection(APPLICATION_COLLECTION).await?,
            usage: mongo.collection(USAGE_COLLECTION).await?,
        })
    }

    /// Remove every idea, member and application (demo seeding)
    pub async fn clear_demo_data(&self) -> Result<()> {
        self.ideas.delete_many(doc! {}).await?;
        self.members.delete_many(doc! {}).await?;
        self.applications.delete_many(doc! {}).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TeamStore for MongoTeamStore {
    async fn insert_idea(&self, idea: IdeaDoc) -> Result<ObjectId> {
        self.ideas.insert_one(idea).await
    }

    async fn find_idea(&self, id: &ObjectId) -> Result<Option<IdeaDoc>> {
        self.ideas.find_one(doc! { "_id": id }).await
    }

    async fn list_ideas(&self) -> Result<Vec<IdeaDoc>> {
        self.ideas
            .find_many(doc! {}, Some(doc! { "metadata.created_at": -1 }))
            .await
    }

    async fn set_risk_verdict(&self, id: &ObjectId, verdict: &RiskVerdict) -> Result<()> {
        let verdict = bson::to_bson(verdict)
            .map_err(|e| TeamUpError::Internal(format!("Verdict encoding failed: {}", e)))?;

        let result = self
            .ideas
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "risk_verdict": verdict,
                        "metadata.updated_at": DateTime::now()
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(TeamUpError::NotFound(format!("idea {}", id)));
        }
        Ok(())
    }

    async fn count_ideas(&self) -> Result<u64> {
        self.ideas.count(doc! {}).await
    }

    async fn delete_idea(&self, id: &ObjectId) -> Result<bool> {
        let result = self.ideas.delete_one(doc! { "_id": id }).await?;
        let orphans = self
            .applications
            .delete_many(doc! { "idea_id": id })
            .await?;
        debug!(idea_id = %id, applications = orphans.deleted_count, "idea deleted");
        Ok(result.deleted_count > 0)
    }

    async fn insert_member(&self, member: MemberDoc) -> Result<ObjectId> {
        self.members.insert_one(member).await
    }

    async fn find_member(&self, id: &ObjectId) -> Result<Option<MemberDoc>> {
        self.members.find_one(doc! { "_id": id }).await
    }

    async fn find_members(&self, ids: &[ObjectId]) -> Result<Vec<MemberDoc>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.members
            .find_many(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
    }

    async fn find_members_by_name(&self, name: &str) -> Result<Vec<MemberDoc>> {
        self.members
            .find_many(doc! { "name": name }, Some(doc! { "_id": 1 }))
            .await
    }

    async fn list_members(&self) -> Result<Vec<MemberDoc>> {
        self.members.find_many(doc! {}, Some(doc! { "_id": 1 })).await
    }

    async fn count_members(&self) -> Result<u64> {
        self.members.count(doc! {}).await
    }

    async fn delete_member(&self, id: &ObjectId) -> Result<bool> {
        let result = self.members.delete_one(doc! { "_id": id }).await?;
        let orphans = self
            .applications
            .delete_many(doc! { "member_id": id })
            .await?;
        debug!(member_id = %id, applications = orphans.deleted_count, "member deleted");
        Ok(result.deleted_count > 0)
    }

    async fn insert_application(&self, application: ApplicationDoc) -> Result<ObjectId> {
        self.applications.insert_one(application).await
    }

    async fn find_applications(
        &self,
        idea_id: &ObjectId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationDoc>> {
        let mut filter = doc! { "idea_id": idea_id };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }
        self.applications.find_many(filter, None).await
    }

    async fn find_applications_by_member(&self, member_id: &ObjectId) -> Result<Vec<ApplicationDoc>> {
        self.applications
            .find_many(doc! { "member_id": member_id }, None)
            .await
    }

    async fn transition_application(
        &self,
        id: &ObjectId,
        to: ApplicationStatus,
    ) -> Result<ApplicationDoc> {
        if !ApplicationStatus::Pending.can_transition_to(to) {
            return Err(TeamUpError::Conflict(format!(
                "applications can only move from pending, not to {}",
                to.as_str()
            )));
        }

        // The pending check lives in the filter, so two racing reviewers
        // cannot both succeed.
        let result = self
            .applications
            .update_one(
                doc! { "_id": id, "status": ApplicationStatus::Pending.as_str() },
                doc! {
                    "$set": {
                        "status": to.as_str(),
                        "metadata.updated_at": DateTime::now()
                    }
                },
            )
            .await?;

        let current = self
            .applications
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| TeamUpError::NotFound(format!("application {}", id)))?;

        if result.modified_count == 0 {
            return Err(TeamUpError::Conflict(format!(
                "application {} is already {}",
                id,
                current.status.as_str()
            )));
        }
        Ok(current)
    }

    async fn delete_accepted_application(
        &self,
        idea_id: &ObjectId,
        member_id: &ObjectId,
    ) -> Result<bool> {
        let result = self
            .applications
            .delete_one(doc! {
                "idea_id": idea_id,
                "member_id": member_id,
                "status": ApplicationStatus::Accepted.as_str(),
            })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn try_charge_usage(&self, day: &str, ceiling: i64) -> Result<Option<i64>> {
        // Lazily create today's counter; the unique index on `date` keeps
        // concurrent creators from producing duplicates.
        self.usage
            .ensure_one(
                doc! { "date": day },
                doc! {
                    "api_calls": 0_i64,
                    "metadata": { "created_at": DateTime::now() }
                },
            )
            .await?;

        // Conditional increment: matches only while there is room.
        let charged = self
            .usage
            .inner()
            .find_one_and_update(
                doc! { "date": day, "api_calls": { "$lt": ceiling } },
                doc! {
                    "$inc": { "api_calls": 1_i64 },
                    "$set": { "metadata.updated_at": DateTime::now() }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        match charged {
            Some(usage) => Ok(Some(usage.api_calls)),
            None => {
                debug!(day = %day, ceiling, "usage ceiling reached");
                Ok(None)
            }
        }
    }

    async fn usage_on(&self, day: &str) -> Result<i64> {
        Ok(self
            .usage
            .find_one(doc! { "date": day })
            .await?
            .map(|u| u.api_calls)
            .unwrap_or(0))
    }
}
