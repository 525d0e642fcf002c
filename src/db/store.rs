//! Persistence boundary
//!
//! Everything the risk subsystem and the inbound surface read or write goes
//! through `TeamStore`, so the pipeline runs unchanged against MongoDB or the
//! in-memory store.

use bson::oid::ObjectId;
use std::sync::Arc;

use crate::db::schemas::{ApplicationDoc, ApplicationStatus, IdeaDoc, MemberDoc};
use crate::risk::RiskVerdict;
use crate::types::Result;

/// Shared handle to a store
pub type SharedStore = Arc<dyn TeamStore>;

#[async_trait::async_trait]
pub trait TeamStore: Send + Sync {
    // ---- ideas ----

    async fn insert_idea(&self, idea: IdeaDoc) -> Result<ObjectId>;

    async fn find_idea(&self, id: &ObjectId) -> Result<Option<IdeaDoc>>;

    /// All ideas, newest first
    async fn list_ideas(&self) -> Result<Vec<IdeaDoc>>;

    /// Overwrite the cached verdict. `NotFound` if the idea is gone.
    async fn set_risk_verdict(&self, id: &ObjectId, verdict: &RiskVerdict) -> Result<()>;

    async fn count_ideas(&self) -> Result<u64>;

    /// Delete an idea together with its applications.
    /// Returns whether the idea existed.
    async fn delete_idea(&self, id: &ObjectId) -> Result<bool>;

    // ---- members ----

    /// `Conflict` if the email is already registered
    async fn insert_member(&self, member: MemberDoc) -> Result<ObjectId>;

    async fn find_member(&self, id: &ObjectId) -> Result<Option<MemberDoc>>;

    /// Members with any of the given ids. Unknown ids are skipped.
    async fn find_members(&self, ids: &[ObjectId]) -> Result<Vec<MemberDoc>>;

    /// Members whose display name equals `name` exactly
    async fn find_members_by_name(&self, name: &str) -> Result<Vec<MemberDoc>>;

    /// All members, oldest first
    async fn list_members(&self) -> Result<Vec<MemberDoc>>;

    async fn count_members(&self) -> Result<u64>;

    /// Delete a member together with their applications, which takes them
    /// off every team. Returns whether the member existed.
    async fn delete_member(&self, id: &ObjectId) -> Result<bool>;

    // ---- applications ----

    /// `Conflict` if the member already has a pending or accepted
    /// application to the same idea
    async fn insert_application(&self, application: ApplicationDoc) -> Result<ObjectId>;

    /// Applications of an idea, optionally restricted to one status
    async fn find_applications(
        &self,
        idea_id: &ObjectId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationDoc>>;

    async fn find_applications_by_member(&self, member_id: &ObjectId) -> Result<Vec<ApplicationDoc>>;

    /// Move an application out of `pending`.
    ///
    /// The status check and the write are one atomic step. Returns the
    /// updated document; `NotFound` if absent, `Conflict` if not pending.
    async fn transition_application(
        &self,
        id: &ObjectId,
        to: ApplicationStatus,
    ) -> Result<ApplicationDoc>;

    /// Delete the accepted application linking `member_id` to `idea_id`.
    /// Returns whether one was deleted.
    async fn delete_accepted_application(
        &self,
        idea_id: &ObjectId,
        member_id: &ObjectId,
    ) -> Result<bool>;

    // ---- daily oracle usage ----

    /// Atomically charge one oracle call against `day` unless the count has
    /// reached `ceiling`. The day's counter is created on first use. Returns
    /// the new count, or `None` when the ceiling was already reached (in which
    /// case nothing changed).
    async fn try_charge_usage(&self, day: &str, ceiling: i64) -> Result<Option<i64>>;

    /// Calls charged on `day`, 0 if the day has no counter yet
    async fn usage_on(&self, day: &str) -> Result<i64>;
}
