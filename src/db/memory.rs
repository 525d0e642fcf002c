//! In-memory implementation of `TeamStore`
//!
//! Used in dev mode when MongoDB is unreachable, and by tests.

use bson::oid::ObjectId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::db::schemas::{ApplicationDoc, ApplicationStatus, IdeaDoc, MemberDoc, Metadata};
use crate::db::store::TeamStore;
use crate::risk::RiskVerdict;
use crate::types::{Result, TeamUpError};

/// DashMap-backed store
#[derive(Default)]
pub struct MemoryTeamStore {
    ideas: DashMap<ObjectId, IdeaDoc>,
    members: DashMap<ObjectId, MemberDoc>,
    applications: DashMap<ObjectId, ApplicationDoc>,
    /// Unique email -> member
    emails: DashMap<String, ObjectId>,
    /// (idea, member) -> its pending or accepted application
    open_applications: DashMap<(ObjectId, ObjectId), ObjectId>,
    /// Calls charged per `YYYY-MM-DD`
    usage: DashMap<String, i64>,
}

impl MemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop matching applications and their open-pair entries
    fn remove_applications_where(&self, doomed_if: impl Fn(&ApplicationDoc) -> bool) {
        let doomed: Vec<ObjectId> = self
            .applications
            .iter()
            .filter(|a| doomed_if(a.value()))
            .map(|a| *a.key())
            .collect();
        for id in doomed {
            if let Some((_, application)) = self.applications.remove(&id) {
                self.open_applications.remove_if(
                    &(application.idea_id, application.member_id),
                    |_, open| *open == id,
                );
            }
        }
    }

    /// Set a day's counter directly (tests)
    pub fn set_usage(&self, day: &str, api_calls: i64) {
        self.usage.insert(day.to_string(), api_calls);
    }
}

#[async_trait::async_trait]
impl TeamStore for MemoryTeamStore {
    async fn insert_idea(&self, mut idea: IdeaDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        idea._id = Some(id);
        idea.metadata = Metadata::new();
        self.ideas.insert(id, idea);
        Ok(id)
    }

    async fn find_idea(&self, id: &ObjectId) -> Result<Option<IdeaDoc>> {
        Ok(self.ideas.get(id).map(|i| i.clone()))
    }

    async fn list_ideas(&self) -> Result<Vec<IdeaDoc>> {
        let mut ideas: Vec<IdeaDoc> = self.ideas.iter().map(|i| i.value().clone()).collect();
        // ObjectIds embed their creation time, so they break timestamp ties
        ideas.sort_by(|a, b| {
            (b.metadata.created_at, b._id).cmp(&(a.metadata.created_at, a._id))
        });
        Ok(ideas)
    }

    async fn set_risk_verdict(&self, id: &ObjectId, verdict: &RiskVerdict) -> Result<()> {
        let mut idea = self
            .ideas
            .get_mut(id)
            .ok_or_else(|| TeamUpError::NotFound(format!("idea {}", id)))?;
        idea.risk_verdict = Some(verdict.clone());
        idea.metadata.touch();
        Ok(())
    }

    async fn count_ideas(&self) -> Result<u64> {
        Ok(self.ideas.len() as u64)
    }

    async fn delete_idea(&self, id: &ObjectId) -> Result<bool> {
        let existed = self.ideas.remove(id).is_some();
        self.remove_applications_where(|a| a.idea_id == *id);
        Ok(existed)
    }

    async fn insert_member(&self, mut member: MemberDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        match self.emails.entry(member.email.clone()) {
            Entry::Occupied(_) => {
                return Err(TeamUpError::Conflict(format!(
                    "member with email {} already exists",
                    member.email
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        member._id = Some(id);
        member.metadata = Metadata::new();
        self.members.insert(id, member);
        Ok(id)
    }

    async fn find_member(&self, id: &ObjectId) -> Result<Option<MemberDoc>> {
        Ok(self.members.get(id).map(|m| m.clone()))
    }

    async fn find_members(&self, ids: &[ObjectId]) -> Result<Vec<MemberDoc>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.members.get(id).map(|m| m.clone()))
            .collect())
    }

    async fn find_members_by_name(&self, name: &str) -> Result<Vec<MemberDoc>> {
        let mut found: Vec<MemberDoc> = self
            .members
            .iter()
            .filter(|m| m.name == name)
            .map(|m| m.value().clone())
            .collect();
        found.sort_by_key(|m| m._id);
        Ok(found)
    }

    async fn list_members(&self) -> Result<Vec<MemberDoc>> {
        let mut members: Vec<MemberDoc> = self.members.iter().map(|m| m.value().clone()).collect();
        members.sort_by_key(|m| m._id);
        Ok(members)
    }

    async fn count_members(&self) -> Result<u64> {
        Ok(self.members.len() as u64)
    }

    async fn delete_member(&self, id: &ObjectId) -> Result<bool> {
        let removed = self.members.remove(id);
        if let Some((_, member)) = &removed {
            self.emails.remove(&member.email);
        }
        self.remove_applications_where(|a| a.member_id == *id);
        Ok(removed.is_some())
    }

    async fn insert_application(&self, mut application: ApplicationDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        if application.status != ApplicationStatus::Rejected {
            match self
                .open_applications
                .entry((application.idea_id, application.member_id))
            {
                Entry::Occupied(_) => {
                    return Err(TeamUpError::Conflict(format!(
                        "{} already applied to idea {}",
                        application.member_name, application.idea_id
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }
        application._id = Some(id);
        application.metadata = Metadata::new();
        self.applications.insert(id, application);
        Ok(id)
    }

    async fn find_applications(
        &self,
        idea_id: &ObjectId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationDoc>> {
        let mut found: Vec<ApplicationDoc> = self
            .applications
            .iter()
            .filter(|a| a.idea_id == *idea_id && status.map_or(true, |s| a.status == s))
            .map(|a| a.value().clone())
            .collect();
        found.sort_by_key(|a| a._id);
        Ok(found)
    }

    async fn find_applications_by_member(&self, member_id: &ObjectId) -> Result<Vec<ApplicationDoc>> {
        let mut found: Vec<ApplicationDoc> = self
            .applications
            .iter()
            .filter(|a| a.member_id == *member_id)
            .map(|a| a.value().clone())
            .collect();
        found.sort_by_key(|a| a._id);
        Ok(found)
    }

    async fn transition_application(
        &self,
        id: &ObjectId,
        to: ApplicationStatus,
    ) -> Result<ApplicationDoc> {
        let updated = {
            // The shard lock is held across the check and the write
            let mut application = self
                .applications
                .get_mut(id)
                .ok_or_else(|| TeamUpError::NotFound(format!("application {}", id)))?;

            if !application.status.can_transition_to(to) {
                return Err(TeamUpError::Conflict(format!(
                    "application {} cannot move from {} to {}",
                    id,
                    application.status.as_str(),
                    to.as_str()
                )));
            }

            application.status = to;
            application.metadata.touch();
            application.clone()
        };

        if to == ApplicationStatus::Rejected {
            self.open_applications
                .remove_if(&(updated.idea_id, updated.member_id), |_, open| open == id);
        }
        Ok(updated)
    }

    async fn delete_accepted_application(
        &self,
        idea_id: &ObjectId,
        member_id: &ObjectId,
    ) -> Result<bool> {
        let target = self
            .applications
            .iter()
            .find(|a| {
                a.idea_id == *idea_id
                    && a.member_id == *member_id
                    && a.status == ApplicationStatus::Accepted
            })
            .map(|a| *a.key());

        let Some(id) = target else {
            return Ok(false);
        };
        self.open_applications
            .remove_if(&(*idea_id, *member_id), |_, open| *open == id);
        Ok(self.applications.remove(&id).is_some())
    }

    async fn try_charge_usage(&self, day: &str, ceiling: i64) -> Result<Option<i64>> {
        // The entry guard serializes check-then-increment for this day
        let mut calls = self.usage.entry(day.to_string()).or_insert(0);
        if *calls >= ceiling {
            return Ok(None);
        }
        *calls += 1;
        Ok(Some(*calls))
    }

    async fn usage_on(&self, day: &str) -> Result<i64> {
        Ok(self.usage.get(day).map(|c| *c).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_charge_stops_at_ceiling() {
        let store = MemoryTeamStore::new();
        store.set_usage("2026-01-01", 59);

        assert_eq!(store.try_charge_usage("2026-01-01", 60).await.unwrap(), Some(60));
        assert_eq!(store.try_charge_usage("2026-01-01", 60).await.unwrap(), None);
        assert_eq!(store.usage_on("2026-01-01").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_new_day_starts_fresh() {
        let store = MemoryTeamStore::new();
        store.set_usage("2026-01-01", 60);

        assert_eq!(store.usage_on("2026-01-02").await.unwrap(), 0);
        assert_eq!(store.try_charge_usage("2026-01-02", 60).await.unwrap(), Some(1));
        assert_eq!(store.usage_on("2026-01-01").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_concurrent_charges_never_exceed_ceiling() {
        let store = Arc::new(MemoryTeamStore::new());
        let mut handles = Vec::new();
        for _ in 0..200 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.try_charge_usage("2026-03-03", 60).await.unwrap()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 60);
        assert_eq!(store.usage_on("2026-03-03").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_transition_is_one_way() {
        let store = MemoryTeamStore::new();
        let app = ApplicationDoc::new(ObjectId::new(), ObjectId::new(), "Mike", "Backend");
        let id = store.insert_application(app).await.unwrap();

        let accepted = store
            .transition_application(&id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(accepted.status, ApplicationStatus::Accepted);

        let err = store
            .transition_application(&id, ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, TeamUpError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_only_touches_accepted() {
        let store = MemoryTeamStore::new();
        let idea_id = ObjectId::new();
        let member_id = ObjectId::new();
        let pending = ApplicationDoc::new(idea_id, member_id, "Mike", "Backend");
        store.insert_application(pending).await.unwrap();

        assert!(!store.delete_accepted_application(&idea_id, &member_id).await.unwrap());

        let accepted = ApplicationDoc::new(idea_id, member_id, "Mike", "Backend")
            .with_status(ApplicationStatus::Accepted);
        store.insert_application(accepted).await.unwrap();

        assert!(store.delete_accepted_application(&idea_id, &member_id).await.unwrap());
        let left = store.find_applications(&idea_id, None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_concurrent_applies_land_once() {
        let store = Arc::new(MemoryTeamStore::new());
        let idea_id = ObjectId::new();
        let member_id = ObjectId::new();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let app = ApplicationDoc::new(idea_id, member_id, "Mike", "Backend");
                store.insert_application(app).await
            }));
        }

        let mut landed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => landed += 1,
                Err(e) => assert!(matches!(e, TeamUpError::Conflict(_))),
            }
        }

        assert_eq!(landed, 1);
        assert_eq!(store.find_applications(&idea_id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reapply_after_rejection() {
        let store = MemoryTeamStore::new();
        let idea_id = ObjectId::new();
        let member_id = ObjectId::new();

        let first = store
            .insert_application(ApplicationDoc::new(idea_id, member_id, "Mike", "Backend"))
            .await
            .unwrap();
        store
            .transition_application(&first, ApplicationStatus::Rejected)
            .await
            .unwrap();

        store
            .insert_application(ApplicationDoc::new(idea_id, member_id, "Mike", "Backend"))
            .await
            .unwrap();
        let err = store
            .insert_application(ApplicationDoc::new(idea_id, member_id, "Mike", "Backend"))
            .await
            .unwrap_err();
        assert!(matches!(err, TeamUpError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_concurrent_members_with_one_email() {
        let store = Arc::new(MemoryTeamStore::new());

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let member = MemberDoc::new(format!("Sam {}", i), "sam@example.com", "PM", 5);
                store.insert_member(member).await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.count_members().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_member_frees_email_and_teams() {
        let store = MemoryTeamStore::new();
        let member = MemberDoc::new("Mike Builder", "mike@example.com", "Backend Developer", 30);
        let member_id = store.insert_member(member.clone()).await.unwrap();
        let idea_id = ObjectId::new();
        store
            .insert_application(
                ApplicationDoc::new(idea_id, member_id, "Mike Builder", "Backend")
                    .with_status(ApplicationStatus::Accepted),
            )
            .await
            .unwrap();

        assert!(store.delete_member(&member_id).await.unwrap());
        assert!(!store.delete_member(&member_id).await.unwrap());
        assert!(store.find_applications(&idea_id, None).await.unwrap().is_empty());
        store.insert_member(member).await.unwrap();
    }
}
