//! Effective team assembly
//!
//! The team counted for risk is every accepted applicant plus the idea's
//! creator. The creator is linked by display name only, so resolution is
//! best-effort: no match simply means the creator is not counted.

use bson::oid::ObjectId;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::db::schemas::{ApplicationStatus, IdeaDoc, MemberDoc};
use crate::db::SharedStore;
use crate::types::Result;

/// Members counted toward an idea's risk. Order is insignificant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveTeam {
    members: Vec<MemberDoc>,
}

impl EffectiveTeam {
    /// Build a team, dropping duplicate member ids
    pub fn from_members(members: impl IntoIterator<Item = MemberDoc>) -> Self {
        let mut seen = HashSet::new();
        let members = members
            .into_iter()
            .filter(|m| match m._id {
                Some(id) => seen.insert(id),
                None => true,
            })
            .collect();
        Self { members }
    }

    pub fn members(&self) -> &[MemberDoc] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.members.iter().any(|m| m._id.as_ref() == Some(id))
    }
}

pub struct TeamAssembler {
    store: SharedStore,
}

impl TeamAssembler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Accepted applicants only. The creator is not listed here.
    pub async fn roster(&self, idea_id: &ObjectId) -> Result<Vec<MemberDoc>> {
        let accepted = self
            .store
            .find_applications(idea_id, Some(ApplicationStatus::Accepted))
            .await?;
        let ids: Vec<ObjectId> = accepted.iter().map(|a| a.member_id).collect();
        self.store.find_members(&ids).await
    }

    /// Accepted applicants plus the resolved creator, de-duplicated
    pub async fn compose(&self, idea: &IdeaDoc) -> Result<EffectiveTeam> {
        let mut members = match idea._id {
            Some(id) => self.roster(&id).await?,
            None => Vec::new(),
        };

        if let Some(owner) = self.resolve_creator(&idea.created_by).await? {
            members.push(owner);
        }

        let team = EffectiveTeam::from_members(members);
        debug!(idea = %idea.title, size = team.len(), "Composed effective team");
        Ok(team)
    }

    async fn resolve_creator(&self, name: &str) -> Result<Option<MemberDoc>> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        let mut matches = self.store.find_members_by_name(name).await?;
        if matches.len() > 1 {
            warn!(
                creator = %name,
                matches = matches.len(),
                "Creator name is ambiguous, counting the earliest member"
            );
        }
        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.remove(0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ApplicationDoc, RoleSlot};
    use crate::db::{MemoryTeamStore, TeamStore};
    use std::sync::Arc;

    async fn idea(store: &MemoryTeamStore, creator: &str) -> IdeaDoc {
        let doc = IdeaDoc::new(
            "Test".into(),
            "p".into(),
            "o".into(),
            vec![RoleSlot::new("Backend Developer")],
            creator.into(),
        );
        let id = store.insert_idea(doc).await.unwrap();
        store.find_idea(&id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_empty_team_is_not_an_error() {
        let store = Arc::new(MemoryTeamStore::new());
        let idea = idea(&store, "Nobody Known").await;

        let team = TeamAssembler::new(store).compose(&idea).await.unwrap();
        assert!(team.is_empty());
    }

    #[tokio::test]
    async fn test_owner_counted_once_when_also_accepted() {
        let store = Arc::new(MemoryTeamStore::new());
        let owner_id = store
            .insert_member(MemberDoc::new("Sarah", "sarah@x.io", "Frontend Developer", 6))
            .await
            .unwrap();
        let idea = idea(&store, "Sarah").await;
        let app = ApplicationDoc::new(idea._id.unwrap(), owner_id, "Sarah", "Frontend")
            .with_status(ApplicationStatus::Accepted);
        store.insert_application(app).await.unwrap();

        let team = TeamAssembler::new(store).compose(&idea).await.unwrap();
        assert_eq!(team.len(), 1);
        assert!(team.contains(&owner_id));
    }

    #[tokio::test]
    async fn test_pending_and_rejected_are_not_counted() {
        let store = Arc::new(MemoryTeamStore::new());
        let idea = idea(&store, "Nobody").await;
        let idea_id = idea._id.unwrap();
        for (i, status) in [ApplicationStatus::Pending, ApplicationStatus::Rejected, ApplicationStatus::Accepted]
            .into_iter()
            .enumerate()
        {
            let member_id = store
                .insert_member(MemberDoc::new(format!("m{}", i), format!("m{}@x.io", i), "Designer", 4))
                .await
                .unwrap();
            let app = ApplicationDoc::new(idea_id, member_id, format!("m{}", i), "Designer")
                .with_status(status);
            store.insert_application(app).await.unwrap();
        }

        let assembler = TeamAssembler::new(store);
        assert_eq!(assembler.compose(&idea).await.unwrap().len(), 1);
        assert_eq!(assembler.roster(&idea_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_roster_excludes_owner() {
        let store = Arc::new(MemoryTeamStore::new());
        store
            .insert_member(MemberDoc::new("Sarah", "sarah@x.io", "Frontend Developer", 6))
            .await
            .unwrap();
        let idea = idea(&store, "Sarah").await;

        let assembler = TeamAssembler::new(store);
        assert!(assembler.roster(&idea._id.unwrap()).await.unwrap().is_empty());
        assert_eq!(assembler.compose(&idea).await.unwrap().len(), 1);
    }
}
