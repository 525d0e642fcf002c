//! TeamUp service
//!
//! One entry point per inbound operation. Risk computation is delegated to
//! `RiskPipeline`; posting an idea runs the clarity check under the same
//! daily quota.

use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, info};

use super::clarity::ClarityAnalyzer;
use super::views::{
    AdminData, AdminDeleted, AdminStats, ApplicationView, ApplyRequest, IdeaView, MemberView,
    PostIdeaRequest, PostIdeaResponse, RecordKind,
};
use crate::db::schemas::{ApplicationDoc, ApplicationStatus, IdeaDoc, RoleSlot};
use crate::db::SharedStore;
use crate::logging::UsageLogger;
use crate::oracle::SharedOracle;
use crate::risk::{
    Assessment, QuotaGuard, Remediation, RiskPipeline, RiskVerdict, ScenarioProjector,
    TeamAssembler, VerdictOverride, VerdictSynthesizer,
};
use crate::types::{Result, TeamUpError};

/// Parse a hex document id, naming the field in the error
pub fn parse_id(raw: &str, what: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| TeamUpError::BadRequest(format!("invalid {} id '{}'", what, raw)))
}

pub struct TeamUpService {
    store: SharedStore,
    quota: Arc<QuotaGuard>,
    team: TeamAssembler,
    clarity: ClarityAnalyzer,
    pipeline: RiskPipeline,
}

impl TeamUpService {
    pub fn new(
        store: SharedStore,
        oracle: SharedOracle,
        override_policy: Arc<dyn VerdictOverride>,
        daily_quota: i64,
        usage: UsageLogger,
    ) -> Self {
        let quota = Arc::new(QuotaGuard::new(
            Arc::clone(&store),
            daily_quota,
            usage.clone(),
        ));
        let pipeline = RiskPipeline::new(
            Arc::clone(&store),
            Arc::clone(&quota),
            override_policy,
            VerdictSynthesizer::new(Arc::clone(&oracle), usage.clone()),
            usage.clone(),
        );

        Self {
            team: TeamAssembler::new(Arc::clone(&store)),
            clarity: ClarityAnalyzer::new(oracle, usage),
            store,
            quota,
            pipeline,
        }
    }

    // ---- ideas ----

    /// Score and store a new idea. Nothing is stored unless the clarity
    /// check succeeds.
    pub async fn post_idea(&self, req: PostIdeaRequest) -> Result<PostIdeaResponse> {
        if req.title.trim().is_empty() {
            return Err(TeamUpError::BadRequest("title is required".into()));
        }
        if req.created_by.trim().is_empty() {
            return Err(TeamUpError::BadRequest("createdBy is required".into()));
        }

        self.quota.admit_today("clarity").await?;
        let report = self
            .clarity
            .analyze(&req.title, &req.problem_statement, &req.expected_outcome)
            .await?;

        let roles = req
            .roles_needed
            .into_iter()
            .filter(|r| !r.role_name.trim().is_empty())
            .map(|r| RoleSlot::new(r.role_name))
            .collect();
        let mut idea = IdeaDoc::new(
            req.title,
            req.problem_statement,
            req.expected_outcome,
            roles,
            req.created_by,
        );
        idea.tags = req.tags;
        idea.clarity_score = report.score;

        let id = self.store.insert_idea(idea).await?;
        let stored = self.load_idea(&id).await?;
        info!(idea_id = %id, clarity = report.score, "Idea posted");

        Ok(PostIdeaResponse {
            idea: IdeaView::from(&stored),
            feedback: report.feedback,
        })
    }

    /// All ideas, newest first
    pub async fn list_ideas(&self) -> Result<Vec<IdeaView>> {
        let ideas = self.store.list_ideas().await?;
        Ok(ideas.iter().map(IdeaView::from).collect())
    }

    async fn load_idea(&self, id: &ObjectId) -> Result<IdeaDoc> {
        self.store
            .find_idea(id)
            .await?
            .ok_or_else(|| TeamUpError::NotFound(format!("idea {}", id)))
    }

    // ---- risk ----

    pub async fn compute_risk(&self, idea_id: &ObjectId, force_refresh: bool) -> Result<Assessment> {
        self.pipeline.assess(idea_id, force_refresh).await
    }

    /// Projected verdict for the stored verdict under `remediation`.
    /// Nothing is written and no quota is used.
    pub async fn simulate(&self, idea_id: &ObjectId, remediation: Remediation) -> Result<RiskVerdict> {
        let verdict = self
            .pipeline
            .cached(idea_id)
            .await?
            .ok_or_else(|| TeamUpError::Conflict(format!("idea {} has no risk verdict yet", idea_id)))?;

        ScenarioProjector::project(&verdict, remediation).ok_or_else(|| {
            TeamUpError::Conflict("risk is already low, nothing to simulate".into())
        })
    }

    // ---- team ----

    /// Accepted members of an idea. The creator is not listed.
    pub async fn get_team(&self, idea_id: &ObjectId) -> Result<Vec<MemberView>> {
        self.load_idea(idea_id).await?;
        let members = self.team.roster(idea_id).await?;
        Ok(members.iter().map(MemberView::from).collect())
    }

    /// Remove an accepted member from an idea's team
    pub async fn remove_member(&self, idea_id: &ObjectId, member_id: &ObjectId) -> Result<()> {
        if !self
            .store
            .delete_accepted_application(idea_id, member_id)
            .await?
        {
            return Err(TeamUpError::NotFound(format!(
                "member {} is not on the team of idea {}",
                member_id, idea_id
            )));
        }
        info!(idea_id = %idea_id, member_id = %member_id, "Member removed from team");
        Ok(())
    }

    // ---- applications ----

    pub async fn apply(&self, req: ApplyRequest) -> Result<ApplicationView> {
        let idea_id = parse_id(&req.idea_id, "idea")?;
        let member_id = parse_id(&req.member_id, "member")?;
        if req.applying_for_role.trim().is_empty() {
            return Err(TeamUpError::BadRequest("applyingForRole is required".into()));
        }

        self.load_idea(&idea_id).await?;
        let member = self
            .store
            .find_member(&member_id)
            .await?
            .ok_or_else(|| TeamUpError::NotFound(format!("member {}", member_id)))?;

        let open = self
            .store
            .find_applications_by_member(&member_id)
            .await?
            .into_iter()
            .any(|a| a.idea_id == idea_id && a.status != ApplicationStatus::Rejected);
        if open {
            return Err(TeamUpError::Conflict(format!(
                "{} already applied to idea {}",
                member.name, idea_id
            )));
        }

        let mut application =
            ApplicationDoc::new(idea_id, member_id, member.name, req.applying_for_role);
        if let Some(message) = req.message.filter(|m| !m.trim().is_empty()) {
            application = application.with_message(message);
        }

        let id = self.store.insert_application(application.clone()).await?;
        application._id = Some(id);
        debug!(application_id = %id, idea_id = %idea_id, "Application submitted");
        Ok(ApplicationView::from(&application))
    }

    /// Every application to an idea
    pub async fn applicants(&self, idea_id: &ObjectId) -> Result<Vec<ApplicationView>> {
        let applications = self.store.find_applications(idea_id, None).await?;
        Ok(applications.iter().map(ApplicationView::from).collect())
    }

    /// A member's applications, with idea titles
    pub async fn my_applications(&self, member_id: &ObjectId) -> Result<Vec<ApplicationView>> {
        let applications = self.store.find_applications_by_member(member_id).await?;

        let mut views = Vec::with_capacity(applications.len());
        for application in &applications {
            let mut view = ApplicationView::from(application);
            view.idea_title = self
                .store
                .find_idea(&application.idea_id)
                .await?
                .map(|idea| idea.title);
            views.push(view);
        }
        Ok(views)
    }

    pub async fn update_application_status(
        &self,
        application_id: &ObjectId,
        status: &str,
    ) -> Result<ApplicationView> {
        let to: ApplicationStatus = status
            .parse()
            .map_err(TeamUpError::BadRequest)?;
        if to == ApplicationStatus::Pending {
            return Err(TeamUpError::BadRequest(
                "status must be accepted or rejected".into(),
            ));
        }

        let updated = self.store.transition_application(application_id, to).await?;
        info!(
            application_id = %application_id,
            status = to.as_str(),
            "Application reviewed"
        );
        Ok(ApplicationView::from(&updated))
    }

    // ---- admin ----

    pub async fn admin_stats(&self) -> Result<AdminStats> {
        Ok(AdminStats {
            members: self.store.count_members().await?,
            ideas: self.store.count_ideas().await?,
            api_calls_today: self.quota.usage_today().await?,
            daily_quota: self.quota.ceiling(),
        })
    }

    /// Every member and idea
    pub async fn admin_data(&self) -> Result<AdminData> {
        let members = self.store.list_members().await?;
        let ideas = self.store.list_ideas().await?;
        Ok(AdminData {
            members: members.iter().map(MemberView::from).collect(),
            ideas: ideas.iter().map(IdeaView::from).collect(),
        })
    }

    /// Hard delete a member or an idea. Applications referencing the record
    /// go with it.
    pub async fn admin_delete(&self, kind: &str, id: &str) -> Result<AdminDeleted> {
        let kind: RecordKind = kind.parse().map_err(TeamUpError::BadRequest)?;
        let object_id = match kind {
            RecordKind::Member => parse_id(id, "member")?,
            RecordKind::Idea => parse_id(id, "idea")?,
        };

        let existed = match kind {
            RecordKind::Member => self.store.delete_member(&object_id).await?,
            RecordKind::Idea => self.store.delete_idea(&object_id).await?,
        };
        if !existed {
            return Err(TeamUpError::NotFound(format!("{} {}", kind.as_str(), object_id)));
        }

        info!(kind = kind.as_str(), id = %object_id, "Record deleted by administrator");
        Ok(AdminDeleted {
            kind,
            id: object_id.to_hex(),
        })
    }
}
