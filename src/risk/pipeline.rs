//! Cached risk assessment
//!
//! The verdict stored on an idea is served untouched until a refresh is
//! requested. A refresh re-runs the whole pipeline and overwrites the stored
//! verdict only when it succeeds.

use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::overrides::VerdictOverride;
use super::quota::QuotaGuard;
use super::synthesizer::VerdictSynthesizer;
use super::team::TeamAssembler;
use super::verdict::RiskVerdict;
use crate::db::schemas::IdeaDoc;
use crate::db::SharedStore;
use crate::logging::{EventType, UsageLogger};
use crate::types::{Result, TeamUpError};

/// Where a returned verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Cache,
    Override,
    Oracle,
}

/// A verdict plus its source
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub verdict: RiskVerdict,
    pub source: VerdictSource,
}

pub struct RiskPipeline {
    store: SharedStore,
    quota: Arc<QuotaGuard>,
    team: TeamAssembler,
    override_policy: Arc<dyn VerdictOverride>,
    synthesizer: VerdictSynthesizer,
    usage: UsageLogger,
}

impl RiskPipeline {
    pub fn new(
        store: SharedStore,
        quota: Arc<QuotaGuard>,
        override_policy: Arc<dyn VerdictOverride>,
        synthesizer: VerdictSynthesizer,
        usage: UsageLogger,
    ) -> Self {
        Self {
            team: TeamAssembler::new(Arc::clone(&store)),
            store,
            quota,
            override_policy,
            synthesizer,
            usage,
        }
    }

    /// The stored verdict, if any. `NotFound` if the idea does not exist.
    pub async fn cached(&self, idea_id: &ObjectId) -> Result<Option<RiskVerdict>> {
        Ok(self.load(idea_id).await?.risk_verdict)
    }

    /// Serve the stored verdict, computing one only when none exists or
    /// `force_refresh` is set.
    pub async fn assess(&self, idea_id: &ObjectId, force_refresh: bool) -> Result<Assessment> {
        let idea = self.load(idea_id).await?;

        if !force_refresh {
            if let Some(verdict) = idea.risk_verdict {
                debug!(idea_id = %idea_id, "Serving cached verdict");
                return Ok(Assessment {
                    verdict,
                    source: VerdictSource::Cache,
                });
            }
        }

        self.compute(&idea).await
    }

    /// Discard the stored verdict in favour of a fresh one
    pub async fn invalidate_and_recompute(&self, idea_id: &ObjectId) -> Result<Assessment> {
        self.assess(idea_id, true).await
    }

    async fn load(&self, idea_id: &ObjectId) -> Result<IdeaDoc> {
        self.store
            .find_idea(idea_id)
            .await?
            .ok_or_else(|| TeamUpError::NotFound(format!("idea {}", idea_id)))
    }

    async fn compute(&self, idea: &IdeaDoc) -> Result<Assessment> {
        let idea_id = idea
            ._id
            .ok_or_else(|| TeamUpError::Internal("idea without id".into()))?;
        let team = self.team.compose(idea).await?;

        if let Some(verdict) = self.override_policy.check(idea, &team) {
            self.usage
                .log(
                    self.usage
                        .event(EventType::OverrideFired)
                        .with_operation("risk")
                        .with_idea(idea_id.to_hex())
                        .with_detail(self.override_policy.name()),
                )
                .await;
            self.store.set_risk_verdict(&idea_id, &verdict).await?;
            return Ok(Assessment {
                verdict,
                source: VerdictSource::Override,
            });
        }

        self.quota.admit_today("risk").await?;

        let verdict = match self.synthesizer.synthesize(idea, &team).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(idea_id = %idea_id, kind = e.kind(), "Risk synthesis failed, keeping stored verdict");
                return Err(e);
            }
        };

        self.store.set_risk_verdict(&idea_id, &verdict).await?;
        info!(
            idea_id = %idea_id,
            risk_level = %verdict.risk_level,
            team_size = team.len(),
            "Stored new risk verdict"
        );

        Ok(Assessment {
            verdict,
            source: VerdictSource::Oracle,
        })
    }
}
