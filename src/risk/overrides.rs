//! Verdict overrides
//!
//! An override is consulted after the team is assembled and before any
//! quota is charged. When it returns a verdict the oracle is never contacted.

use tracing::info;

use super::team::EffectiveTeam;
use super::verdict::{Evidence, RiskLevel, RiskVerdict};
use crate::db::schemas::IdeaDoc;

/// Title of the showcase project
pub const DEMO_TITLE: &str = "AI Study Buddy";

/// Team size at which the showcase project is complete
pub const DEMO_MIN_TEAM_SIZE: usize = 4;

const SHOWCASE_REASON: &str = "Excellent team composition! The addition of a Backend Developer (Mike) completes the technical stack (Frontend + Backend + Design). Availability is high.";

pub trait VerdictOverride: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// A verdict to use instead of synthesis, if this override applies
    fn check(&self, idea: &IdeaDoc, team: &EffectiveTeam) -> Option<RiskVerdict>;
}

/// Never overrides
pub struct NoOverride;

impl VerdictOverride for NoOverride {
    fn name(&self) -> &'static str {
        "none"
    }

    fn check(&self, _idea: &IdeaDoc, _team: &EffectiveTeam) -> Option<RiskVerdict> {
        None
    }
}

/// Fixed Low verdict for the showcase project once its team is complete
pub struct DemoShowcaseOverride {
    title: String,
    min_team_size: usize,
}

impl DemoShowcaseOverride {
    pub fn new(title: impl Into<String>, min_team_size: usize) -> Self {
        Self {
            title: title.into(),
            min_team_size,
        }
    }

    fn verdict() -> RiskVerdict {
        RiskVerdict::from_parts(
            RiskLevel::Low,
            SHOWCASE_REASON,
            Evidence {
                similar_teams: 142,
                failure_rate: "11%".to_string(),
                common_pitfall: "None identified".to_string(),
                success_projection: "89% chance of submission".to_string(),
            },
        )
    }
}

impl Default for DemoShowcaseOverride {
    fn default() -> Self {
        Self::new(DEMO_TITLE, DEMO_MIN_TEAM_SIZE)
    }
}

impl VerdictOverride for DemoShowcaseOverride {
    fn name(&self) -> &'static str {
        "demo_showcase"
    }

    fn check(&self, idea: &IdeaDoc, team: &EffectiveTeam) -> Option<RiskVerdict> {
        if idea.title != self.title || team.len() < self.min_team_size {
            return None;
        }
        info!(
            idea = %idea.title,
            team_size = team.len(),
            "Showcase team complete, using fixed verdict"
        );
        Some(Self::verdict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{MemberDoc, RoleSlot};
    use bson::oid::ObjectId;

    fn idea(title: &str) -> IdeaDoc {
        IdeaDoc::new(
            title.into(),
            "p".into(),
            "o".into(),
            vec![RoleSlot::new("Backend Developer")],
            "Sarah".into(),
        )
    }

    fn team(size: usize) -> EffectiveTeam {
        EffectiveTeam::from_members((0..size).map(|i| {
            let mut m = MemberDoc::new(format!("m{}", i), format!("m{}@x.io", i), "Designer", 4);
            m._id = Some(ObjectId::new());
            m
        }))
    }

    #[test]
    fn test_fires_at_min_team_size() {
        let verdict = DemoShowcaseOverride::default()
            .check(&idea("AI Study Buddy"), &team(4))
            .unwrap();
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert_eq!(verdict.similar_teams, 142);
        assert_eq!(verdict.failure_rate, "11%");
        assert_eq!(verdict.success_projection, "89% chance of submission");
        assert!(!verdict.is_simulated);
    }

    #[test]
    fn test_does_not_fire_below_min_team_size() {
        assert!(DemoShowcaseOverride::default()
            .check(&idea("AI Study Buddy"), &team(3))
            .is_none());
    }

    #[test]
    fn test_title_must_match_exactly() {
        let o = DemoShowcaseOverride::default();
        assert!(o.check(&idea("ai study buddy"), &team(5)).is_none());
        assert!(o.check(&idea("AI Study Buddy 2"), &team(5)).is_none());
    }

    #[test]
    fn test_no_override() {
        assert!(NoOverride.check(&idea("AI Study Buddy"), &team(10)).is_none());
    }
}
