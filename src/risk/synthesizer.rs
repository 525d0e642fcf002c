//! Oracle-backed verdict synthesis
//!
//! Builds the risk prompt, consults the oracle, decodes `{riskLevel, reason}`
//! and attaches evidence for the returned tier. Nothing is persisted here.

use serde::Deserialize;
use std::time::Instant;

use super::evidence;
use super::team::EffectiveTeam;
use super::verdict::{RiskLevel, RiskVerdict};
use crate::db::schemas::IdeaDoc;
use crate::logging::{EventType, UsageLogger};
use crate::oracle::{decode_json, SharedOracle};
use crate::types::{Result, TeamUpError};

/// Shape the oracle is asked to return
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskAnswer {
    risk_level: String,
    reason: String,
}

/// Render the risk prompt for an idea and its effective team
pub fn build_prompt(idea: &IdeaDoc, team: &EffectiveTeam) -> String {
    let roster = if team.is_empty() {
        "No members.".to_string()
    } else {
        team.members()
            .iter()
            .map(|m| format!("- {} ({} hrs/day)", m.primary_role, m.availability_hours))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Analyze failure risk for this hackathon team.\n\
         Project: \"{title}\".\n\
         Roles Needed: {roles}.\n\
         \n\
         Current Team Composition (Owner + Accepted Members):\n\
         {roster}\n\
         \n\
         Task: Compare \"Roles Needed\" vs \"Current Team\".\n\
         If key technical roles (Backend/Frontend/AI) are missing, Risk is HIGH.\n\
         If team has all required skills, Risk is LOW.\n\
         \n\
         Return JSON: {{\"riskLevel\": \"HIGH\" or \"MEDIUM\" or \"LOW\", \"reason\": \"Short reason why\"}}",
        title = idea.title,
        roles = idea.role_names().join(", "),
        roster = roster,
    )
}

pub struct VerdictSynthesizer {
    oracle: SharedOracle,
    usage: UsageLogger,
}

impl VerdictSynthesizer {
    pub fn new(oracle: SharedOracle, usage: UsageLogger) -> Self {
        Self { oracle, usage }
    }

    /// Ask the oracle for a verdict on `team`.
    ///
    /// Callers must have charged the quota already.
    pub async fn synthesize(&self, idea: &IdeaDoc, team: &EffectiveTeam) -> Result<RiskVerdict> {
        let prompt = build_prompt(idea, team);
        let started = Instant::now();

        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::OracleFailed)
                            .with_operation("risk")
                            .with_idea(idea.id_hex())
                            .with_duration(started.elapsed().as_millis() as u64)
                            .with_detail(e.to_string()),
                    )
                    .await;
                return Err(e);
            }
        };

        self.usage
            .log(
                self.usage
                    .event(EventType::OracleCall)
                    .with_operation("risk")
                    .with_idea(idea.id_hex())
                    .with_duration(started.elapsed().as_millis() as u64),
            )
            .await;

        match Self::decode(&raw) {
            Ok((level, reason)) => {
                let evidence = evidence::derive(level, &mut rand::thread_rng());
                Ok(RiskVerdict::from_parts(level, reason, evidence))
            }
            Err(e) => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::ParseFailed)
                            .with_operation("risk")
                            .with_idea(idea.id_hex())
                            .with_detail(e.to_string()),
                    )
                    .await;
                Err(e)
            }
        }
    }

    fn decode(raw: &str) -> Result<(RiskLevel, String)> {
        let answer: RiskAnswer = decode_json(raw)?;
        let level = RiskLevel::parse(&answer.risk_level).ok_or_else(|| {
            TeamUpError::Parse(format!("unknown risk level '{}'", answer.risk_level))
        })?;
        Ok((level, answer.reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{MemberDoc, RoleSlot};
    use crate::oracle::ScriptedOracle;
    use bson::oid::ObjectId;
    use std::sync::Arc;

    fn idea() -> IdeaDoc {
        IdeaDoc::new(
            "AI Study Buddy".into(),
            "p".into(),
            "o".into(),
            vec![
                RoleSlot::new("Frontend Developer"),
                RoleSlot::new("Backend Developer"),
                RoleSlot::new("Designer"),
            ],
            "Sarah".into(),
        )
    }

    fn member(role: &str, hours: u32) -> MemberDoc {
        let mut m = MemberDoc::new(role, format!("{}@x.io", hours), role, hours);
        m._id = Some(ObjectId::new());
        m
    }

    fn synthesizer(oracle: Arc<ScriptedOracle>) -> VerdictSynthesizer {
        VerdictSynthesizer::new(oracle, UsageLogger::new("test".into()))
    }

    #[test]
    fn test_prompt_lists_roles_and_team() {
        let team = EffectiveTeam::from_members(vec![member("Frontend Developer", 6)]);
        let prompt = build_prompt(&idea(), &team);

        assert!(prompt.contains("Project: \"AI Study Buddy\""));
        assert!(prompt.contains("Roles Needed: Frontend Developer, Backend Developer, Designer."));
        assert!(prompt.contains("- Frontend Developer (6 hrs/day)"));
        assert!(!prompt.contains("No members."));
    }

    #[test]
    fn test_prompt_marks_empty_team() {
        let prompt = build_prompt(&idea(), &EffectiveTeam::default());
        assert!(prompt.contains("No members."));
    }

    #[tokio::test]
    async fn test_fenced_answer_is_decoded() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.push_answer("```json\n{\"riskLevel\": \"HIGH\", \"reason\": \"No backend\"}\n```");

        let verdict = synthesizer(oracle)
            .synthesize(&idea(), &EffectiveTeam::default())
            .await
            .unwrap();
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert_eq!(verdict.reason, "No backend");
        assert!((70..=90).contains(&verdict.similar_teams));
        assert_eq!(verdict.common_pitfall, "Missing Critical Role");
    }

    #[tokio::test]
    async fn test_prose_answer_is_a_parse_error() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.push_answer("The team looks fine to me.");

        let err = synthesizer(oracle)
            .synthesize(&idea(), &EffectiveTeam::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TeamUpError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unknown_level_is_a_parse_error() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.push_answer("{\"riskLevel\": \"SEVERE\", \"reason\": \"x\"}");

        let err = synthesizer(oracle)
            .synthesize(&idea(), &EffectiveTeam::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TeamUpError::Parse(_)));
    }

    #[tokio::test]
    async fn test_oracle_failure_passes_through() {
        let oracle = Arc::new(ScriptedOracle::new());
        oracle.push_failure(TeamUpError::Oracle("HTTP 404".into()));

        let err = synthesizer(oracle)
            .synthesize(&idea(), &EffectiveTeam::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TeamUpError::Oracle(_)));
    }
}
