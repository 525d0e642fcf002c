//! Showcase scenario
//!
//! Installs the "AI Study Buddy" idea with a team that is missing its
//! backend developer: Sarah (creator, frontend) plus accepted Alex (design)
//! and Sam (product), with Mike (backend) still pending. A High verdict is
//! cached so the first report is served without the oracle. Accepting Mike
//! completes the team and a refresh then reports Low.

use bson::oid::ObjectId;
use tracing::info;

use crate::db::schemas::{ApplicationDoc, ApplicationStatus, IdeaDoc, MemberDoc, RoleSlot};
use crate::db::TeamStore;
use crate::risk::evidence;
use crate::risk::{Evidence, RiskLevel, RiskVerdict};
use crate::types::Result;

/// Ids created by `seed_demo`
#[derive(Debug, Clone)]
pub struct SeedSummary {
    pub idea_id: ObjectId,
    pub sarah: ObjectId,
    pub alex: ObjectId,
    pub sam: ObjectId,
    pub mike: ObjectId,
    /// Mike's pending application
    pub pending_application: ObjectId,
}

fn cached_verdict() -> RiskVerdict {
    let policy = evidence::policy(RiskLevel::High);
    RiskVerdict::from_parts(
        RiskLevel::High,
        "Critical Gap: No Backend Developer found. Frontend and Design roles are filled, but without a Backend Developer, the 'Gemini API' feature cannot be implemented.",
        Evidence {
            similar_teams: 87,
            failure_rate: policy.failure_rate.to_string(),
            common_pitfall: policy.common_pitfall.to_string(),
            success_projection: policy.success_projection.to_string(),
        },
    )
}

/// Insert the showcase members, idea and applications into `store`
pub async fn seed_demo(store: &dyn TeamStore) -> Result<SeedSummary> {
    let sarah = store
        .insert_member(
            MemberDoc::new("Sarah Jenkins", "sarah@demo.com", "Frontend Developer", 25)
                .with_skills(&["React", "Figma", "CSS"]),
        )
        .await?;
    let alex = store
        .insert_member(
            MemberDoc::new("Alex Designer", "alex@test.com", "Designer", 10)
                .with_skills(&["Figma", "Photoshop"]),
        )
        .await?;
    let sam = store
        .insert_member(
            MemberDoc::new("Sam Researcher", "sam@test.com", "Product Manager", 5)
                .with_skills(&["Research", "User Testing"]),
        )
        .await?;
    let mike = store
        .insert_member(
            MemberDoc::new("Mike Builder", "mike@test.com", "Backend Developer", 30)
                .with_skills(&["Node.js", "MongoDB", "Python"]),
        )
        .await?;
    info!("Members created: Sarah, Alex, Sam, Mike");

    let mut idea = IdeaDoc::new(
        "AI Study Buddy".to_string(),
        "Students struggle to organize lecture notes into study guides. Current tools are manual and slow.".to_string(),
        "A React-based web app that uses Gemini API to turn PDF notes into quizzes automatically.".to_string(),
        vec![
            RoleSlot::new("Frontend Developer"),
            RoleSlot::new("Backend Developer"),
            RoleSlot::new("Designer"),
        ],
        "Sarah Jenkins".to_string(),
    );
    idea.clarity_score = 92;
    idea.tags = vec!["Education".into(), "AI".into(), "Student Tool".into()];
    let idea_id = store.insert_idea(idea).await?;
    info!(idea_id = %idea_id, "Idea created: AI Study Buddy");

    store
        .insert_application(
            ApplicationDoc::new(idea_id, alex, "Alex Designer", "Designer")
                .with_message("I can make the UI look great!")
                .with_status(ApplicationStatus::Accepted),
        )
        .await?;
    store
        .insert_application(
            ApplicationDoc::new(idea_id, sam, "Sam Researcher", "Product Manager")
                .with_message("I'll handle the roadmap.")
                .with_status(ApplicationStatus::Accepted),
        )
        .await?;
    let pending_application = store
        .insert_application(
            ApplicationDoc::new(idea_id, mike, "Mike Builder", "Backend Developer")
                .with_message("I have 3 years of Node.js experience. I can build the API."),
        )
        .await?;
    info!("Applications created: 2 accepted, 1 pending");

    store.set_risk_verdict(&idea_id, &cached_verdict()).await?;
    info!("High risk verdict cached");

    Ok(SeedSummary {
        idea_id,
        sarah,
        alex,
        sam,
        mike,
        pending_application,
    })
}
