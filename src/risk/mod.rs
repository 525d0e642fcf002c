//! Team risk assessment
//!
//! The pipeline turns an idea's required roles and its effective team into a
//! cached verdict:
//!
//! ```text
//! compose team -> override? -> quota -> oracle synthesis -> store verdict
//! ```
//!
//! A stored verdict is served as-is until a refresh is requested. Scenario
//! projections are computed on demand and never stored.

pub mod evidence;
pub mod overrides;
pub mod pipeline;
pub mod quota;
pub mod scenario;
pub mod synthesizer;
pub mod team;
pub mod verdict;

pub use overrides::{DemoShowcaseOverride, NoOverride, VerdictOverride};
pub use pipeline::{Assessment, RiskPipeline, VerdictSource};
pub use quota::{QuotaGuard, QuotaTicket, DEFAULT_DAILY_QUOTA};
pub use scenario::{Remediation, ScenarioProjector, ScenarioSession};
pub use synthesizer::VerdictSynthesizer;
pub use team::{EffectiveTeam, TeamAssembler};
pub use verdict::{Evidence, RiskLevel, RiskVerdict};
