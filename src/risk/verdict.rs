//! Risk verdict types
//!
//! A verdict is a risk tier, a reason, and a synthetic evidence bundle whose
//! fields always agree with the tier. The JSON shape (camelCase) is shared by
//! the stored document, the HTTP response and the scenario projection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Parse a tier case-insensitively ("HIGH", "High", " low ")
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RiskLevel::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown risk level '{}'", raw)))
    }
}

/// Synthetic historical statistics attached to a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    pub similar_teams: u32,
    pub failure_rate: String,
    pub common_pitfall: String,
    pub success_projection: String,
}

/// Persisted output of a risk audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskVerdict {
    pub risk_level: RiskLevel,
    pub reason: String,
    pub similar_teams: u32,
    pub failure_rate: String,
    pub common_pitfall: String,
    pub success_projection: String,
    /// Only scenario projections set this; stored verdicts never do
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_simulated: bool,
}

impl RiskVerdict {
    /// Merge an oracle tier and reason with derived evidence
    pub fn from_parts(risk_level: RiskLevel, reason: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            risk_level,
            reason: reason.into(),
            similar_teams: evidence.similar_teams,
            failure_rate: evidence.failure_rate,
            common_pitfall: evidence.common_pitfall,
            success_projection: evidence.success_projection,
            is_simulated: false,
        }
    }

    pub fn is_low(&self) -> bool {
        self.risk_level == RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_parse_is_case_insensitive() {
        assert_eq!(RiskLevel::parse("HIGH"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::parse("Medium"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::parse(" low "), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::parse("CRITICAL"), None);
    }

    #[test]
    fn test_verdict_json_shape() {
        let verdict = RiskVerdict::from_parts(
            RiskLevel::High,
            "No backend developer",
            Evidence {
                similar_teams: 80,
                failure_rate: "78%".into(),
                common_pitfall: "Missing Critical Role".into(),
                success_projection: "12% chance of submission".into(),
            },
        );

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["riskLevel"], "High");
        assert_eq!(json["similarTeams"], 80);
        assert_eq!(json["failureRate"], "78%");
        assert!(json.get("isSimulated").is_none());

        let back: RiskVerdict = serde_json::from_value(json).unwrap();
        assert_eq!(back, verdict);
    }

    #[test]
    fn test_verdict_accepts_uppercase_level() {
        let json = serde_json::json!({
            "riskLevel": "MEDIUM",
            "reason": "thin availability",
            "similarTeams": 50,
            "failureRate": "42%",
            "commonPitfall": "Low Availability (<20hrs/week)",
            "successProjection": "58% chance of submission"
        });
        let verdict: RiskVerdict = serde_json::from_value(json).unwrap();
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert!(!verdict.is_simulated);
    }
}
