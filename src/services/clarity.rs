//! Clarity scoring for new ideas
//!
//! Shares the oracle and the daily quota with risk synthesis. The caller
//! charges the quota; this module only prompts and decodes.

use serde::Deserialize;
use std::time::Instant;

use crate::logging::{EventType, UsageLogger};
use crate::oracle::{decode_json, SharedOracle};
use crate::types::Result;

#[derive(Debug, Deserialize)]
struct ClarityAnswer {
    score: f64,
    feedback: String,
}

/// Decoded clarity answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClarityReport {
    /// 0..=100
    pub score: u8,
    pub feedback: String,
}

pub fn build_prompt(title: &str, problem_statement: &str, expected_outcome: &str) -> String {
    format!(
        "Analyze this hackathon idea. Title: {}, Problem: {}, Goal: {}.\n\
         Rate clarity (0-100) and give 1 short sentence feedback.\n\
         Return strictly JSON: {{\"score\": 85, \"feedback\": \"Good detail but specify tech stack.\"}}",
        title, problem_statement, expected_outcome
    )
}

pub struct ClarityAnalyzer {
    oracle: SharedOracle,
    usage: UsageLogger,
}

impl ClarityAnalyzer {
    pub fn new(oracle: SharedOracle, usage: UsageLogger) -> Self {
        Self { oracle, usage }
    }

    pub async fn analyze(
        &self,
        title: &str,
        problem_statement: &str,
        expected_outcome: &str,
    ) -> Result<ClarityReport> {
        let prompt = build_prompt(title, problem_statement, expected_outcome);
        let started = Instant::now();

        let raw = match self.oracle.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::OracleFailed)
                            .with_operation("clarity")
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
                    .with_operation("clarity")
                    .with_duration(started.elapsed().as_millis() as u64),
            )
            .await;

        let answer: ClarityAnswer = match decode_json(&raw) {
            Ok(answer) => answer,
            Err(e) => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::ParseFailed)
                            .with_operation("clarity")
                            .with_detail(e.to_string()),
                    )
                    .await;
                return Err(e);
            }
        };

        Ok(ClarityReport {
            score: clamp_score(answer.score),
            feedback: answer.feedback,
        })
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
