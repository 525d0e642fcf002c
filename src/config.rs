//! Configuration for TeamUp
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::oracle::gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::risk::overrides::{DEMO_MIN_TEAM_SIZE, DEMO_TITLE};

/// TeamUp - team formation with AI failure-risk audits
#[derive(Parser, Debug, Clone)]
#[command(name = "teamup")]
#[command(about = "Team formation service with AI-assisted failure risk audits")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store fallback, no API key needed)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "teamup")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Oracle calls allowed per UTC day, shared by clarity and risk checks
    #[arg(long, env = "DAILY_QUOTA", default_value = "60")]
    pub daily_quota: i64,

    /// Serve the fixed verdict for the showcase project
    #[arg(long, env = "DEMO_OVERRIDE", default_value = "true", action = clap::ArgAction::Set)]
    pub demo_override: bool,

    /// Title of the showcase project
    #[arg(long, env = "DEMO_TITLE", default_value = DEMO_TITLE)]
    pub demo_title: String,

    /// Team size at which the showcase override fires
    #[arg(long, env = "DEMO_MIN_TEAM", default_value_t = DEMO_MIN_TEAM_SIZE)]
    pub demo_min_team: usize,

    /// Install the showcase scenario at startup when the store holds no ideas
    #[arg(long, env = "SEED_DEMO", default_value = "false")]
    pub seed_demo: bool,

    /// Append oracle usage events to this JSONL file
    #[arg(long, env = "USAGE_LOG_PATH")]
    pub usage_log: Option<PathBuf>,

    /// Oracle configuration
    #[command(flatten)]
    pub oracle: OracleArgs,
}

/// Text-generation oracle configuration
#[derive(Parser, Debug, Clone)]
pub struct OracleArgs {
    /// Google Generative AI key (required outside dev mode)
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Models endpoint base URL
    #[arg(long, env = "ORACLE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub oracle_base_url: String,

    /// Bound on a single oracle call in milliseconds
    #[arg(long, env = "ORACLE_TIMEOUT_MS", default_value = "30000")]
    pub oracle_timeout_ms: u64,
}

impl OracleArgs {
    /// Gemini settings, if a key is configured
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        let key = self.gemini_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(GeminiConfig {
            api_key: key.to_string(),
            model: self.gemini_model.clone(),
            base_url: self.oracle_base_url.clone(),
            timeout: Duration::from_millis(self.oracle_timeout_ms),
        })
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.oracle.gemini_config().is_none() {
            return Err("GEMINI_API_KEY is required in production mode".to_string());
        }

        if self.daily_quota <= 0 {
            return Err("DAILY_QUOTA must be greater than zero".to_string());
        }

        if self.oracle.oracle_timeout_ms == 0 {
            return Err("ORACLE_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.demo_override && self.demo_title.trim().is_empty() {
            return Err("DEMO_TITLE must not be empty when DEMO_OVERRIDE is on".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["teamup"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 5000);
        assert_eq!(args.daily_quota, 60);
        assert_eq!(args.mongodb_db, "teamup");
        assert!(args.demo_override);
        assert_eq!(args.demo_title, "AI Study Buddy");
        assert_eq!(args.demo_min_team, 4);
        assert_eq!(args.oracle.oracle_timeout_ms, 30000);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_api_key() {
        let args = parse(&["--gemini-api-key", "  "]);
        assert!(args.validate().is_err());

        let args = parse(&["--gemini-api-key", "k"]);
        assert!(args.validate().is_ok());
        let gemini = args.oracle.gemini_config().unwrap();
        assert_eq!(gemini.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_override_can_be_disabled() {
        let args = parse(&["--dev-mode", "--demo-override", "false"]);
        assert!(!args.demo_override);
    }

    #[test]
    fn test_quota_must_be_positive() {
        let args = parse(&["--dev-mode", "--daily-quota", "0"]);
        assert!(args.validate().is_err());
    }
}
