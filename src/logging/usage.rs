//! Oracle usage logging
//!
//! Every quota decision and oracle outcome becomes a `UsageEvent`. Events are
//! mirrored to `tracing` and, when a file is configured, appended as JSONL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Usage event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A call was charged against the daily quota
    QuotaAdmitted,
    /// The daily quota was already spent
    QuotaRejected,
    /// The oracle answered
    OracleCall,
    /// The oracle could not be reached or errored
    OracleFailed,
    /// The oracle answered in an unexpected shape
    ParseFailed,
    /// A verdict override replaced synthesis
    OverrideFired,
}

/// Usage event for auditing oracle consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Instance that handled the request
    pub node_id: String,
    /// Operation that consumed the oracle ("clarity", "risk")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_id: Option<String>,
    /// Calls charged today after this event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_calls: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl UsageEvent {
    pub fn new(event_type: EventType, node_id: String) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            node_id,
            operation: None,
            idea_id: None,
            api_calls: None,
            duration_ms: None,
            detail: None,
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_idea(mut self, idea_id: String) -> Self {
        self.idea_id = Some(idea_id);
        self
    }

    pub fn with_api_calls(mut self, api_calls: i64) -> Self {
        self.api_calls = Some(api_calls);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Convert to JSONL line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Usage logger that mirrors events to tracing and an optional JSONL file
#[derive(Clone)]
pub struct UsageLogger {
    inner: Arc<Mutex<UsageLoggerInner>>,
    node_id: String,
}

struct UsageLoggerInner {
    writer: Option<BufWriter<File>>,
}

impl UsageLogger {
    pub fn new(node_id: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UsageLoggerInner {
                writer: None,
            })),
            node_id,
        }
    }

    /// Initialize file logging to the specified path
    pub async fn init_file(&self, path: PathBuf) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let writer = BufWriter::new(file);

        let mut inner = self.inner.lock().await;
        inner.writer = Some(writer);

        info!("Usage logging initialized to {}", path.display());
        Ok(())
    }

    /// Log a usage event
    pub async fn log(&self, event: UsageEvent) {
        match event.event_type {
            EventType::QuotaRejected | EventType::OracleFailed | EventType::ParseFailed => warn!(
                event = ?event.event_type,
                operation = ?event.operation,
                idea_id = ?event.idea_id,
                detail = ?event.detail,
                "oracle usage"
            ),
            _ => info!(
                event = ?event.event_type,
                operation = ?event.operation,
                idea_id = ?event.idea_id,
                api_calls = ?event.api_calls,
                duration_ms = ?event.duration_ms,
                "oracle usage"
            ),
        }

        let jsonl = match event.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize usage event: {}", e);
                return;
            }
        };

        let mut inner = self.inner.lock().await;

        if let Some(ref mut writer) = inner.writer {
            if let Err(e) = writeln!(writer, "{}", jsonl) {
                error!("Failed to write usage event: {}", e);
            }
            if let Err(e) = writer.flush() {
                error!("Failed to flush usage log: {}", e);
            }
        }
    }

    /// Start an event stamped with this node
    pub fn event(&self, event_type: EventType) -> UsageEvent {
        UsageEvent::new(event_type, self.node_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = UsageEvent::new(EventType::QuotaAdmitted, "node-1".to_string())
            .with_operation("risk")
            .with_api_calls(12);

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("quota_admitted"));
        assert!(jsonl.contains("\"api_calls\":12"));
        assert!(!jsonl.contains("idea_id"));
    }

    #[test]
    fn test_parse_failure_event() {
        let event = UsageEvent::new(EventType::ParseFailed, "node-1".to_string())
            .with_detail("expected value at line 1");

        let jsonl = event.to_jsonl().unwrap();
        assert!(jsonl.contains("parse_failed"));
        assert!(jsonl.contains("expected value"));
    }

    #[tokio::test]
    async fn test_file_logging_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");

        let logger = UsageLogger::new("node-1".to_string());
        logger.init_file(path.clone()).await.unwrap();
        logger.log(logger.event(EventType::OracleCall).with_duration(40)).await;
        logger.log(logger.event(EventType::QuotaRejected)).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("oracle_call"));
        assert!(lines[1].contains("quota_rejected"));
    }
}
