//! Daily oracle quota
//!
//! One budget is shared by every operation that consults the oracle. A call
//! is charged before the oracle is contacted, so a failed or unparseable
//! answer still counts. Usage is never under-counted.

use chrono::{DateTime, Utc};

use crate::db::SharedStore;
use crate::logging::{EventType, UsageLogger};
use crate::types::{Result, TeamUpError};

/// Oracle calls allowed per UTC day
pub const DEFAULT_DAILY_QUOTA: i64 = 60;

/// Counter key for the day containing `at`
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Counter key for the current UTC day
pub fn today() -> String {
    day_key(Utc::now())
}

/// Proof that one call was charged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaTicket {
    pub day: String,
    /// Calls charged on `day`, this one included
    pub api_calls: i64,
}

pub struct QuotaGuard {
    store: SharedStore,
    ceiling: i64,
    usage: UsageLogger,
}

impl QuotaGuard {
    pub fn new(store: SharedStore, ceiling: i64, usage: UsageLogger) -> Self {
        Self {
            store,
            ceiling,
            usage,
        }
    }

    /// Charge one call against `day`, or fail with `QuotaExceeded` leaving
    /// the counter untouched.
    pub async fn admit(&self, day: &str, operation: &str) -> Result<QuotaTicket> {
        match self.store.try_charge_usage(day, self.ceiling).await? {
            Some(api_calls) => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::QuotaAdmitted)
                            .with_operation(operation)
                            .with_api_calls(api_calls),
                    )
                    .await;
                Ok(QuotaTicket {
                    day: day.to_string(),
                    api_calls,
                })
            }
            None => {
                self.usage
                    .log(
                        self.usage
                            .event(EventType::QuotaRejected)
                            .with_operation(operation)
                            .with_api_calls(self.ceiling),
                    )
                    .await;
                Err(TeamUpError::QuotaExceeded {
                    ceiling: self.ceiling,
                })
            }
        }
    }

    /// Charge one call against the current UTC day
    pub async fn admit_today(&self, operation: &str) -> Result<QuotaTicket> {
        self.admit(&today(), operation).await
    }

    /// Calls charged so far today
    pub async fn usage_today(&self) -> Result<i64> {
        self.store.usage_on(&today()).await
    }

    pub fn ceiling(&self) -> i64 {
        self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryTeamStore, TeamStore};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn guard(store: Arc<MemoryTeamStore>) -> QuotaGuard {
        QuotaGuard::new(store, DEFAULT_DAILY_QUOTA, UsageLogger::new("test".into()))
    }

    #[test]
    fn test_day_key_is_utc_date() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 59).unwrap();
        assert_eq!(day_key(at), "2026-10-19");
    }

    #[tokio::test]
    async fn test_last_call_of_the_day_is_admitted() {
        let store = Arc::new(MemoryTeamStore::new());
        store.set_usage("2026-10-19", 59);

        let ticket = guard(Arc::clone(&store)).admit("2026-10-19", "risk").await.unwrap();
        assert_eq!(ticket.api_calls, 60);
        assert_eq!(store.usage_on("2026-10-19").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_exhausted_quota_fails_without_drift() {
        let store = Arc::new(MemoryTeamStore::new());
        store.set_usage("2026-10-19", 60);
        let guard = guard(Arc::clone(&store));

        for _ in 0..3 {
            let err = guard.admit("2026-10-19", "clarity").await.unwrap_err();
            assert!(matches!(err, TeamUpError::QuotaExceeded { ceiling: 60 }));
        }
        assert_eq!(store.usage_on("2026-10-19").await.unwrap(), 60);
    }

    #[tokio::test]
    async fn test_first_call_creates_the_day() {
        let store = Arc::new(MemoryTeamStore::new());
        let ticket = guard(Arc::clone(&store)).admit("2026-10-20", "risk").await.unwrap();
        assert_eq!(ticket.api_calls, 1);
    }
}
