//! Logging infrastructure for TeamUp
//!
//! Application logs go through `tracing`. Oracle accounting events are also
//! appended as JSONL so daily usage can be audited offline.

pub mod usage;

pub use usage::{EventType, UsageEvent, UsageLogger};
