//! Database schemas for TeamUp
//!
//! Defines MongoDB document structures for ideas, members, applications and
//! the daily oracle usage counter.

mod application;
mod idea;
mod member;
mod metadata;
mod usage;

pub use application::{ApplicationDoc, ApplicationStatus, APPLICATION_COLLECTION};
pub use idea::{IdeaDoc, RoleSlot, IDEA_COLLECTION};
pub use member::{MemberDoc, MEMBER_COLLECTION};
pub use metadata::Metadata;
pub use usage::{UsageDoc, USAGE_COLLECTION};
