//! TeamUp - team formation with AI failure-risk audits
//!
//! Members apply to project ideas; an idea's creator accepts or rejects them.
//! For any idea, a text-generation oracle is asked whether the team that has
//! formed covers the roles the idea needs. The answer becomes a cached risk
//! verdict with a synthetic evidence bundle.
//!
//! ## Modules
//!
//! - **risk**: quota guard, team assembly, overrides, synthesis, caching and
//!   scenario projection
//! - **oracle**: the text-generation boundary (Gemini, or scripted answers)
//! - **db**: the store boundary (MongoDB, or in-memory)
//! - **services**: one entry point per inbound operation
//! - **server** / **routes**: the HTTP surface

pub mod config;
pub mod db;
pub mod logging;
pub mod oracle;
pub mod risk;
pub mod routes;
pub mod seed;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use services::TeamUpService;
pub use types::{Result, TeamUpError};
