//! Shared types for TeamUp

pub mod error;

pub use error::{Result, TeamUpError};
