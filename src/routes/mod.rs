//! HTTP routes for TeamUp

pub mod admin;
pub mod applications;
pub mod health;
pub mod ideas;
pub mod response;

pub use health::health_check;
