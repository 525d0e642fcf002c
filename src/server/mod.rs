//! HTTP server for TeamUp

pub mod http;

pub use http::{run, AppState, BoxBody};
