//! Persistence for TeamUp
//!
//! `TeamStore` is the boundary the risk subsystem talks to. MongoDB backs it
//! in production; the in-memory store serves dev mode and tests.

pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod schemas;
pub mod store;

pub use memory::MemoryTeamStore;
pub use mongo::{MongoClient, MongoCollection};
pub use mongo_store::MongoTeamStore;
pub use store::{SharedStore, TeamStore};
