//! Metadata store and audit log
//!
//! The metadata store is the single source of truth for assets and the only
//! component permitted to mutate usage counters. [`AssetStore`] abstracts the
//! backing database; [`PgAssetStore`] is the PostgreSQL implementation and
//! [`MemoryAssetStore`] backs tests and local experiments without a server.

pub mod audit;
pub mod memory;
pub mod postgres;
pub mod store;

pub use audit::{AuditEvent, AuditSink, PgAuditSink};
pub use memory::{MemoryAssetStore, RecordingAuditSink};
pub use postgres::PgAssetStore;
pub use store::AssetStore;
