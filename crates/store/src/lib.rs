//! Reference store for file digests.
//!
//! The store is the single source of truth for what the system knows about a
//! file: every record carries up to four digests (MD5, SHA1, SHA256, SHA512),
//! the size and path it was first seen with, and a status tier.
//!
//! # Consistency
//! All coordination between concurrent writers is delegated to SQLite:
//! - Each digest column carries its own `UNIQUE` constraint, and inserts use
//!   `ON CONFLICT DO NOTHING`, so racing inserts of the same file collapse
//!   into one record no matter which worker wins.
//! - Reconciliation only writes a digest slot guarded by `IS NULL`, so a
//!   populated slot is never overwritten ("first writer wins" per slot).
//! - Nothing in this crate demotes a status or deletes a record.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{NewRecord, ReferenceRecord};
pub use crate::repo::Repository;
