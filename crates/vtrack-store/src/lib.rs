//! Record storage for vtrack.
//!
//! The tracker persists projects, sequences, versionables, version types and
//! versions through the [`VersionStore`] trait. The store is the authority on
//! uniqueness: a colliding write fails with
//! [`StoreError::UniquenessViolation`] and is never retried here.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`filter`] — [`VersionFilter`] for version queries
//! - [`traits`] — The [`VersionStore`] trait and [`DeleteReport`]
//! - [`memory`] — In-memory [`InMemoryStore`]

pub mod error;
pub mod filter;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filter::VersionFilter;
pub use memory::InMemoryStore;
pub use traits::{DeleteReport, VersionStore};
