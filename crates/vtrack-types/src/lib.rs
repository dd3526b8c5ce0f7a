//! Foundation types for vtrack.
//!
//! This crate provides the identifiers and small value types shared by every
//! other vtrack crate. It carries no behavior beyond construction, parsing and
//! display.
//!
//! # Key Types
//!
//! - [`ProjectId`], [`SequenceId`], [`VersionableId`], [`VersionTypeId`],
//!   [`VersionId`] — UUID v7 entity identifiers
//! - [`OwnerKind`] — the closed set of entities that can own versions
//! - [`User`] — opaque creator identity passed through untouched

pub mod error;
pub mod id;
pub mod owner;
pub mod user;

pub use error::TypeError;
pub use id::{ProjectId, SequenceId, VersionId, VersionTypeId, VersionableId};
pub use owner::OwnerKind;
pub use user::User;
