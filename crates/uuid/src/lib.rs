//! Identifier utilities.
//!
//! MEDICORE uses two kinds of identifier:
//!
//! - **Opaque identity ids** ([`OpaqueId`]) for accounts created at signup. These use a
//!   *canonical* UUID representation: **32 lowercase hexadecimal characters** (no hyphens),
//!   the same value you get from `Uuid::new_v4().simple().to_string()`.
//! - **Record ids** ([`RecordId`]) for rows in an entity collection. These are small positive
//!   integers handed out by an [`IdSequence`] owned by the collection.
//!
//! ## Why a sequence and not the clock
//! Deriving a record id from the current time collides when two records are created within the
//! same clock tick. An [`IdSequence`] starts after the largest seeded id and only ever moves
//! forward, so ids are strictly increasing and never reused within a collection.

mod service;

// Re-export public types
pub use service::{IdSequence, OpaqueId, RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
