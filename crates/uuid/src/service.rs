//! Internal implementation of identifier types.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical opaque identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to render in canonical form.
///
/// # Construction
/// - [`OpaqueId::new`] generates a fresh random identifier (used at signup).
/// - [`OpaqueId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueId(Uuid);

impl Default for OpaqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl OpaqueId {
    /// Generates a new random identifier (RFC 4122 version 4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are **not** normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid id '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for OpaqueId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpaqueId::parse(s)
    }
}

/// Identifier of a single row in an entity collection.
///
/// Record ids are positive; zero is never issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct RecordId(u32);

impl RecordId {
    /// Wraps a raw id.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] for zero.
    pub fn new(raw: u32) -> UuidResult<Self> {
        if raw == 0 {
            return Err(UuidError::InvalidInput("record id must be positive".into()));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for RecordId {
    type Error = UuidError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        RecordId::new(raw)
    }
}

impl From<RecordId> for u32 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u32>()
            .map_err(|_| UuidError::InvalidInput(format!("invalid record id: '{}'", s)))?;
        RecordId::new(raw)
    }
}

/// Monotonic allocator of [`RecordId`]s for one collection.
///
/// The sequence starts after the largest id it has observed and never moves backwards, so an id
/// is handed out at most once for the lifetime of the sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdSequence {
    next: u32,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    /// Creates a sequence whose first id is one past the largest of `existing`.
    ///
    /// An empty iterator starts the sequence at 1.
    pub fn starting_after(existing: impl IntoIterator<Item = RecordId>) -> Self {
        let mut sequence = Self::default();
        for id in existing {
            sequence.observe(id);
        }
        sequence
    }

    /// Returns the id the next call to [`IdSequence::allocate`] will hand out.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] once the `u32` id space is exhausted.
    pub fn peek(&self) -> UuidResult<RecordId> {
        if self.next == 0 {
            return Err(UuidError::InvalidInput("record id space exhausted".into()));
        }
        Ok(RecordId(self.next))
    }

    /// Hands out the next id and advances the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] once the `u32` id space is exhausted.
    pub fn allocate(&mut self) -> UuidResult<RecordId> {
        let id = self.peek()?;
        // Wrapping to zero marks exhaustion; zero is never a valid id.
        self.next = self.next.wrapping_add(1);
        Ok(id)
    }

    /// Records that `id` is in use, moving the sequence past it if needed.
    pub fn observe(&mut self, id: RecordId) {
        if self.next != 0 && id.0 >= self.next {
            self.next = id.0.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = OpaqueId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(OpaqueId::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_rejects_hyphenated_id() {
        let result = OpaqueId::parse("550e8400-e29b-41d4-a716-446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_id() {
        assert!(OpaqueId::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn test_round_trip_new_to_string_to_parse() {
        let original = OpaqueId::new();
        let parsed: OpaqueId = original.to_string().parse().unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn test_record_id_rejects_zero_and_garbage() {
        assert!(RecordId::new(0).is_err());
        assert!("abc".parse::<RecordId>().is_err());
        assert!("-3".parse::<RecordId>().is_err());
        assert_eq!(" 201 ".parse::<RecordId>().unwrap().get(), 201);
    }

    #[test]
    fn test_sequence_starts_after_largest_seed_id() {
        let seeded = [301, 303, 302].map(|raw| RecordId::new(raw).unwrap());
        let mut sequence = IdSequence::starting_after(seeded);

        assert_eq!(sequence.peek().unwrap().get(), 304);
        assert_eq!(sequence.allocate().unwrap().get(), 304);
        assert_eq!(sequence.allocate().unwrap().get(), 305);
    }

    #[test]
    fn test_sequence_of_empty_collection_starts_at_one() {
        let mut sequence = IdSequence::starting_after(std::iter::empty());
        assert_eq!(sequence.allocate().unwrap().get(), 1);
    }

    #[test]
    fn test_sequence_never_moves_backwards() {
        let mut sequence = IdSequence::starting_after([RecordId::new(10).unwrap()]);
        sequence.observe(RecordId::new(3).unwrap());

        assert_eq!(sequence.allocate().unwrap().get(), 11);
    }

    #[test]
    fn test_sequence_reports_exhaustion() {
        let mut sequence = IdSequence::starting_after([RecordId::new(u32::MAX).unwrap()]);

        assert!(sequence.allocate().is_err());
        assert!(sequence.peek().is_err());
    }

    #[test]
    fn test_record_id_serde_rejects_zero() {
        assert!(serde_json::from_str::<RecordId>("0").is_err());
        let id: RecordId = serde_json::from_str("501").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "501");
    }
}
