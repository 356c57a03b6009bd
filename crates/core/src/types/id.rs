//! The document-store primary-key type.
//!
//! Identifiers are opaque strings at the API boundary but round-trip through
//! the store's native key type (UUID). Callers validate the string form
//! before it reaches the service layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a string is not a valid document identifier.
#[derive(Debug, thiserror::Error)]
#[error("invalid document id: {0}")]
pub struct InvalidDocumentId(String);

/// Primary key of a stored document.
///
/// Serializes as its canonical string form, matching the JSON representation
/// exposed at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse an identifier from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDocumentId`] if the string is not a valid UUID.
    pub fn parse(value: &str) -> Result<Self, InvalidDocumentId> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| InvalidDocumentId(value.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<DocumentId> for Uuid {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        let id = DocumentId::generate();
        let parsed = DocumentId::parse(&id.to_string()).expect("parse own string form");
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(DocumentId::parse("not-a-uuid").is_err());
        assert!(DocumentId::parse("").is_err());
        // ObjectId-style hex strings are not valid keys for this store
        assert!(DocumentId::parse("507f1f77bcf86cd799439011").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DocumentId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }
}
