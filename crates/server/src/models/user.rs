//! The login user record.
//!
//! Login is a collaborator concern; the application only ever decodes users
//! looked up by id, it never creates or mutates them.

use serde::Serialize;

use salto_core::DocumentId;

use crate::db::StoredDocument;

use super::{DEFAULT_INSTANCE_NAME, get_str};

/// A stored user, decode-only.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: DocumentId,
    pub username: String,
    pub email: String,
    pub instance_name: String,
}

impl User {
    /// Decode a stored user document.
    #[must_use]
    pub fn from_document(doc: &StoredDocument) -> Self {
        Self {
            id: doc.id,
            username: get_str(&doc.fields, "username", ""),
            email: get_str(&doc.fields, "email", ""),
            instance_name: get_str(&doc.fields, "instance_name", DEFAULT_INSTANCE_NAME),
        }
    }
}
