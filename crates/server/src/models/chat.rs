//! Chat session and message records.
//!
//! A chat session is a conversation between a user and the assistant; each
//! message is one exchange in that conversation. `instance_name` scopes both
//! to a tenant, so several companies can share one deployment without seeing
//! each other's conversations.

use serde::Serialize;
use serde_json::json;

use salto_core::{DocumentId, MessageRole};

use crate::db::{Document, StoreError, StoredDocument};

use super::{get_i64, get_str, now_millis};

/// Title given to a session before its first user message renames it.
pub const DEFAULT_SESSION_TITLE: &str = "New Salto Chat";

/// Tenant used when a document carries no `instance_name`.
pub const DEFAULT_INSTANCE_NAME: &str = "Default Instance";

/// A conversation thread owned by one tenant.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    /// Assigned by the store on creation; `None` until then.
    pub id: Option<DocumentId>,
    pub title: String,
    /// Milliseconds since epoch.
    pub created_at: i64,
    /// Milliseconds since epoch, bumped on every appended message.
    pub last_message_at: i64,
    pub instance_name: String,
}

impl ChatSession {
    /// A fresh, empty session for a tenant: default title, both timestamps
    /// set to now.
    #[must_use]
    pub fn new(instance_name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: None,
            title: DEFAULT_SESSION_TITLE.to_string(),
            created_at: now,
            last_message_at: now,
            instance_name: instance_name.into(),
        }
    }

    /// Decode a stored document; missing fields fall back to the defaults.
    #[must_use]
    pub fn from_document(doc: &StoredDocument) -> Self {
        let now = now_millis();
        Self {
            id: Some(doc.id),
            title: get_str(&doc.fields, "title", DEFAULT_SESSION_TITLE),
            created_at: get_i64(&doc.fields, "created_at", now),
            last_message_at: get_i64(&doc.fields, "last_message_at", now),
            instance_name: get_str(&doc.fields, "instance_name", DEFAULT_INSTANCE_NAME),
        }
    }

    /// Encode every field except the identifier, which the store carries as
    /// the primary key.
    #[must_use]
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("title".to_string(), json!(self.title));
        doc.insert("created_at".to_string(), json!(self.created_at));
        doc.insert("last_message_at".to_string(), json!(self.last_message_at));
        doc.insert("instance_name".to_string(), json!(self.instance_name));
        doc
    }
}

/// One exchange in a conversation. Immutable once stored.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Option<DocumentId>,
    /// Owning session. A reference by convention only; the store does not
    /// enforce it.
    pub chat_id: DocumentId,
    pub role: MessageRole,
    pub content: String,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    pub instance_name: String,
}

impl Message {
    /// A new message stamped with the current time.
    #[must_use]
    pub fn new(
        chat_id: DocumentId,
        role: MessageRole,
        content: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            chat_id,
            role,
            content: content.into(),
            timestamp: now_millis(),
            instance_name: instance_name.into(),
        }
    }

    /// Decode a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DataCorruption`] when the stored `chat_id` is
    /// not a valid key or the stored `role` falls outside the closed set.
    pub fn from_document(doc: &StoredDocument) -> Result<Self, StoreError> {
        let chat_id = doc
            .fields
            .get("chat_id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| StoreError::DataCorruption("message without chat_id".to_string()))?;
        let chat_id = DocumentId::parse(chat_id)
            .map_err(|err| StoreError::DataCorruption(err.to_string()))?;

        let role = get_str(&doc.fields, "role", "");
        let role = MessageRole::try_from(role.as_str())
            .map_err(|err| StoreError::DataCorruption(err.to_string()))?;

        Ok(Self {
            id: Some(doc.id),
            chat_id,
            role,
            content: get_str(&doc.fields, "content", ""),
            timestamp: get_i64(&doc.fields, "timestamp", now_millis()),
            instance_name: get_str(&doc.fields, "instance_name", DEFAULT_INSTANCE_NAME),
        })
    }

    /// Encode every field except the identifier.
    #[must_use]
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("chat_id".to_string(), json!(self.chat_id.to_string()));
        doc.insert("role".to_string(), json!(self.role.as_str()));
        doc.insert("content".to_string(), json!(self.content));
        doc.insert("timestamp".to_string(), json!(self.timestamp));
        doc.insert("instance_name".to_string(), json!(self.instance_name));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_uses_defaults() {
        let session = ChatSession::new("Acme");
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);
        assert_eq!(session.instance_name, "Acme");
        assert_eq!(session.created_at, session.last_message_at);
        assert!(session.id.is_none());
    }

    #[test]
    fn session_document_round_trip() {
        let session = ChatSession {
            id: None,
            title: "Quarterly numbers".to_string(),
            created_at: 1_700_000_000_000,
            last_message_at: 1_700_000_060_000,
            instance_name: "Acme".to_string(),
        };

        let stored = StoredDocument {
            id: DocumentId::generate(),
            fields: session.clone().into_document(),
        };
        let decoded = ChatSession::from_document(&stored);

        assert_eq!(decoded.title, session.title);
        assert_eq!(decoded.created_at, session.created_at);
        assert_eq!(decoded.last_message_at, session.last_message_at);
        assert_eq!(decoded.instance_name, session.instance_name);
        assert_eq!(decoded.id, Some(stored.id));
    }

    #[test]
    fn session_decoding_defaults_missing_fields() {
        let stored = StoredDocument {
            id: DocumentId::generate(),
            fields: Document::new(),
        };
        let decoded = ChatSession::from_document(&stored);
        assert_eq!(decoded.title, DEFAULT_SESSION_TITLE);
        assert_eq!(decoded.instance_name, DEFAULT_INSTANCE_NAME);
    }

    #[test]
    fn message_document_round_trip() {
        let chat_id = DocumentId::generate();
        let message = Message::new(chat_id, MessageRole::User, "Hello", "Acme");

        let stored = StoredDocument {
            id: DocumentId::generate(),
            fields: message.clone().into_document(),
        };
        let decoded = Message::from_document(&stored).expect("decode");

        assert_eq!(decoded.chat_id, chat_id);
        assert_eq!(decoded.role, MessageRole::User);
        assert_eq!(decoded.content, "Hello");
        assert_eq!(decoded.timestamp, message.timestamp);
    }

    #[test]
    fn message_decoding_rejects_unknown_role() {
        let mut fields = Message::new(DocumentId::generate(), MessageRole::User, "x", "Acme")
            .into_document();
        fields.insert("role".to_string(), serde_json::json!("system"));

        let stored = StoredDocument {
            id: DocumentId::generate(),
            fields,
        };
        assert!(matches!(
            Message::from_document(&stored),
            Err(StoreError::DataCorruption(_))
        ));
    }
}
