//! Chat service: session and message lifecycle, and query orchestration.
//!
//! A session moves through exactly one lifecycle: created empty, mutated as
//! messages are appended (title on the first user message, last-activity on
//! every message), deleted explicitly with its messages.
//!
//! The multi-step mutations here take no locks and span no transactions.
//! Each store operation is individually atomic; the documented step ordering
//! is the only guarantee, and concurrent callers get last-write-wins.

use std::sync::Arc;

use serde_json::json;

use salto_core::{DocumentId, MessageRole};

use crate::ai::{AiGateway, ConversationTurn};
use crate::db::{Collection, Document, DocumentStore, Sort, StoreError, filter};
use crate::models::{ChatSession, DEFAULT_SESSION_TITLE, Message, now_millis};
use crate::services::DataService;

/// The degraded reply substituted for a real response when the gateway call
/// fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process your query. \
     Please check the API key or try reformulating your question. - Salto";

/// How many trailing messages form the conversation history for the gateway.
const HISTORY_LIMIT: usize = 6;

/// Longest content carried into a session title verbatim.
const TITLE_MAX_CHARS: usize = 30;

/// Characters kept before the ellipsis when content is too long.
const TITLE_TRUNCATED_CHARS: usize = 27;

/// Service for managing chat sessions and messages.
pub struct ChatService {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn AiGateway>,
}

impl ChatService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<dyn AiGateway>) -> Self {
        Self { store, gateway }
    }

    /// All sessions for a tenant, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn list_sessions(&self, instance_name: &str) -> Result<Vec<ChatSession>, StoreError> {
        let docs = self
            .store
            .find_many(
                Collection::ChatSessions,
                filter(&[("instance_name", json!(instance_name))]),
                Some(Sort::descending("last_message_at")),
            )
            .await?;

        Ok(docs.iter().map(ChatSession::from_document).collect())
    }

    /// Fetch a session by id. Absent sessions are `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn get_session(
        &self,
        chat_id: DocumentId,
    ) -> Result<Option<ChatSession>, StoreError> {
        let doc = self.store.find_one(Collection::ChatSessions, chat_id).await?;
        Ok(doc.as_ref().map(ChatSession::from_document))
    }

    /// Create a new, empty session for a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn create_session(&self, instance_name: &str) -> Result<ChatSession, StoreError> {
        let mut session = ChatSession::new(instance_name);
        let id = self
            .store
            .insert_one(Collection::ChatSessions, session.clone().into_document())
            .await?;
        session.id = Some(id);
        Ok(session)
    }

    /// Update a session's title. True iff a matching session was modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn rename_session(
        &self,
        chat_id: DocumentId,
        title: &str,
    ) -> Result<bool, StoreError> {
        let mut set = Document::new();
        set.insert("title".to_string(), json!(title));
        self.store
            .update_one(Collection::ChatSessions, chat_id, set)
            .await
    }

    /// Set a session's last-activity timestamp to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn touch_last_activity(&self, chat_id: DocumentId) -> Result<bool, StoreError> {
        let mut set = Document::new();
        set.insert("last_message_at".to_string(), json!(now_millis()));
        self.store
            .update_one(Collection::ChatSessions, chat_id, set)
            .await
    }

    /// Delete a session and, independently, all messages referencing it.
    ///
    /// The return value reflects the session delete only; the message
    /// cascade is a second, unguarded step.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails.
    pub async fn delete_session(&self, chat_id: DocumentId) -> Result<bool, StoreError> {
        let deleted = self.store.delete_one(Collection::ChatSessions, chat_id).await?;

        self.store
            .delete_many(
                Collection::Messages,
                filter(&[("chat_id", json!(chat_id.to_string()))]),
            )
            .await?;

        Ok(deleted)
    }

    /// All messages for a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails or a stored message
    /// does not decode.
    pub async fn list_messages(&self, chat_id: DocumentId) -> Result<Vec<Message>, StoreError> {
        let docs = self
            .store
            .find_many(
                Collection::Messages,
                filter(&[("chat_id", json!(chat_id.to_string()))]),
                Some(Sort::ascending("timestamp")),
            )
            .await?;

        docs.iter().map(Message::from_document).collect()
    }

    /// Append a message to a session.
    ///
    /// Step ordering is the contract: (1) a first user message against the
    /// default title renames the session, (2) the message is inserted,
    /// (3) the session's last-activity timestamp is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails.
    pub async fn append_message(
        &self,
        chat_id: DocumentId,
        role: MessageRole,
        content: &str,
        instance_name: &str,
    ) -> Result<Message, StoreError> {
        let session = self.get_session(chat_id).await?;
        let still_default = session.is_some_and(|s| s.title == DEFAULT_SESSION_TITLE);
        if role == MessageRole::User && still_default {
            self.rename_session(chat_id, &derive_title(content)).await?;
        }

        let mut message = Message::new(chat_id, role, content, instance_name);
        let id = self
            .store
            .insert_one(Collection::Messages, message.clone().into_document())
            .await?;
        message.id = Some(id);

        self.touch_last_activity(chat_id).await?;

        Ok(message)
    }

    /// Process a user query and return the assistant's reply message.
    ///
    /// Fetches the tenant's data context, persists the query, assembles the
    /// trailing conversation history, and calls the gateway. A gateway
    /// failure is handled here and nowhere else: it is logged and converted
    /// into the fixed degraded reply, stored and returned like any other
    /// assistant message. Callers never see an error for that path.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails.
    pub async fn process_query(
        &self,
        chat_id: DocumentId,
        query: &str,
        instance_name: &str,
    ) -> Result<Message, StoreError> {
        let data_service = DataService::new(Arc::clone(&self.store), Arc::clone(&self.gateway));
        let data_context = data_service.get_context_summary(instance_name).await?;

        self.append_message(chat_id, MessageRole::User, query, instance_name)
            .await?;

        let messages = self.list_messages(chat_id).await?;
        let trailing = messages.len().saturating_sub(HISTORY_LIMIT);
        let history: Vec<ConversationTurn> = messages
            .into_iter()
            .skip(trailing)
            .map(|message| ConversationTurn {
                role: message.role,
                content: message.content,
            })
            .collect();

        let reply = match self
            .gateway
            .respond(query, &history, &data_context, instance_name)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, "error processing query");
                FALLBACK_REPLY.to_string()
            }
        };

        self.append_message(chat_id, MessageRole::Assistant, &reply, instance_name)
            .await
    }
}

/// Derive a session title from the first user message: the content verbatim
/// when short enough, otherwise a truncated prefix with an ellipsis marker.
fn derive_title(content: &str) -> String {
    if content.chars().count() <= TITLE_MAX_CHARS {
        content.to_string()
    } else {
        let prefix: String = content.chars().take(TITLE_TRUNCATED_CHARS).collect();
        format!("{prefix}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_becomes_the_title_verbatim() {
        assert_eq!(derive_title("Hello"), "Hello");
        let exactly_thirty = "a".repeat(30);
        assert_eq!(derive_title(&exactly_thirty), exactly_thirty);
    }

    #[test]
    fn long_content_is_truncated_with_ellipsis() {
        let content = "This is a longer message for testing xx";
        let title = derive_title(content);
        assert_eq!(title, "This is a longer message fo...");
        assert_eq!(title.chars().count(), 30);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let content = "ü".repeat(40);
        let title = derive_title(&content);
        assert_eq!(title.chars().count(), 30);
        assert!(title.ends_with("..."));
    }
}
