//! Data service: business-data CRUD, the AI data context, and demo data.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use thiserror::Error;

use salto_core::{DocumentId, MessageRole};

use crate::ai::{AiError, AiGateway};
use crate::db::{Collection, DocumentStore, StoreError, filter};
use crate::models::{BusinessData, ChatSession, DemoDataset, User};
use crate::services::ChatService;

/// Context handed to the gateway when a tenant has no data yet.
pub const NO_DATA_CONTEXT: &str = "No business data available yet. \
     Add sample data or explain what data you're looking for.";

/// Title of the scripted demo-data conversation.
const DEMO_CHAT_TITLE: &str = "Demo Data Exploration";

/// Opening question of the scripted demo-data conversation.
const DEMO_CHAT_QUESTION: &str = "Salto, what business data is available for me to explore?";

/// Errors that can occur in the data service.
#[derive(Debug, Error)]
pub enum DataError {
    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// AI gateway error. Unlike query processing, demo-data generation has
    /// no degraded path; the failure propagates.
    #[error("AI gateway error: {0}")]
    Gateway(#[from] AiError),
}

/// Service for managing business data.
pub struct DataService {
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn AiGateway>,
}

impl DataService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, gateway: Arc<dyn AiGateway>) -> Self {
        Self { store, gateway }
    }

    /// All business data documents for a tenant. No ordering guarantee.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn list_documents(
        &self,
        instance_name: &str,
    ) -> Result<Vec<BusinessData>, StoreError> {
        let docs = self
            .store
            .find_many(
                Collection::BusinessData,
                filter(&[("instance_name", json!(instance_name))]),
                None,
            )
            .await?;

        Ok(docs.iter().map(BusinessData::from_document).collect())
    }

    /// A text representation of the tenant's data, used as AI grounding.
    ///
    /// One JSON summary per document (dataset, description, field names, and
    /// a sample of the scalar values), joined by blank lines. There is no
    /// ranking or truncation; the string grows with the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn get_context_summary(&self, instance_name: &str) -> Result<String, StoreError> {
        let docs = self.list_documents(instance_name).await?;

        if docs.is_empty() {
            return Ok(NO_DATA_CONTEXT.to_string());
        }

        let summaries: Vec<String> = docs
            .iter()
            .map(|doc| {
                let fields: Vec<&String> = doc.data.keys().collect();
                let sample: Map<String, Value> = doc
                    .data
                    .iter()
                    .filter(|(_, value)| !value.is_object() && !value.is_array())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();

                json!({
                    "dataset": doc.dataset_name,
                    "description": doc.description,
                    "fields": fields,
                    "sample": sample,
                })
                .to_string()
            })
            .collect();

        Ok(summaries.join("\n\n"))
    }

    /// Fetch one of the tenant's business data documents by id.
    ///
    /// A document owned by another tenant is `None`, exactly like an absent
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn get_document(
        &self,
        instance_name: &str,
        id: DocumentId,
    ) -> Result<Option<BusinessData>, StoreError> {
        let doc = self.store.find_one(Collection::BusinessData, id).await?;
        Ok(doc
            .as_ref()
            .map(BusinessData::from_document)
            .filter(|data| data.instance_name == instance_name))
    }

    /// Look up a login user by its string id.
    ///
    /// Login is a collaborator concern: any failure here, a malformed id
    /// included, is reported as `None`.
    pub async fn find_user_by_id(&self, user_id: &str) -> Option<User> {
        let id = DocumentId::parse(user_id).ok()?;
        let doc = self.store.find_one(Collection::Users, id).await.ok()??;
        Some(User::from_document(&doc))
    }

    /// Insert a business data document and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    pub async fn add_document(&self, data: BusinessData) -> Result<DocumentId, StoreError> {
        self.store
            .insert_one(Collection::BusinessData, data.into_document())
            .await
    }

    /// Delete everything a tenant owns: business data, chat sessions, and
    /// messages. Returns the total deleted count.
    ///
    /// Not transactional: a failure partway leaves a partially wiped tenant,
    /// and the count reflects whatever succeeded before the failure.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails.
    pub async fn wipe_tenant(&self, instance_name: &str) -> Result<u64, StoreError> {
        let tenant = filter(&[("instance_name", json!(instance_name))]);

        let data = self
            .store
            .delete_many(Collection::BusinessData, tenant.clone())
            .await?;
        let chats = self
            .store
            .delete_many(Collection::ChatSessions, tenant.clone())
            .await?;
        let messages = self.store.delete_many(Collection::Messages, tenant).await?;

        Ok(data + chats + messages)
    }

    /// Generate demo data for a tenant and return the new dataset ids.
    ///
    /// Asks the gateway for sample datasets and persists each one. When a
    /// chat id is supplied, that session (or a fresh one, if it does not
    /// resolve) additionally gets a scripted two-turn conversation about the
    /// generated data and is renamed. Message ids are not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway or a store operation fails.
    pub async fn generate_demo_data(
        &self,
        instance_name: &str,
        chat_id: Option<DocumentId>,
    ) -> Result<Vec<DocumentId>, DataError> {
        let datasets = self.gateway.generate_demo_datasets().await?;

        let mut dataset_ids = Vec::with_capacity(datasets.len());
        for dataset in &datasets {
            let mut record =
                BusinessData::new(&dataset.dataset_name, &dataset.description, instance_name);
            record.data = dataset.data.clone();
            dataset_ids.push(self.add_document(record).await?);
        }

        if let Some(chat_id) = chat_id {
            self.script_demo_conversation(instance_name, chat_id, &datasets)
                .await?;
        }

        Ok(dataset_ids)
    }

    /// Seed the demo conversation into the given session, or a fresh one if
    /// the id does not resolve.
    async fn script_demo_conversation(
        &self,
        instance_name: &str,
        chat_id: DocumentId,
        datasets: &[DemoDataset],
    ) -> Result<(), StoreError> {
        let chat_service = ChatService::new(Arc::clone(&self.store), Arc::clone(&self.gateway));

        let chat_id = match self.store.find_one(Collection::ChatSessions, chat_id).await? {
            Some(existing) => existing.id,
            None => {
                let mut session = ChatSession::new(instance_name);
                session.title = DEMO_CHAT_TITLE.to_string();
                self.store
                    .insert_one(Collection::ChatSessions, session.into_document())
                    .await?
            }
        };

        chat_service
            .append_message(chat_id, MessageRole::User, DEMO_CHAT_QUESTION, instance_name)
            .await?;

        let data_description = datasets
            .iter()
            .map(|dataset| format!("- **{}**: {}", dataset.dataset_name, dataset.description))
            .collect::<Vec<_>>()
            .join("\n");

        let response = format!(
            "I've loaded some sample business data for the \"{instance_name}\" instance:\n\n\
             {data_description}\n\n\
             You can ask me questions about this data, such as \"Salto, what were our \
             top-selling products?\" or \"Salto, how have sales trended over time?\"\n\n\
             I'm here to help you explore this data and uncover valuable insights for your \
             business."
        );

        chat_service
            .append_message(chat_id, MessageRole::Assistant, &response, instance_name)
            .await?;

        chat_service.rename_session(chat_id, DEMO_CHAT_TITLE).await?;

        Ok(())
    }
}
