//! The AI gateway.
//!
//! A single capability boundary: turn a user query plus conversation history
//! plus a textual data context into a natural-language reply, and produce
//! sample datasets for demo-data generation. The chat orchestration depends
//! only on these two contracts and on failures being ordinary `Err` values
//! it can branch on.

pub mod canned;
pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use salto_core::MessageRole;

use crate::models::DemoDataset;

pub use canned::CannedGateway;
pub use client::AzureOpenAiClient;

/// One prior exchange passed to the gateway as conversation history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: MessageRole,
    pub content: String,
}

/// Errors that can occur when calling the AI gateway.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body.
        message: String,
    },

    /// Failed to parse the response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// The external capability that answers grounded queries.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Produce a reply to `query`, given the recent conversation history and
    /// the tenant's data context.
    async fn respond(
        &self,
        query: &str,
        history: &[ConversationTurn],
        data_context: &str,
        instance_name: &str,
    ) -> Result<String, AiError>;

    /// Produce a set of sample datasets for demo-data generation.
    async fn generate_demo_datasets(&self) -> Result<Vec<DemoDataset>, AiError>;
}
