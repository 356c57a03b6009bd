//! The shipped default gateway: canned responses, no network.
//!
//! Used whenever no AI credentials are configured, and by tests.

use async_trait::async_trait;
use serde_json::json;

use crate::models::DemoDataset;

use super::{AiError, AiGateway, ConversationTurn};

/// The fixed reply returned for every query.
pub const CANNED_RESPONSE: &str =
    "This is a mock response from the AI service for testing purposes.";

/// Gateway that answers every query with a fixed string and produces a fixed
/// pair of demo datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedGateway;

impl CannedGateway {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AiGateway for CannedGateway {
    async fn respond(
        &self,
        _query: &str,
        _history: &[ConversationTurn],
        _data_context: &str,
        _instance_name: &str,
    ) -> Result<String, AiError> {
        Ok(CANNED_RESPONSE.to_string())
    }

    async fn generate_demo_datasets(&self) -> Result<Vec<DemoDataset>, AiError> {
        let sales = DemoDataset {
            dataset_name: "Sales Data".to_string(),
            description: "Sample sales data for testing".to_string(),
            data: [
                ("total_sales".to_string(), json!(15000)),
                ("products".to_string(), json!(["Product A", "Product B"])),
            ]
            .into_iter()
            .collect(),
        };
        let customers = DemoDataset {
            dataset_name: "Customer Data".to_string(),
            description: "Sample customer information".to_string(),
            data: [
                ("total_customers".to_string(), json!(250)),
                ("regions".to_string(), json!(["North", "South"])),
            ]
            .into_iter()
            .collect(),
        };

        Ok(vec![sales, customers])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn respond_returns_the_fixed_string() {
        let gateway = CannedGateway::new();
        let reply = gateway
            .respond("anything", &[], "no context", "Acme")
            .await
            .expect("canned gateway cannot fail");
        assert_eq!(reply, CANNED_RESPONSE);
    }

    #[tokio::test]
    async fn demo_datasets_are_fixed() {
        let gateway = CannedGateway::new();
        let datasets = gateway.generate_demo_datasets().await.expect("canned");
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].dataset_name, "Sales Data");
        assert_eq!(datasets[1].dataset_name, "Customer Data");
    }
}
