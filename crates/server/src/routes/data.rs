//! Business data route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use salto_core::DocumentId;

use crate::db::Document;
use crate::error::AppError;
use crate::middleware::Tenant;
use crate::models::BusinessData;
use crate::services::DataService;
use crate::state::AppState;

/// Build the data router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/data/list", get(list_data))
        .route("/data/add", post(add_data))
        .route("/data/generate-demo", post(generate_demo))
        .route("/data/{doc_id}", get(get_data))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Business data document as listed.
#[derive(Debug, Serialize)]
pub struct DataSummaryResponse {
    pub id: String,
    pub dataset_name: String,
    pub description: String,
    pub created_at: i64,
}

impl From<BusinessData> for DataSummaryResponse {
    fn from(data: BusinessData) -> Self {
        Self {
            id: data.id.map(|id| id.to_string()).unwrap_or_default(),
            dataset_name: data.dataset_name,
            description: data.description,
            created_at: data.created_at,
        }
    }
}

/// Business data document with its full data mapping.
#[derive(Debug, Serialize)]
pub struct DataDetailResponse {
    pub id: String,
    pub dataset_name: String,
    pub description: String,
    pub data: Document,
    pub created_at: i64,
}

impl From<BusinessData> for DataDetailResponse {
    fn from(data: BusinessData) -> Self {
        Self {
            id: data.id.map(|id| id.to_string()).unwrap_or_default(),
            dataset_name: data.dataset_name,
            description: data.description,
            data: data.data,
            created_at: data.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct AddDataResponse {
    success: bool,
    id: String,
    message: String,
}

/// Request to generate demo data.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateDemoRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateDemoResponse {
    success: bool,
    dataset_count: usize,
    dataset_ids: Vec<String>,
    message: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// List the ambient tenant's data documents.
///
/// GET /data/list
async fn list_data(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
) -> Result<Json<Vec<DataSummaryResponse>>, AppError> {
    let service = DataService::new(state.store(), state.gateway());
    let docs = service.list_documents(&instance_name).await?;
    Ok(Json(docs.into_iter().map(Into::into).collect()))
}

/// Fetch one data document, including its full data mapping.
///
/// GET /data/{doc_id}
async fn get_data(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
    Path(doc_id): Path<String>,
) -> Result<Json<DataDetailResponse>, AppError> {
    let doc_id = DocumentId::parse(&doc_id)
        .map_err(|_| AppError::BadRequest("Invalid document ID format".to_string()))?;

    let service = DataService::new(state.store(), state.gateway());
    let doc = service
        .get_document(&instance_name, doc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(doc.into()))
}

/// Add a new data document.
///
/// POST /data/add
///
/// `dataset_name` and `description` are required; every other body field
/// lands in the document's open-ended data mapping.
async fn add_data(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
    Json(body): Json<Value>,
) -> Result<Json<AddDataResponse>, AppError> {
    let Value::Object(body) = body else {
        return Err(AppError::BadRequest("Request body is required".to_string()));
    };

    let dataset_name = body.get("dataset_name").and_then(Value::as_str);
    let description = body.get("description").and_then(Value::as_str);
    let (Some(dataset_name), Some(description)) = (dataset_name, description) else {
        return Err(AppError::BadRequest(
            "dataset_name and description are required".to_string(),
        ));
    };

    let mut data = BusinessData::new(dataset_name, description, &instance_name);
    for (key, value) in &body {
        if !matches!(key.as_str(), "dataset_name" | "description" | "instance_name") {
            data.data.insert(key.clone(), value.clone());
        }
    }

    let service = DataService::new(state.store(), state.gateway());
    let name = data.dataset_name.clone();
    let id = service.add_document(data).await?;

    Ok(Json(AddDataResponse {
        success: true,
        id: id.to_string(),
        message: format!("Successfully added dataset \"{name}\""),
    }))
}

/// Generate demo data for the ambient tenant.
///
/// POST /data/generate-demo
///
/// The body is optional; `{"chat_id": "..."}` additionally seeds a scripted
/// conversation into that chat.
async fn generate_demo(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
    body: axum::body::Bytes,
) -> Result<Json<GenerateDemoResponse>, AppError> {
    let request: GenerateDemoRequest = if body.is_empty() {
        GenerateDemoRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?
    };

    let chat_id = request
        .chat_id
        .map(|raw| {
            DocumentId::parse(&raw)
                .map_err(|_| AppError::BadRequest("Invalid chat ID format".to_string()))
        })
        .transpose()?;

    let service = DataService::new(state.store(), state.gateway());
    let dataset_ids = service.generate_demo_data(&instance_name, chat_id).await?;

    let count = dataset_ids.len();
    Ok(Json(GenerateDemoResponse {
        success: true,
        dataset_count: count,
        dataset_ids: dataset_ids.iter().map(ToString::to_string).collect(),
        message: format!("Successfully generated {count} demo datasets"),
    }))
}
