//! Business data records.
//!
//! A business data document is a tenant-owned, semi-structured dataset used
//! to ground assistant responses. Known fields are typed struct fields; the
//! dataset's actual content lives in the open-ended `data` mapping. Only at
//! the storage boundary is `data` flattened into the document's top level,
//! so a dataset key that collides with a fixed field name would shadow it.
//! That collision is a known hazard and is not handled.

use serde::{Deserialize, Serialize};
use serde_json::json;

use salto_core::DocumentId;

use crate::db::{Document, StoredDocument};

use super::{DEFAULT_INSTANCE_NAME, get_i64, get_str, now_millis};

/// Field names reserved by the record itself; everything else in a stored
/// document belongs to the `data` mapping.
const FIXED_FIELDS: [&str; 4] = ["dataset_name", "description", "instance_name", "created_at"];

/// A tenant-owned dataset document.
#[derive(Debug, Clone, Serialize)]
pub struct BusinessData {
    pub id: Option<DocumentId>,
    pub dataset_name: String,
    pub description: String,
    pub instance_name: String,
    /// The dataset's content. Shape is caller-defined, not schema-enforced.
    pub data: Document,
    /// Milliseconds since epoch.
    pub created_at: i64,
}

impl BusinessData {
    /// A new, empty dataset record stamped with the current time.
    #[must_use]
    pub fn new(
        dataset_name: impl Into<String>,
        description: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            dataset_name: dataset_name.into(),
            description: description.into(),
            instance_name: instance_name.into(),
            data: Document::new(),
            created_at: now_millis(),
        }
    }

    /// Decode a stored document: known fields by name, every remaining field
    /// collected back into the `data` mapping.
    #[must_use]
    pub fn from_document(doc: &StoredDocument) -> Self {
        let mut data = Document::new();
        for (key, value) in &doc.fields {
            if !FIXED_FIELDS.contains(&key.as_str()) {
                data.insert(key.clone(), value.clone());
            }
        }

        Self {
            id: Some(doc.id),
            dataset_name: get_str(&doc.fields, "dataset_name", "Unknown Dataset"),
            description: get_str(&doc.fields, "description", ""),
            instance_name: get_str(&doc.fields, "instance_name", DEFAULT_INSTANCE_NAME),
            data,
            created_at: get_i64(&doc.fields, "created_at", now_millis()),
        }
    }

    /// Encode the fixed fields and flatten the `data` mapping into the top
    /// level of the document. The identifier is carried by the store.
    #[must_use]
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("dataset_name".to_string(), json!(self.dataset_name));
        doc.insert("description".to_string(), json!(self.description));
        doc.insert("instance_name".to_string(), json!(self.instance_name));
        doc.insert("created_at".to_string(), json!(self.created_at));
        doc.extend(self.data);
        doc
    }
}

/// A sample dataset produced by the AI gateway for demo-data generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoDataset {
    pub dataset_name: String,
    pub description: String,
    #[serde(default)]
    pub data: Document,
}
