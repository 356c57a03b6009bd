//! Domain records and their document mappings.

pub mod chat;
pub mod data;
pub mod user;

pub use chat::{ChatSession, DEFAULT_INSTANCE_NAME, DEFAULT_SESSION_TITLE, Message};
pub use data::{BusinessData, DemoDataset};
pub use user::User;

use serde_json::Value;

use crate::db::Document;

/// Current time in milliseconds since epoch, the storage form of every
/// timestamp field.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Read a string field, falling back to a default when missing or mistyped.
fn get_str(doc: &Document, key: &str, default: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Read a millisecond timestamp field, falling back when missing.
fn get_i64(doc: &Document, key: &str, default: i64) -> i64 {
    doc.get(key).and_then(Value::as_i64).unwrap_or(default)
}
