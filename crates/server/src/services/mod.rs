//! Service layer: chat orchestration and business-data management.

pub mod chat;
pub mod data;

pub use chat::{ChatService, FALLBACK_REPLY};
pub use data::{DataError, DataService, NO_DATA_CONTEXT};
