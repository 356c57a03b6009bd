//! Salto server library.
//!
//! A multi-tenant chat service: users converse with an AI assistant that
//! answers questions grounded in per-tenant business datasets. Sessions,
//! messages, and datasets live in a document store; queries are brokered
//! through an AI gateway.
//!
//! # Architecture
//!
//! - Axum web framework, JSON API
//! - `PostgreSQL` JSONB document store behind an injected trait
//! - Azure OpenAI gateway (canned gateway when unconfigured)
//! - tower-sessions for the ambient tenant and the admin gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ai;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
