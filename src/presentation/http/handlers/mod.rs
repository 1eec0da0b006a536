//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod chat;
pub mod health;
pub mod language;
pub mod lookup;
pub mod resource;
pub mod search;
pub mod social;
pub mod stats;
pub mod user;
