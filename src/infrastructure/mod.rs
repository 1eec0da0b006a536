//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Cache implementations (Redis)
//! - SMTP mail delivery
//! - External lookup API clients (Wikipedia, GPT)

pub mod cache;
pub mod database;
pub mod email;
pub mod external;
pub mod metrics;
pub mod repositories;
