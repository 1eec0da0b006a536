//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `api/` - REST API and gateway surface tests
//! - `common/` - Shared test utilities

mod api;
mod common;
