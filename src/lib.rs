//! # KPortal Server
//!
//! Backend for a social resource-sharing portal:
//! - RESTful HTTP API (accounts, resources, likes, comments, follows)
//! - WebSocket gateway for real-time chat
//! - PostgreSQL for persistent storage
//! - Redis for caching and rate limiting
//! - External lookup proxies (Wikipedia, GPT)
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, cache, mail, and external clients
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! kportal_server/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database, cache, mail, external clients
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
