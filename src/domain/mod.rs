//! # Domain Layer
//!
//! Core entities of the portal and the repository traits that define their
//! data-access contracts. No dependencies on infrastructure or presentation.

pub mod entities;

pub use entities::*;
