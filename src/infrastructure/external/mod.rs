//! External API Clients
//!
//! Outbound HTTP clients for the lookup proxies: Wikipedia article lookup
//! and GPT completions.

pub mod gpt;
pub mod wikipedia;

pub use gpt::GptClient;
pub use wikipedia::{WikipediaArticle, WikipediaClient, WikipediaSearchResult};
