pub mod config;
pub mod error;

// Corpus loading and the search core
pub mod corpus;
pub mod indexer;

// Collaborators
pub mod convert;
pub mod scrape;
pub mod translate;

// Presentation
pub mod api;
pub mod cli;
pub mod web;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
