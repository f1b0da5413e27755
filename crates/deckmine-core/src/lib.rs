//! Deckmine Core - Shared error types, configuration, and document models
//!
//! This crate defines the types used throughout the deckmine workspace:
//! - Common error type and `Result` alias
//! - Configuration management (environment variables + TOML)
//! - Slide page model passed from the parser to the extractor

pub mod config;

pub use config::{AppConfig, ConfigError, DatabaseConfig, GraphConfig, LoggingConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for deckmine operations
#[derive(Error, Debug)]
pub enum DeckmineError {
    #[error("Segmentation error: {0}")]
    Segmentation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Graph store error: {0}")]
    Graph(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DeckmineError>;

// ============================================================================
// Slide Page Model
// ============================================================================

/// One page of slide text, as produced by the deck parser.
///
/// Pages are 1-indexed to match how slides are numbered in the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePage {
    /// 1-based slide number
    pub page: usize,

    /// Concatenated text of all shapes on the slide
    pub text: String,
}

impl SlidePage {
    /// Create a new slide page
    pub fn new(page: usize, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}
