//! Deckmine Extractor - Terminology and knowledge extraction pipeline
//!
//! Implements the catalog-driven extraction core:
//! - A term catalog that grows monotonically as slide text is scanned
//! - An entity matcher combining catalog lookup with a structural
//!   organization-name pattern
//! - A rule-based relation extractor pairing recognized entities
//!
//! The core is synchronous and deterministic: identical (catalog, text)
//! inputs always produce identical outputs.

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod matcher;
pub mod pipeline;
pub mod relation;
pub mod segment;

pub use catalog::{Category, TermCatalog};
pub use matcher::EntityMatcher;
pub use pipeline::{DocumentResult, PageResult, SlideDeckExtractor};
pub use relation::{RelationMatcher, RelationType};
pub use segment::{JiebaSegmenter, Segmenter, Token};

/// A located occurrence of an entity within a specific text.
///
/// `start` and `end` are byte offsets into the text the matcher was
/// called with; occurrences are never persisted beyond one page result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOccurrence {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A (subject, relation-type, object) fact derived from a structural
/// pattern match whose spans are both recognized entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTriple {
    pub subject: String,
    pub relation: RelationType,
    pub object: String,
}
