//! Per-document extraction pipeline
//!
//! Feeds each page through catalog update -> entity match -> relation
//! match, accumulating page records and a final catalog snapshot. The
//! catalog persists across documents for the lifetime of one extractor
//! instance, so later decks benefit from terms learned in earlier ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{Category, TermCatalog};
use crate::matcher::EntityMatcher;
use crate::relation::RelationMatcher;
use crate::segment::{JiebaSegmenter, Segmenter};
use crate::{EntityOccurrence, RelationTriple};
use deckmine_core::{Result, SlidePage};

/// Text previews keep at most this many characters
const PREVIEW_CHARS: usize = 100;

/// Extraction record for a single slide page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-based slide number
    pub page: usize,

    /// Truncated text preview (first 100 chars, ellipsis-suffixed)
    pub preview: String,

    /// Entity texts found on the page, by category (offsets dropped)
    pub entities: BTreeMap<Category, Vec<String>>,

    /// Relation triples found on the page
    pub relations: Vec<RelationTriple>,
}

/// Extraction record for a whole document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Per-page records, in page order
    pub pages: Vec<PageResult>,

    /// Catalog snapshot taken after the last page of this document
    pub terms: BTreeMap<Category, Vec<String>>,
}

/// Stateful extractor owning one term catalog.
///
/// Single-threaded by design: the catalog is mutated only by
/// `update_catalog` and read by the matcher, so pages must be processed
/// sequentially (or the extractor wrapped in a single-writer lock).
pub struct SlideDeckExtractor {
    segmenter: Box<dyn Segmenter>,
    catalog: TermCatalog,
    matcher: EntityMatcher,
    relations: RelationMatcher,
}

impl SlideDeckExtractor {
    /// Create an extractor with the default jieba segmenter
    pub fn new() -> Self {
        Self::with_segmenter(Box::new(JiebaSegmenter::new()))
    }

    /// Create an extractor with a custom segmenter
    pub fn with_segmenter(segmenter: Box<dyn Segmenter>) -> Self {
        Self {
            segmenter,
            catalog: TermCatalog::new(),
            matcher: EntityMatcher::new(),
            relations: RelationMatcher::new(),
        }
    }

    /// Read access to the current catalog
    pub fn catalog(&self) -> &TermCatalog {
        &self.catalog
    }

    /// Seed an extra term into the catalog
    pub fn insert_term(&mut self, category: Category, term: impl Into<String>) {
        self.catalog.insert(category, term);
    }

    /// Grow the catalog from one text
    pub fn update_catalog(&mut self, text: &str) -> Result<()> {
        self.catalog.update(text, self.segmenter.as_ref())
    }

    /// Match catalog terms and organization names in one text
    pub fn extract_entities(&self, text: &str) -> BTreeMap<Category, Vec<EntityOccurrence>> {
        self.matcher.extract(&self.catalog, text)
    }

    /// Extract relation triples whose endpoints are recognized entities
    pub fn extract_relations(
        &self,
        text: &str,
        entities: &BTreeMap<Category, Vec<EntityOccurrence>>,
    ) -> Vec<RelationTriple> {
        self.relations.extract(text, entities)
    }

    /// Run the full update -> match -> relate sequence for one page
    pub fn process_page(&mut self, page: &SlidePage) -> Result<PageResult> {
        self.update_catalog(&page.text)?;

        let entities = self.extract_entities(&page.text);
        let relations = self.extract_relations(&page.text, &entities);

        let entities = entities
            .into_iter()
            .map(|(cat, occs)| (cat, occs.into_iter().map(|o| o.text).collect()))
            .collect();

        Ok(PageResult {
            page: page.page,
            preview: preview(&page.text),
            entities,
            relations,
        })
    }

    /// Process all pages of one document and snapshot the catalog.
    ///
    /// A failure aborts the current document; the catalog keeps whatever
    /// was learned from the pages processed so far.
    pub fn process_document(&mut self, pages: &[SlidePage]) -> Result<DocumentResult> {
        let mut results = Vec::with_capacity(pages.len());
        for page in pages {
            results.push(self.process_page(page)?);
        }

        info!(
            pages = pages.len(),
            terms = self.catalog.len(),
            "document processed"
        );

        Ok(DocumentResult {
            pages: results,
            terms: self.catalog.snapshot(),
        })
    }
}

impl Default for SlideDeckExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First 100 characters of `text`, ellipsis-suffixed when truncated
fn preview(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
