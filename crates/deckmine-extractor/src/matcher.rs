//! Entity matching against the term catalog
//!
//! Two independent passes over the text:
//! 1. Catalog lookup with longest-match-first priority. A claimed-offset
//!    set guarantees that no two accepted catalog occurrences overlap,
//!    across and within categories.
//! 2. A structural organization pattern (2-10 CJK characters followed by
//!    an institution suffix), accepted only when the match also contains
//!    an organization trigger keyword. Structural matches are exempt
//!    from offset claiming and may overlap catalog matches.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::catalog::{Category, TermCatalog};
use crate::EntityOccurrence;

/// Matches entity occurrences in text against a catalog snapshot
pub struct EntityMatcher {
    org_pattern: Regex,
}

impl EntityMatcher {
    pub fn new() -> Self {
        // suffix set: company/group/university/college/research
        // institute/laboratory/press
        let org_pattern =
            Regex::new(r"[一-龥]{2,10}(?:公司|集团|大学|学院|研究院|实验室|出版社)")
                .expect("organization pattern is valid");

        Self { org_pattern }
    }

    /// Return all entity occurrences in `text`, keyed by category.
    ///
    /// Categories with no matches are absent from the result. The catalog
    /// is read-only for the duration of the call.
    pub fn extract(
        &self,
        catalog: &TermCatalog,
        text: &str,
    ) -> BTreeMap<Category, Vec<EntityOccurrence>> {
        let mut entities: BTreeMap<Category, Vec<EntityOccurrence>> = BTreeMap::new();

        // Longest terms first, so a longer term claims its span before
        // any shorter term that is a substring of it.
        let mut terms: Vec<(Category, &str)> = catalog.iter_terms().collect();
        terms.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));

        let mut claimed: HashSet<usize> = HashSet::new();
        for (category, term) in terms {
            for (start, matched) in text.match_indices(term) {
                let end = start + matched.len();
                if (start..end).any(|p| claimed.contains(&p)) {
                    continue;
                }
                claimed.extend(start..end);
                entities
                    .entry(category)
                    .or_default()
                    .push(EntityOccurrence {
                        text: matched.to_string(),
                        start,
                        end,
                    });
            }
        }

        // Structural organization matches are additive and gated on the
        // organization keyword list; they do not participate in claiming.
        let org_keywords = Category::Organization.keywords();
        for mat in self.org_pattern.find_iter(text) {
            let name = mat.as_str();
            if org_keywords.iter().any(|kw| name.contains(kw)) {
                entities
                    .entry(Category::Organization)
                    .or_default()
                    .push(EntityOccurrence {
                        text: name.to_string(),
                        start: mat.start(),
                        end: mat.end(),
                    });
            }
        }

        entities
    }
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
