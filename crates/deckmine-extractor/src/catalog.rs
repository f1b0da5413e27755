//! Term catalog and candidate-term validation
//!
//! The catalog maps each domain category to a set of known terms. It is
//! seeded with a fixed bootstrap set and grows monotonically: scanning a
//! text forms 2- and 3-token noun candidates, validates them, and inserts
//! the survivors under the first category whose trigger keywords they
//! contain. Terms are never removed within a run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segment::Segmenter;
use deckmine_core::Result;

/// Minimum candidate length in characters (inclusive)
const MIN_TERM_CHARS: usize = 2;
/// Maximum candidate length in characters (inclusive)
const MAX_TERM_CHARS: usize = 12;
/// 3-token candidates are only formed when the middle token is shorter
/// than this, guarding against combinatorial blowup from long tokens.
const SHORT_MIDDLE_CHARS: usize = 4;

/// Catch-all markers: candidates matching no category keyword but
/// containing one of these are still assigned to [`Category::MethodModel`].
const METHOD_FALLBACK_MARKERS: [&str; 2] = ["网络", "算法"];

// ============================================================================
// Categories
// ============================================================================

/// Domain categories, in categorization priority order.
///
/// The declaration order is load-bearing: the validator assigns a
/// candidate to the first category whose keyword list it contains.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TechnicalConcept,
    MethodModel,
    ToolSystem,
    Organization,
    PerformanceMetric,
}

impl Category {
    /// All categories in categorization priority order
    pub const ALL: [Category; 5] = [
        Category::TechnicalConcept,
        Category::MethodModel,
        Category::ToolSystem,
        Category::Organization,
        Category::PerformanceMetric,
    ];

    /// Trigger keywords used for categorical membership testing
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::TechnicalConcept => &[
                "优化", "查询", "数据库", "分布式", "架构", "向量", "基数", "索引",
            ],
            Self::MethodModel => &[
                "直方图", "采样", "回归", "神经网络", "贝叶斯", "卷积", "图谱",
            ],
            Self::ToolSystem => &["Spark", "Flink", "PostgreSQL", "CRF", "BMES"],
            Self::Organization => &["大学", "实验室", "研究院", "出版社"],
            Self::PerformanceMetric => &["吞吐量", "延迟", "准确率", "NDV"],
        }
    }

    /// Human-readable Chinese label, as used in printed output
    pub fn label(&self) -> &'static str {
        match self {
            Self::TechnicalConcept => "技术概念",
            Self::MethodModel => "方法/模型",
            Self::ToolSystem => "工具/系统",
            Self::Organization => "组织/机构",
            Self::PerformanceMetric => "性能指标",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Term Catalog
// ============================================================================

/// Per-extractor-instance store of known domain terms by category.
///
/// Monotonically non-decreasing: `update` only ever inserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermCatalog {
    terms: BTreeMap<Category, BTreeSet<String>>,
}

impl TermCatalog {
    /// Create a catalog seeded with the fixed bootstrap terms
    pub fn new() -> Self {
        let mut terms: BTreeMap<Category, BTreeSet<String>> = BTreeMap::new();

        terms.insert(
            Category::TechnicalConcept,
            ["查询优化", "基数估计", "分布式计算"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        terms.insert(
            Category::MethodModel,
            ["频率直方图", "混合直方图", "图神经网络"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        terms.insert(Category::ToolSystem, BTreeSet::new());
        terms.insert(
            Category::Organization,
            ["清华大学出版社"].into_iter().map(String::from).collect(),
        );
        terms.insert(Category::PerformanceMetric, BTreeSet::new());

        Self { terms }
    }

    /// Insert a term under a category (set semantics; duplicate is a no-op)
    pub fn insert(&mut self, category: Category, term: impl Into<String>) {
        self.terms.entry(category).or_default().insert(term.into());
    }

    /// Whether the catalog contains a term under the given category
    pub fn contains(&self, category: Category, term: &str) -> bool {
        self.terms
            .get(&category)
            .is_some_and(|set| set.contains(term))
    }

    /// Iterate all (category, term) pairs
    pub fn iter_terms(&self) -> impl Iterator<Item = (Category, &str)> {
        self.terms
            .iter()
            .flat_map(|(cat, set)| set.iter().map(|t| (*cat, t.as_str())))
    }

    /// Total number of terms across all categories
    pub fn len(&self) -> usize {
        self.terms.values().map(BTreeSet::len).sum()
    }

    /// Whether the catalog holds no terms at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the catalog as category -> sorted term list
    pub fn snapshot(&self) -> BTreeMap<Category, Vec<String>> {
        self.terms
            .iter()
            .map(|(cat, set)| (*cat, set.iter().cloned().collect()))
            .collect()
    }

    /// Scan `text` for new candidate terms and insert the valid ones.
    ///
    /// Forms a 2-token candidate from every adjacent pair of noun-tagged
    /// tokens, plus a 3-token candidate whenever the middle token is
    /// short. Empty or whitespace text mutates nothing.
    pub fn update(&mut self, text: &str, segmenter: &dyn Segmenter) -> Result<()> {
        let tokens = segmenter.segment(text)?;
        let nouns: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is_noun())
            .map(|t| t.text.as_str())
            .collect();

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for i in 0..nouns.len().saturating_sub(1) {
            let pair = format!("{}{}", nouns[i], nouns[i + 1]);
            if self.is_valid_term(&pair, segmenter)? {
                candidates.insert(pair);
            }

            if i + 2 < nouns.len() && nouns[i + 1].chars().count() < SHORT_MIDDLE_CHARS {
                let triple = format!("{}{}{}", nouns[i], nouns[i + 1], nouns[i + 2]);
                if self.is_valid_term(&triple, segmenter)? {
                    candidates.insert(triple);
                }
            }
        }

        for term in candidates {
            if let Some(category) = categorize(&term) {
                debug!(term = %term, category = %category, "catalog term added");
                self.insert(category, term);
            }
        }

        Ok(())
    }

    /// Whether a candidate qualifies as a reusable domain term:
    /// bounded length, re-segments to at least one noun, and contains
    /// some category's trigger keyword.
    fn is_valid_term(&self, term: &str, segmenter: &dyn Segmenter) -> Result<bool> {
        let chars = term.chars().count();
        if !(MIN_TERM_CHARS..=MAX_TERM_CHARS).contains(&chars) {
            return Ok(false);
        }

        let tokens = segmenter.segment(term)?;
        if !tokens.iter().any(|t| t.is_noun()) {
            return Ok(false);
        }

        Ok(Category::ALL
            .iter()
            .any(|cat| cat.keywords().iter().any(|kw| term.contains(kw))))
    }
}

impl Default for TermCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Assign a term to the first category whose keyword list it contains,
/// falling back to method/model for 网络/算法-bearing terms.
fn categorize(term: &str) -> Option<Category> {
    for cat in Category::ALL {
        if cat.keywords().iter().any(|kw| term.contains(kw)) {
            return Some(cat);
        }
    }

    if METHOD_FALLBACK_MARKERS.iter().any(|m| term.contains(m)) {
        return Some(Category::MethodModel);
    }

    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Token;

    /// Segmenter stub tagging every whitespace-separated chunk as a noun
    struct NounStub;

    impl Segmenter for NounStub {
        fn segment(&self, text: &str) -> Result<Vec<Token>> {
            Ok(text
                .split_whitespace()
                .map(|w| Token::new(w, "n"))
                .collect())
        }
    }

    #[test]
    fn test_bootstrap_seed() {
        let catalog = TermCatalog::new();
        assert!(catalog.contains(Category::TechnicalConcept, "查询优化"));
        assert!(catalog.contains(Category::MethodModel, "图神经网络"));
        assert!(catalog.contains(Category::Organization, "清华大学出版社"));
        assert!(!catalog.contains(Category::ToolSystem, "Spark"));
    }

    #[test]
    fn test_update_adds_keyword_bearing_pairs() {
        let mut catalog = TermCatalog::new();
        catalog.update("分布式 存储", &NounStub).unwrap();
        assert!(catalog.contains(Category::TechnicalConcept, "分布式存储"));
    }

    #[test]
    fn test_update_forms_three_token_candidates() {
        let mut catalog = TermCatalog::new();
        // middle token "查询" is short enough to allow the 3-token span
        catalog.update("向量 查询 引擎", &NounStub).unwrap();
        assert!(catalog.contains(Category::TechnicalConcept, "向量查询"));
        assert!(catalog.contains(Category::TechnicalConcept, "向量查询引擎"));
    }

    #[test]
    fn test_long_middle_token_blocks_triple() {
        let mut catalog = TermCatalog::new();
        catalog.update("向量 数据库系统 引擎", &NounStub).unwrap();
        assert!(!catalog.contains(Category::TechnicalConcept, "向量数据库系统引擎"));
        // the 2-token spans are still formed
        assert!(catalog.contains(Category::TechnicalConcept, "向量数据库系统"));
    }

    #[test]
    fn test_validator_rejects_out_of_range_lengths() {
        let catalog = TermCatalog::new();
        assert!(!catalog.is_valid_term("库", &NounStub).unwrap());
        // 13 chars, contains a keyword, still rejected
        let long = "分布式数据库查询优化执行层";
        assert_eq!(long.chars().count(), 13);
        assert!(!catalog.is_valid_term(long, &NounStub).unwrap());
        assert!(catalog.is_valid_term("索引", &NounStub).unwrap());
    }

    #[test]
    fn test_validator_requires_keyword() {
        let catalog = TermCatalog::new();
        assert!(!catalog.is_valid_term("苹果香蕉", &NounStub).unwrap());
    }

    #[test]
    fn test_categorize_first_match_wins() {
        // contains both a technical-concept keyword (查询) and a
        // method/model keyword (采样); the earlier category wins
        assert_eq!(
            categorize("查询采样"),
            Some(Category::TechnicalConcept)
        );
    }

    #[test]
    fn test_categorize_method_fallback() {
        assert_eq!(categorize("对抗网络"), Some(Category::MethodModel));
        assert_eq!(categorize("聚类算法"), Some(Category::MethodModel));
        assert_eq!(categorize("苹果香蕉"), None);
    }

    #[test]
    fn test_empty_text_no_mutation() {
        let mut catalog = TermCatalog::new();
        let before = catalog.snapshot();
        catalog.update("", &NounStub).unwrap();
        catalog.update("   ", &NounStub).unwrap();
        assert_eq!(catalog.snapshot(), before);
    }

    #[test]
    fn test_update_idempotent() {
        let mut once = TermCatalog::new();
        once.update("分布式 存储 延迟 指标", &NounStub).unwrap();
        let mut twice = once.clone();
        twice.update("分布式 存储 延迟 指标", &NounStub).unwrap();
        assert_eq!(once.snapshot(), twice.snapshot());
    }
}
