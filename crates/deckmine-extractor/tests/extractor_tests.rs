//! End-to-end tests for the extraction pipeline

use deckmine_core::SlidePage;
use deckmine_extractor::{Category, RelationType, SlideDeckExtractor};

#[test]
fn longest_catalog_term_wins_over_nested_term() {
    let mut extractor = SlideDeckExtractor::new();
    extractor.insert_term(Category::TechnicalConcept, "数据库");
    extractor.insert_term(Category::TechnicalConcept, "分布式数据库");

    let entities = extractor.extract_entities("使用分布式数据库进行存储");
    let concepts = &entities[&Category::TechnicalConcept];

    assert_eq!(concepts.len(), 1);
    assert_eq!(concepts[0].text, "分布式数据库");
}

#[test]
fn relations_pair_recognized_entities_only() {
    let mut extractor = SlideDeckExtractor::new();
    extractor.insert_term(Category::TechnicalConcept, "索引");

    let text = "查询优化基于索引技术";
    let entities = extractor.extract_entities(text);
    let triples = extractor.extract_relations(text, &entities);

    assert_eq!(triples.len(), 1);
    assert_eq!(triples[0].subject, "查询优化");
    assert_eq!(triples[0].relation, RelationType::Dependency);
    assert_eq!(triples[0].object, "索引");
}

#[test]
fn relations_require_both_endpoints() {
    let extractor = SlideDeckExtractor::new();

    // 查询优化 is a bootstrap term, 索引 is not in the catalog
    let text = "查询优化基于索引技术";
    let entities = extractor.extract_entities(text);
    let triples = extractor.extract_relations(text, &entities);

    assert!(triples.is_empty());
}

#[test]
fn seeded_organization_is_matched_with_pattern_overlap() {
    let extractor = SlideDeckExtractor::new();

    let entities = extractor.extract_entities("本书由清华大学出版社出版");
    let orgs = &entities[&Category::Organization];
    assert!(orgs.iter().any(|o| o.text == "清华大学出版社"));
}

#[test]
fn document_processing_with_real_segmenter_is_idempotent() {
    let pages = vec![
        SlidePage::new(1, "分布式数据库的查询优化"),
        SlidePage::new(2, "基于直方图的基数估计方法"),
    ];

    let mut extractor = SlideDeckExtractor::new();
    let first = extractor.process_document(&pages).unwrap();
    let second = extractor.process_document(&pages).unwrap();

    // scanning the same material again teaches nothing new
    assert_eq!(first.terms, second.terms);

    // and the catalog kept every bootstrap term
    for term in ["查询优化", "基数估计", "分布式计算"] {
        assert!(first.terms[&Category::TechnicalConcept].contains(&term.to_string()));
    }
}

#[test]
fn page_results_track_pages_and_previews() {
    let long_text: String = "数据库".repeat(50);
    let pages = vec![
        SlidePage::new(1, "查询优化概述"),
        SlidePage::new(2, long_text.clone()),
    ];

    let mut extractor = SlideDeckExtractor::new();
    let result = extractor.process_document(&pages).unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[0].page, 1);
    assert_eq!(result.pages[0].preview, "查询优化概述");
    assert!(result.pages[1].preview.ends_with("..."));
    assert_eq!(result.pages[1].preview.chars().count(), 103);
}
