//! Relation extraction over recognized entities
//!
//! A fixed ordered table of (pattern, relation type) pairs is evaluated
//! independently over the text. Every pattern captures the subject span
//! as group 1 and the object span as group 2, with connectives
//! non-capturing. A match becomes a triple only when both captured spans
//! are entities recognized in the same text; duplicates from multiple
//! patterns firing on the same span pair are kept as-is.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Category;
use crate::{EntityOccurrence, RelationTriple};

// ============================================================================
// Relation Types
// ============================================================================

/// Closed set of relation-type labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// 作用 - subject is used for object
    Purpose,
    /// 依赖 - subject is based on / depends on object
    Dependency,
    /// 关联 - subject is combined or compared with object
    Association,
    /// 影响 - subject increases/decreases object
    Influence,
    /// 组成 - subject is a component of object
    Composition,
    /// 角色 - subject plays a role in object
    Role,
    /// 关系 - generic relatedness
    Related,
}

impl RelationType {
    /// Chinese label used in output records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purpose => "作用",
            Self::Dependency => "依赖",
            Self::Association => "关联",
            Self::Influence => "影响",
            Self::Composition => "组成",
            Self::Role => "角色",
            Self::Related => "关系",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Rule-based relation matcher
// ============================================================================

/// Extracts relation triples via the fixed pattern table
pub struct RelationMatcher {
    patterns: Vec<(Regex, RelationType)>,
}

impl RelationMatcher {
    pub fn new() -> Self {
        let mut matcher = Self {
            patterns: Vec::new(),
        };
        matcher.init_patterns();
        matcher
    }

    /// The ordered pattern table. Object spans followed by an optional
    /// type word (技术/方法/模型 and the like) are captured lazily so the
    /// type word is not folded into the object.
    fn init_patterns(&mut self) {
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:主要用于|专门用于|适用于|用于)([\w一-龥]{2,10})",
            RelationType::Purpose,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:基于|依赖于|建立在)([\w一-龥]{2,10}?)(?:技术|方法|模型)?",
            RelationType::Dependency,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:与|和)([\w一-龥]{2,10}?)(?:的)?(?:结合|对比|比较)",
            RelationType::Association,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:显著|明显)?(?:提高|降低|减少|增加)([\w一-龥]{2,10})",
            RelationType::Influence,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})是([\w一-龥]{2,10}?)(?:的)?(?:组成部分|关键要素)",
            RelationType::Composition,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})在([\w一-龥]{2,10}?)(?:中)?(?:扮演角色|起到作用|关键作用)?",
            RelationType::Role,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:对|作用于)([\w一-龥]{2,10})",
            RelationType::Purpose,
        );
        self.add_pattern(
            r"([\w一-龥]{2,10})(?:与|和)([\w一-龥]{2,10}?)(?:有)?关系",
            RelationType::Related,
        );
    }

    fn add_pattern(&mut self, pattern: &str, relation: RelationType) {
        let regex = Regex::new(pattern).expect("relation pattern is valid");
        self.patterns.push((regex, relation));
    }

    /// Extract (subject, relation, object) triples from `text`.
    ///
    /// `entities` is the matcher output for the same text; a pattern
    /// match is kept only when both captured spans are entity texts.
    /// Non-CJK or otherwise unparseable text simply yields no matches.
    pub fn extract(
        &self,
        text: &str,
        entities: &BTreeMap<Category, Vec<EntityOccurrence>>,
    ) -> Vec<RelationTriple> {
        let current: HashSet<&str> = entities
            .values()
            .flatten()
            .map(|e| e.text.as_str())
            .collect();

        let mut triples = Vec::new();
        for (regex, relation) in &self.patterns {
            for caps in regex.captures_iter(text) {
                let subject = &caps[1];
                let object = &caps[2];
                debug!(subject, relation = %relation, object, "relation candidate");

                if current.contains(subject) && current.contains(object) {
                    triples.push(RelationTriple {
                        subject: subject.to_string(),
                        relation: *relation,
                        object: object.to_string(),
                    });
                }
            }
        }

        triples
    }
}

impl Default for RelationMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
