//! Part-of-speech segmentation seam
//!
//! The extraction core consumes segmentation as a black box: a function
//! from text to (token, part-of-speech tag) pairs. The default
//! implementation wraps jieba's POS tagger; tests substitute their own.

use deckmine_core::Result;
use jieba_rs::Jieba;

/// A segmented token with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// jieba-style POS tag; noun classes start with 'n'
    pub pos: String,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: pos.into(),
        }
    }

    /// Whether the tag indicates a noun class (n, nr, ns, nt, nz, ...)
    pub fn is_noun(&self) -> bool {
        self.pos.starts_with('n')
    }
}

/// Trait for text segmenters producing (token, POS) pairs
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<Vec<Token>>;
}

/// Segmenter backed by jieba's POS tagging
pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl JiebaSegmenter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<Token>> {
        let tags = self.jieba.tag(text, true);
        Ok(tags
            .into_iter()
            .map(|t| Token::new(t.word, t.tag))
            .collect())
    }
}
