//! Deckmine Parser - Slide-deck text extraction
//!
//! Reads PPTX files (zipped OOXML) and returns the text of each slide
//! in slide order. Text is collected per shape: runs are concatenated,
//! paragraphs are joined with newlines, and shapes with no text are
//! skipped. This crate owns no extraction logic beyond reading the
//! format; everything downstream happens in `deckmine-extractor`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

use deckmine_core::SlidePage;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while reading a slide deck
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File is corrupted or not a PPTX archive: {0}")]
    CorruptedFile(String),

    #[error("Slide XML error: {0}")]
    XmlError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// PPTX Parser
// ============================================================================

/// PPTX slide-text reader
pub struct PptxParser;

impl PptxParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every slide, in slide order.
    ///
    /// Pages are numbered 1..=N over the sorted slide entries.
    pub fn parse(&self, path: &Path) -> Result<Vec<SlidePage>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if extension.as_deref() != Some("pptx") {
            return Err(ParserError::UnsupportedFormat(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut archive =
            ZipArchive::new(file).map_err(|e| ParserError::CorruptedFile(e.to_string()))?;

        // slide entries are not stored in order inside the archive
        let mut entries: Vec<(usize, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        entries.sort_by_key(|(n, _)| *n);

        let mut pages = Vec::with_capacity(entries.len());
        for (index, (_, name)) in entries.iter().enumerate() {
            let mut xml = String::new();
            archive
                .by_name(name)
                .map_err(|e| ParserError::CorruptedFile(e.to_string()))?
                .read_to_string(&mut xml)
                .map_err(|e| ParserError::IoError {
                    path: name.clone(),
                    source: e,
                })?;

            pages.push(SlidePage::new(index + 1, extract_slide_text(&xml)?));
        }

        Ok(pages)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide number for archive entries of the form `ppt/slides/slideN.xml`
fn slide_number(name: &str) -> Option<usize> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Collect shape text from one slide's XML.
///
/// Runs (`a:t`) within a shape are concatenated, paragraphs (`a:p`) are
/// separated by newlines, and shapes (`p:sp`) whose text trims to empty
/// are dropped.
fn extract_slide_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);

    let mut shapes: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_shape = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"p:sp" => {
                    in_shape = true;
                    current.clear();
                }
                b"a:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ParserError::XmlError(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" if in_shape => current.push('\n'),
                b"p:sp" => {
                    let text = current.trim();
                    if !text.is_empty() {
                        shapes.push(text.to_string());
                    }
                    in_shape = false;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParserError::XmlError(e.to_string())),
            _ => {}
        }
    }

    Ok(shapes.join("\n"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn slide_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(
            "<p:sld><p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"
        )
    }

    fn write_pptx(slides: &[String]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        // deliberately out of order to exercise sorting
        for (i, xml) in slides.iter().enumerate().rev() {
            writer
                .start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        dir
    }

    #[test]
    fn test_extract_slide_text_joins_paragraphs() {
        let xml = slide_xml(&["查询优化", "基数估计"]);
        let text = extract_slide_text(&xml).unwrap();
        assert_eq!(text, "查询优化\n基数估计");
    }

    #[test]
    fn test_blank_shapes_are_skipped() {
        let xml = "<p:sld><p:spTree>\
            <p:sp><p:txBody><a:p><a:r><a:t>  </a:t></a:r></a:p></p:txBody></p:sp>\
            <p:sp><p:txBody><a:p><a:r><a:t>分布式数据库</a:t></a:r></a:p></p:txBody></p:sp>\
            </p:spTree></p:sld>";
        let text = extract_slide_text(xml).unwrap();
        assert_eq!(text, "分布式数据库");
    }

    #[test]
    fn test_parse_orders_slides() {
        let slides = vec![slide_xml(&["第一页"]), slide_xml(&["第二页"])];
        let dir = write_pptx(&slides);

        let pages = PptxParser::new()
            .parse(&dir.path().join("deck.pptx"))
            .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 1);
        assert_eq!(pages[0].text, "第一页");
        assert_eq!(pages[1].page, 2);
        assert_eq!(pages[1].text, "第二页");
    }

    #[test]
    fn test_rejects_non_pptx_extension() {
        let err = PptxParser::new().parse(Path::new("notes.pdf")).unwrap_err();
        assert!(matches!(err, ParserError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_slide_number() {
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
    }
}
