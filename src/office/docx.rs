//! Word-processing documents (`.docx`).
//!
//! Text units are the paragraphs of the main document part, in document
//! order, including paragraphs in table cells. A translated paragraph keeps
//! its paragraph properties and the formatting of its first text run; the
//! other runs' text is dropped. This collapses mixed formatting inside a
//! paragraph into one style.

use super::package::Package;
use super::xml::{Element, Node, XmlDocument};
use crate::codec::{DocumentCodec, DocumentFormat, TranslationStats};
use crate::config::TranslateConfig;
use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;

const MAIN_PART: &str = "word/document.xml";
const FORMAT: &str = "docx";

/// Elements that hold runs without being runs themselves.
const RUN_CONTAINERS: &[&str] = &["hyperlink", "ins", "smartTag", "fldSimple", "customXml", "sdt", "sdtContent"];

/// An open word-processing document.
pub struct DocxDocument {
    package: Package,
    document: XmlDocument,
    modified: bool,
}

impl DocxDocument {
    /// Paragraph texts in document order.
    pub fn paragraphs(&self) -> Vec<String> {
        let mut found = Vec::new();
        if let Some(body) = self.document.root().and_then(|root| root.child("body")) {
            body.find_all(&|el: &Element| el.is("p"), &mut found);
        }
        found.into_iter().map(paragraph_text).collect()
    }
}

impl DocumentCodec for DocxDocument {
    const FORMAT: DocumentFormat = DocumentFormat::Docx;

    fn open(bytes: &[u8]) -> Result<Self> {
        let package = Package::open(bytes, FORMAT)?;
        let document = package
            .xml(MAIN_PART)?
            .ok_or_else(|| Error::malformed(FORMAT, format!("missing {}", MAIN_PART)))?;
        Ok(Self {
            package,
            document,
            modified: false,
        })
    }

    fn translate(
        &mut self,
        bridge: &TranslationBridge<'_>,
        target: &TargetLanguage,
        _config: &TranslateConfig,
    ) -> Result<TranslationStats> {
        let mut stats = TranslationStats::default();
        let Some(body) = self.document.root_mut().and_then(|root| root.child_mut("body")) else {
            log::warn!("{} has no body", MAIN_PART);
            return Ok(stats);
        };

        body.for_each_mut(&|el: &Element| el.is("p"), &mut |paragraph: &mut Element| -> Result<()> {
            stats.containers += 1;
            let text = paragraph_text(paragraph);
            if text.trim().is_empty() {
                stats.units_skipped += 1;
                return Ok(());
            }
            let translated = bridge.translate(&text, target)?;
            log::debug!("Paragraph {}: {:?} -> {:?}", stats.containers, text, translated);
            replace_paragraph_text(paragraph, &translated);
            stats.units_translated += 1;
            Ok(())
        })?;

        self.modified |= stats.units_translated > 0;
        log::info!("DOCX translated into {}: {}", target, stats);
        Ok(stats)
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        if self.modified {
            let bytes = self.document.to_bytes(FORMAT)?;
            self.package.replace(MAIN_PART, bytes);
        }
        self.package.to_bytes()
    }
}

/// Text of a paragraph: `t` text, `tab` as `\t`, `br`/`cr` as `\n`.
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut out = String::new();
    collect_runs(paragraph, &mut out);
    out
}

fn collect_runs(container: &Element, out: &mut String) {
    for child in container.elements() {
        if child.is("r") {
            for text in child.elements().filter_map(piece_text) {
                out.push_str(&text);
            }
        } else if is_run_container(child) {
            collect_runs(child, out);
        }
    }
}

fn is_run_container(el: &Element) -> bool {
    RUN_CONTAINERS.iter().any(|local| el.is(local))
}

/// Text contributed by a run child, or `None` if it is not a text piece.
fn piece_text(piece: &Element) -> Option<String> {
    if piece.is("t") {
        Some(piece.text())
    } else if piece.is("tab") {
        Some("\t".to_string())
    } else if piece.is("br") || piece.is("cr") {
        Some("\n".to_string())
    } else {
        None
    }
}

fn is_text_piece(el: &Element) -> bool {
    el.is("t") || el.is("tab") || el.is("br") || el.is("cr")
}

fn has_text_piece(run: &Element) -> bool {
    run.elements().any(is_text_piece)
}

/// Replace a paragraph's text, keeping the first text run's properties.
pub fn replace_paragraph_text(paragraph: &mut Element, text: &str) {
    let mut replacement = Some(text);
    rewrite_runs(paragraph, &mut replacement);
}

fn rewrite_runs(container: &mut Element, replacement: &mut Option<&str>) {
    let children = std::mem::take(&mut container.children);
    let mut kept = Vec::with_capacity(children.len());
    for node in children {
        match node {
            Node::Element(mut run) if run.is("r") && has_text_piece(&run) => {
                let receives_text = replacement.take();
                let keep = strip_text(&mut run, receives_text);
                if keep {
                    kept.push(Node::Element(run));
                }
            },
            Node::Element(mut el) if is_run_container(&el) => {
                rewrite_runs(&mut el, replacement);
                kept.push(Node::Element(el));
            },
            other => kept.push(other),
        }
    }
    container.children = kept;
}

/// Remove a run's text pieces, inserting `text` where the first one was.
/// Returns whether the run still has a reason to exist.
fn strip_text(run: &mut Element, text: Option<&str>) -> bool {
    let mut pending = text.map(|text| text_pieces(run, text));
    let receives_text = pending.is_some();

    let children = std::mem::take(&mut run.children);
    let mut kept = Vec::with_capacity(children.len());
    for node in children {
        match node {
            Node::Element(el) if is_text_piece(&el) => {
                if let Some(pieces) = pending.take() {
                    kept.extend(pieces.into_iter().map(Node::Element));
                }
            },
            other => kept.push(other),
        }
    }
    run.children = kept;

    receives_text || run.elements().any(|el| !el.is("rPr"))
}

/// `t`, `tab` and `br` elements spelling `text`, named with the run's prefix.
fn text_pieces(run: &Element, text: &str) -> Vec<Element> {
    let mut pieces = Vec::new();
    let mut segment = String::new();
    let flush = |segment: &mut String, pieces: &mut Vec<Element>| {
        if !segment.is_empty() {
            let mut t = Element::new(run.sibling_name("t")).with_attr("xml:space", "preserve");
            t.set_text(segment);
            pieces.push(t);
            segment.clear();
        }
    };
    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut segment, &mut pieces);
                pieces.push(Element::new(run.sibling_name("tab")));
            },
            '\n' => {
                flush(&mut segment, &mut pieces);
                pieces.push(Element::new(run.sibling_name("br")));
            },
            '\r' => {},
            c => segment.push(c),
        }
    }
    flush(&mut segment, &mut pieces);
    pieces
}
