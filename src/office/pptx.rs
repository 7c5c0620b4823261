//! Presentations (`.pptx`).
//!
//! Text units are text-bearing shapes (`p:sp` with a `p:txBody`), slide by
//! slide in presentation order. A shape's whole text is translated in one
//! call and written back as fresh paragraphs that reuse the first
//! paragraph's and first run's properties.

use super::package::Package;
use super::xml::{Element, Node, XmlDocument};
use crate::codec::{DocumentCodec, DocumentFormat, TranslationStats};
use crate::config::TranslateConfig;
use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use crate::translator::TranslationBridge;

const MAIN_PART: &str = "ppt/presentation.xml";
const MAIN_RELS: &str = "ppt/_rels/presentation.xml.rels";
const FORMAT: &str = "pptx";

/// Vertical tab, python-pptx style stand-in for a line break inside a
/// paragraph.
const LINE_BREAK: char = '\u{b}';

struct Slide {
    part: String,
    xml: XmlDocument,
    modified: bool,
}

/// An open presentation.
pub struct PptxDocument {
    package: Package,
    slides: Vec<Slide>,
}

impl PptxDocument {
    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Part names of the slides in presentation order.
    pub fn slide_parts(&self) -> Vec<&str> {
        self.slides.iter().map(|slide| slide.part.as_str()).collect()
    }

    /// Text of every text-bearing shape, per slide.
    pub fn shape_texts(&self) -> Vec<Vec<String>> {
        self.slides
            .iter()
            .map(|slide| {
                let mut shapes = Vec::new();
                if let Some(root) = slide.xml.root() {
                    root.find_all(&is_text_shape, &mut shapes);
                }
                shapes
                    .into_iter()
                    .filter_map(|shape| shape.child("txBody"))
                    .map(text_body_text)
                    .collect()
            })
            .collect()
    }
}

impl DocumentCodec for PptxDocument {
    const FORMAT: DocumentFormat = DocumentFormat::Pptx;

    fn open(bytes: &[u8]) -> Result<Self> {
        let package = Package::open(bytes, FORMAT)?;
        let presentation = package
            .xml(MAIN_PART)?
            .ok_or_else(|| Error::malformed(FORMAT, format!("missing {}", MAIN_PART)))?;

        let mut slides = Vec::new();
        for part in slide_order(&package, &presentation)? {
            match package.xml(&part)? {
                Some(xml) => slides.push(Slide {
                    part,
                    xml,
                    modified: false,
                }),
                None => log::warn!("Slide part {} is missing, skipping", part),
            }
        }
        log::debug!("Opened presentation with {} slides", slides.len());
        Ok(Self { package, slides })
    }

    fn translate(
        &mut self,
        bridge: &TranslationBridge<'_>,
        target: &TargetLanguage,
        _config: &TranslateConfig,
    ) -> Result<TranslationStats> {
        let mut stats = TranslationStats::default();
        for (index, slide) in self.slides.iter_mut().enumerate() {
            stats.containers += 1;
            let Some(root) = slide.xml.root_mut() else { continue };
            let mut translated = 0;
            root.for_each_mut(&is_text_shape, &mut |shape: &mut Element| -> Result<()> {
                let Some(body) = shape.child_mut("txBody") else {
                    return Ok(());
                };
                let text = text_body_text(body);
                if text.trim().is_empty() {
                    stats.units_skipped += 1;
                    return Ok(());
                }
                let result = bridge.translate(&text, target)?;
                log::debug!("Slide {} shape: {:?} -> {:?}", index + 1, text, result);
                replace_text_body(body, &result);
                translated += 1;
                Ok(())
            })?;
            stats.units_translated += translated;
            slide.modified |= translated > 0;
        }
        log::info!("PPTX translated into {}: {}", target, stats);
        Ok(stats)
    }

    fn serialize(mut self) -> Result<Vec<u8>> {
        for slide in self.slides.iter().filter(|slide| slide.modified) {
            let bytes = slide.xml.to_bytes(FORMAT)?;
            self.package.replace(&slide.part, bytes);
        }
        self.package.to_bytes()
    }
}

fn is_text_shape(el: &Element) -> bool {
    el.is("sp") && el.child("txBody").is_some()
}

/// Slide part names in presentation order.
///
/// Uses `sldIdLst` resolved through the presentation relationships, or the
/// numeric order of `ppt/slides/slideN.xml` when that is unavailable.
fn slide_order(package: &Package, presentation: &XmlDocument) -> Result<Vec<String>> {
    let ids: Vec<String> = presentation
        .root()
        .and_then(|root| root.child("sldIdLst"))
        .map(|list| {
            list.elements()
                .filter(|el| el.is("sldId"))
                .filter_map(|el| el.attr("r:id"))
                .collect()
        })
        .unwrap_or_default();

    if !ids.is_empty() {
        if let Some(rels) = package.xml(MAIN_RELS)? {
            let targets: Vec<(String, String)> = rels
                .root()
                .map(|root| {
                    root.elements()
                        .filter(|el| el.is("Relationship"))
                        .filter_map(|el| Some((el.attr("Id")?, el.attr("Target")?)))
                        .collect()
                })
                .unwrap_or_default();
            let ordered: Vec<String> = ids
                .iter()
                .filter_map(|id| {
                    let target = targets.iter().find(|(rel_id, _)| rel_id == id).map(|(_, t)| t);
                    if target.is_none() {
                        log::warn!("Slide relationship {} not found", id);
                    }
                    target.map(|t| resolve_target("ppt", t))
                })
                .collect();
            if !ordered.is_empty() {
                return Ok(ordered);
            }
        }
        log::warn!("Could not resolve slide list, falling back to part names");
    }

    let mut numbered: Vec<(u32, String)> = package
        .names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Paragraphs joined by `\n`; `a:br` inside a paragraph becomes `\u{b}`.
pub fn text_body_text(body: &Element) -> String {
    body.elements()
        .filter(|el| el.is("p"))
        .map(|paragraph| {
            let mut line = String::new();
            for piece in paragraph.elements() {
                if piece.is("r") || piece.is("fld") {
                    if let Some(t) = piece.child("t") {
                        line.push_str(&t.text());
                    }
                } else if piece.is("br") {
                    line.push(LINE_BREAK);
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace the paragraphs of a text body with `text`.
pub fn replace_text_body(body: &mut Element, text: &str) {
    let first_paragraph = body.elements().find(|el| el.is("p")).cloned();
    let paragraph_name = first_paragraph
        .as_ref()
        .map(|p| p.name().into_owned())
        .unwrap_or_else(|| "a:p".to_string());
    let paragraph_props = first_paragraph.as_ref().and_then(|p| p.child("pPr")).cloned();
    let end_props = first_paragraph.as_ref().and_then(|p| p.child("endParaRPr")).cloned();
    let run_props = first_paragraph
        .as_ref()
        .and_then(|p| p.elements().find(|el| el.is("r") || el.is("fld")))
        .and_then(|run| run.child("rPr"))
        .cloned();

    let template = Element::new(paragraph_name);
    let paragraphs: Vec<Element> = text
        .split('\n')
        .map(|line| {
            let mut paragraph = template.clone();
            if let Some(props) = &paragraph_props {
                paragraph.push(props.clone());
            }
            for (i, segment) in line.trim_end_matches('\r').split(LINE_BREAK).enumerate() {
                if i > 0 {
                    let mut br = Element::new(template.sibling_name("br"));
                    if let Some(props) = &run_props {
                        br.push(props.clone());
                    }
                    paragraph.push(br);
                }
                if !segment.is_empty() {
                    let mut run = Element::new(template.sibling_name("r"));
                    if let Some(props) = &run_props {
                        run.push(props.clone());
                    }
                    let mut t = Element::new(template.sibling_name("t"));
                    t.set_text(segment);
                    run.push(t);
                    paragraph.push(run);
                }
            }
            if let Some(props) = &end_props {
                paragraph.push(props.clone());
            }
            paragraph
        })
        .collect();

    let children = std::mem::take(&mut body.children);
    let mut kept = Vec::with_capacity(children.len() + paragraphs.len());
    let mut pending = Some(paragraphs);
    for node in children {
        match node {
            Node::Element(el) if el.is("p") => {
                if let Some(paragraphs) = pending.take() {
                    kept.extend(paragraphs.into_iter().map(Node::Element));
                }
            },
            other => kept.push(other),
        }
    }
    if let Some(paragraphs) = pending {
        kept.extend(paragraphs.into_iter().map(Node::Element));
    }
    body.children = kept;
    body.empty = false;
}
