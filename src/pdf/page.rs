//! A page of an open PDF: decoded content plus the commit of a patch.

use super::interpreter::LayoutInterpreter;
use super::layout::TextPage;
use super::objects;
use super::patcher::PagePatch;
use super::resources::PageResources;
use crate::config::TranslateConfig;
use crate::content::inline_image::INLINE_IMAGE;
use crate::content::{count_operators, split_inline_images, ContentSegment};
use crate::error::{Error, Result};
use crate::geometry::PageSpace;
use crate::writer::{compress_data, ContentStreamBuilder, FontRegistry};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Pen adjustments smaller than this are not worth a `TJ`.
const MIN_PEN_ADJUSTMENT: f32 = 1e-3;

/// One loaded page.
#[derive(Debug)]
pub struct PdfPage {
    /// Page number, starting at 1
    pub number: u32,
    /// Page object id
    pub id: ObjectId,
    /// Coordinate conversion fixed from the MediaBox
    pub space: PageSpace,
    resources: PageResources,
    operations: Vec<Operation>,
    /// Raw `BI` ... `EI` bytes, indexed by the placeholder operand
    inline_images: Vec<Vec<u8>>,
    /// False when decoding stopped before the end of the content
    complete: bool,
}

impl PdfPage {
    /// Decode a page's content streams and resources.
    ///
    /// Inline images are kept as raw bytes behind `BI` placeholder
    /// operations. A stretch of content `lopdf` decodes only in part ends
    /// decoding there and marks the page incomplete.
    pub fn load(doc: &Document, number: u32, id: ObjectId) -> Result<Self> {
        let space = media_box(doc, id).map(PageSpace::from_media_box).unwrap_or_else(|| {
            log::warn!("Page {} has no usable MediaBox, assuming US Letter", number);
            PageSpace::letter()
        });

        let bytes = content_bytes(doc, id);
        let mut operations = Vec::new();
        let mut inline_images = Vec::new();
        let mut complete = true;
        for segment in split_inline_images(&bytes) {
            match segment {
                ContentSegment::Operators(chunk) => {
                    let decoded = Content::decode(chunk)
                        .map_err(|e| Error::malformed("pdf", format!("page {} content stream: {}", number, e)))?
                        .operations;
                    let expected = count_operators(chunk);
                    let short = decoded.len() < expected;
                    if short {
                        log::warn!(
                            "Page {}: decoded {} of {} operators in a content stretch, original content will be kept as is",
                            number,
                            decoded.len(),
                            expected
                        );
                    }
                    operations.extend(decoded);
                    if short {
                        complete = false;
                        break;
                    }
                },
                ContentSegment::InlineImage(image) => {
                    let slot = Object::Integer(inline_images.len() as i64);
                    operations.push(Operation::new(INLINE_IMAGE, vec![slot]));
                    inline_images.push(image.to_vec());
                },
            }
        }
        log::trace!(
            "Page {}: {} operators, {} inline images",
            number,
            operations.len(),
            inline_images.len()
        );

        Ok(Self {
            number,
            id,
            space,
            resources: PageResources::load(doc, id),
            operations,
            inline_images,
            complete,
        })
    }

    /// Decoded content operators.
    ///
    /// Each inline image appears as a `BI` operation whose only operand is
    /// its slot number.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether the whole content was decoded.
    pub fn is_fully_decoded(&self) -> bool {
        self.complete
    }

    /// Build the page layout.
    pub fn text_page(&self) -> TextPage {
        LayoutInterpreter::new(&self.resources, self.space).run(&self.operations)
    }

    /// Write a patch into the document.
    ///
    /// The page gets a single new content stream: the original operators,
    /// with erased text-showing operators reduced to pen moves, wrapped in
    /// `q`/`Q`, followed by the cover layer and then the text layer. An
    /// empty patch leaves the page untouched.
    ///
    /// A page that was not fully decoded keeps its content streams. They are
    /// wrapped in `q`/`Q` by two new streams and the second one carries the
    /// cover and text layers, so nothing is erased.
    pub fn commit(&self, doc: &mut Document, patch: &PagePatch, config: &TranslateConfig) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut resources = objects::inherited(doc, self.id, b"Resources")
            .and_then(objects::as_dict)
            .cloned()
            .unwrap_or_default();
        let mut fonts = objects::get_dict(doc, &resources, b"Font").cloned().unwrap_or_default();
        let mut registry = FontRegistry::new(fonts.iter().map(|(name, _)| String::from_utf8_lossy(name).into_owned()));

        let mut overlay = ContentStreamBuilder::new();
        overlay.save_state().fill_color(config.cover_color);
        for op in &patch.overlays {
            let (x, y, width, height) = self.space.rect_to_user(&op.cover);
            overlay.fill_rect(x, y, width, height);
        }
        overlay.fill_color(config.text_color);
        for op in patch.overlays.iter().filter(|op| !op.text.is_empty()) {
            let name = registry.resource_name(op.font);
            let (encoded, hex) = op.font.encode(&op.text);
            let baseline = self.space.to_user(op.baseline_origin.x, op.baseline_origin.y);
            overlay
                .set_font(&name, op.font_size)
                .text(encoded, hex, baseline.x, baseline.y);
        }
        overlay.end_text().restore_state();

        let contents = if self.complete {
            let mut operations = self.original_layer(patch);
            operations.extend(overlay.to_operations());
            Object::Reference(self.add_content(doc, operations)?)
        } else {
            log::warn!("Page {}: drawing translations over the original text", self.number);
            let originals = content_references(doc, self.id);
            let mut operations = vec![Operation::new("Q", vec![])];
            operations.extend(overlay.to_operations());
            let mut contents = vec![Object::Reference(
                self.add_content(doc, vec![Operation::new("q", vec![])])?,
            )];
            contents.extend(originals);
            contents.push(Object::Reference(self.add_content(doc, operations)?));
            Object::Array(contents)
        };

        registry.install(doc, &mut fonts);
        resources.set("Font", Object::Dictionary(fonts));

        let page = doc
            .get_object_mut(self.id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| Error::serialization("pdf", format!("page {}: {}", self.number, e)))?;
        page.set("Contents", contents);
        page.set("Resources", Object::Dictionary(resources));

        log::debug!(
            "Page {}: committed {} overlays, {} operators erased, {} fonts added",
            self.number,
            patch.overlays.len(),
            if self.complete { patch.erased.len() } else { 0 },
            registry.len()
        );
        Ok(())
    }

    /// Encode, compress and add a content stream.
    fn add_content(&self, doc: &mut Document, operations: Vec<Operation>) -> Result<ObjectId> {
        let encoded = self.encode(operations)?;
        let compressed = compress_data(&encoded).map_err(|e| Error::serialization("pdf", e))?;
        Ok(doc.add_object(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed)))
    }

    /// Encode operators, splicing inline images back in at their placeholders.
    fn encode(&self, operations: Vec<Operation>) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut run = Vec::new();
        for op in operations {
            match self.inline_image(&op) {
                Some(image) => {
                    self.encode_run(std::mem::take(&mut run), &mut bytes)?;
                    bytes.extend_from_slice(image);
                    bytes.push(b'\n');
                },
                None => run.push(op),
            }
        }
        self.encode_run(run, &mut bytes)?;
        Ok(bytes)
    }

    fn encode_run(&self, operations: Vec<Operation>, out: &mut Vec<u8>) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        let encoded = Content { operations }
            .encode()
            .map_err(|e| Error::serialization("pdf", format!("page {}: {}", self.number, e)))?;
        out.extend_from_slice(&encoded);
        out.push(b'\n');
        Ok(())
    }

    fn inline_image(&self, op: &Operation) -> Option<&[u8]> {
        if op.operator != INLINE_IMAGE {
            return None;
        }
        let slot = op.operands.first()?.as_i64().ok()?;
        self.inline_images.get(usize::try_from(slot).ok()?).map(Vec::as_slice)
    }

    /// Original operators inside `q`/`Q`, erased ones replaced.
    fn original_layer(&self, patch: &PagePatch) -> Vec<Operation> {
        let erased: HashMap<usize, f32> = patch
            .erased
            .iter()
            .map(|source| (source.op_index, source.pen_adjustment))
            .collect();

        let mut out = Vec::with_capacity(self.operations.len() + 2);
        out.push(Operation::new("q", vec![]));
        let mut depth = 0usize;
        for (index, op) in self.operations.iter().enumerate() {
            match op.operator.as_str() {
                "q" => depth += 1,
                "Q" if depth == 0 => {
                    log::trace!("Dropping unbalanced Q at operator {}", index);
                    continue;
                },
                "Q" => depth -= 1,
                _ => {},
            }
            match erased.get(&index) {
                Some(&pen_adjustment) => out.extend(erase(op, pen_adjustment)),
                None => out.push(op.clone()),
            }
        }
        out.extend((0..depth).map(|_| Operation::new("Q", vec![])));
        out.push(Operation::new("Q", vec![]));
        out
    }
}

/// Replacement for a text-showing operator that keeps its line and pen
/// effects but paints nothing.
fn erase(op: &Operation, pen_adjustment: f32) -> Vec<Operation> {
    let mut out = Vec::with_capacity(4);
    match op.operator.as_str() {
        "'" => out.push(Operation::new("T*", vec![])),
        "\"" => {
            if let [word_space, char_space, ..] = op.operands.as_slice() {
                out.push(Operation::new("Tw", vec![word_space.clone()]));
                out.push(Operation::new("Tc", vec![char_space.clone()]));
            }
            out.push(Operation::new("T*", vec![]));
        },
        _ => {},
    }
    if pen_adjustment.abs() > MIN_PEN_ADJUSTMENT {
        out.push(Operation::new("TJ", vec![Object::Array(vec![Object::Real(pen_adjustment)])]));
    }
    out
}

fn media_box(doc: &Document, id: ObjectId) -> Option<[f32; 4]> {
    match objects::inherited(doc, id, b"MediaBox")? {
        Object::Array(items) if items.len() == 4 => {
            let mut values = [0.0; 4];
            for (slot, item) in values.iter_mut().zip(items) {
                *slot = objects::resolve(doc, item).and_then(objects::number)?;
            }
            Some(values)
        },
        _ => None,
    }
}

/// The page's content streams as references, in drawing order.
///
/// A direct stream is moved into its own object so it can be referenced.
fn content_references(doc: &mut Document, id: ObjectId) -> Vec<Object> {
    let contents = doc
        .get_object(id)
        .ok()
        .and_then(objects::as_dict)
        .and_then(|page| page.get(b"Contents").ok())
        .cloned();
    match contents {
        Some(Object::Reference(target)) => match doc.get_object(target) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(target)],
        },
        Some(Object::Array(items)) => items,
        Some(Object::Stream(stream)) => vec![Object::Reference(doc.add_object(stream))],
        _ => Vec::new(),
    }
}

/// Concatenated, decoded content streams of a page.
fn content_bytes(doc: &Document, id: ObjectId) -> Vec<u8> {
    let Some(page) = doc.get_object(id).ok().and_then(objects::as_dict) else {
        return Vec::new();
    };
    let streams: Vec<&Stream> = match objects::get(doc, page, b"Contents") {
        Some(Object::Stream(stream)) => vec![stream],
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|item| match objects::resolve(doc, item) {
                Some(Object::Stream(stream)) => Some(stream),
                _ => None,
            })
            .collect(),
        Some(_) => {
            log::warn!("Page {:?} /Contents is neither a stream nor an array, ignoring", id);
            Vec::new()
        },
        None => Vec::new(),
    };

    let mut bytes = Vec::new();
    for stream in streams {
        if let Some(content) = objects::stream_content(stream) {
            bytes.extend_from_slice(&content);
            bytes.push(b'\n');
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Rect};
    use crate::pdf::layout::ShowRef;
    use crate::pdf::patcher::OverlayOp;
    use crate::writer::FontChoice;

    fn one_page(content: &str) -> (Document, ObjectId) {
        one_page_bytes(content.as_bytes())
    }

    fn one_page_bytes(content: &[u8]) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            }),
        );
        (doc, page_id)
    }

    fn overlay(text: &str) -> OverlayOp {
        OverlayOp {
            origin: Point::new(100.0, 74.768),
            baseline_origin: Point::new(100.0, 92.0),
            cover: Rect::new(99.5, 74.268, 55.672, 23.2),
            text: text.to_string(),
            font: FontChoice::choose("Helvetica", text, &crate::TargetLanguage::German, "Helvetica"),
            font_size: 24.0,
        }
    }

    #[test]
    fn test_load_reads_media_box_and_operations() {
        let (doc, id) = one_page("BT /F1 24 Tf 100 700 Td (Hello) Tj ET");
        let page = PdfPage::load(&doc, 1, id).unwrap();
        assert_eq!(page.space.height(), 792.0);
        assert_eq!(page.operations().len(), 5);
        assert_eq!(page.text_page().text(), "Hello");
    }

    #[test]
    fn test_empty_patch_leaves_page_untouched() {
        let (mut doc, id) = one_page("BT /F1 24 Tf 100 700 Td (Hello) Tj ET");
        let before = doc.get_object(id).unwrap().clone();
        let page = PdfPage::load(&doc, 1, id).unwrap();
        page.commit(&mut doc, &PagePatch::default(), &TranslateConfig::default()).unwrap();
        assert_eq!(doc.get_object(id).unwrap(), &before);
    }

    #[test]
    fn test_commit_erases_and_redraws() {
        let (mut doc, id) = one_page("BT /F1 24 Tf 100 700 Td (Hello) Tj ET");
        let page = PdfPage::load(&doc, 1, id).unwrap();
        let patch = PagePatch {
            overlays: vec![overlay("Hallo")],
            erased: vec![ShowRef {
                op_index: 3,
                pen_adjustment: -2278.0,
            }],
        };
        page.commit(&mut doc, &patch, &TranslateConfig::default()).unwrap();

        let reloaded = PdfPage::load(&doc, 1, id).unwrap();
        let ops: Vec<&str> = reloaded.operations().iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops.first(), Some(&"q"));
        assert!(ops.contains(&"re"));
        assert!(!reloaded
            .operations()
            .iter()
            .any(|op| op.operator == "Tj" && op.operands == vec![Object::string_literal("Hello")]));
        assert_eq!(reloaded.text_page().text(), "Hallo");

        let layout = reloaded.text_page();
        let span = layout.spans().next().unwrap();
        assert!((span.baseline_origin.x - 100.0).abs() < 0.01);
        assert!((span.baseline_origin.y - 92.0).abs() < 0.01);
        assert_eq!(span.font_size, 24.0);
    }

    #[test]
    fn test_commit_balances_unclosed_save() {
        let (mut doc, id) = one_page("q 1 0 0 1 50 50 cm BT /F1 12 Tf (Hi) Tj ET");
        let page = PdfPage::load(&doc, 1, id).unwrap();
        let patch = PagePatch {
            overlays: vec![overlay("Servus")],
            erased: vec![],
        };
        page.commit(&mut doc, &patch, &TranslateConfig::default()).unwrap();

        let reloaded = PdfPage::load(&doc, 1, id).unwrap();
        let saves = reloaded.operations().iter().filter(|op| op.operator == "q").count();
        let restores = reloaded.operations().iter().filter(|op| op.operator == "Q").count();
        assert_eq!(saves, restores);
        assert!(reloaded.text_page().text().contains("Servus"));
    }

    const WITH_IMAGE: &[u8] = b"BT /F1 24 Tf 100 700 Td (Hello) Tj ET \
        q 20 0 0 20 50 50 cm BI /W 2 /H 2 /BPC 8 /CS /G ID \x00\xffEI\x10 EI Q \
        0 0 1 rg 10 10 200 100 re f";

    fn hello_patch() -> PagePatch {
        PagePatch {
            overlays: vec![overlay("Hallo")],
            erased: vec![ShowRef {
                op_index: 3,
                pen_adjustment: -2278.0,
            }],
        }
    }

    #[test]
    fn test_load_keeps_inline_image_and_later_operators() {
        let (doc, id) = one_page_bytes(WITH_IMAGE);
        let page = PdfPage::load(&doc, 1, id).unwrap();
        assert!(page.is_fully_decoded());
        let ops: Vec<&str> = page.operations().iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(ops, vec!["BT", "Tf", "Td", "Tj", "ET", "q", "cm", "BI", "Q", "rg", "re", "f"]);
        assert_eq!(page.inline_images, vec![b"BI /W 2 /H 2 /BPC 8 /CS /G ID \x00\xffEI\x10 EI".to_vec()]);
        assert_eq!(page.text_page().blocks.len(), 2);
    }

    #[test]
    fn test_commit_keeps_inline_image_bytes() {
        let (mut doc, id) = one_page_bytes(WITH_IMAGE);
        let page = PdfPage::load(&doc, 1, id).unwrap();
        page.commit(&mut doc, &hello_patch(), &TranslateConfig::default()).unwrap();

        let reloaded = PdfPage::load(&doc, 1, id).unwrap();
        assert!(reloaded.is_fully_decoded());
        assert_eq!(reloaded.inline_images, page.inline_images);
        let ops: Vec<&str> = reloaded.operations().iter().map(|op| op.operator.as_str()).collect();
        assert!(ops.contains(&"BI"));
        assert!(ops.contains(&"rg"));
        assert!(ops.contains(&"f"));
        assert_eq!(reloaded.text_page().text(), "Hallo");
    }

    #[test]
    fn test_partially_decoded_page_draws_over_original_streams() {
        let (mut doc, id) = one_page("BT /F1 24 Tf 100 700 Td (Hello) Tj ET");
        let original = doc.get_dictionary(id).unwrap().get(b"Contents").unwrap().clone();
        let mut page = PdfPage::load(&doc, 1, id).unwrap();
        page.complete = false;
        page.commit(&mut doc, &hello_patch(), &TranslateConfig::default()).unwrap();

        let contents = doc.get_dictionary(id).unwrap().get(b"Contents").unwrap().as_array().unwrap().clone();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1], original);

        let reloaded = PdfPage::load(&doc, 1, id).unwrap();
        let ops = reloaded.operations();
        assert_eq!(ops.first().map(|op| op.operator.as_str()), Some("q"));
        assert!(ops.iter().any(|op| op.operator == "Tj" && op.operands == vec![Object::string_literal("Hello")]));
        let text = reloaded.text_page().text();
        assert!(text.contains("Hello"));
        assert!(text.contains("Hallo"));
    }

    #[test]
    fn test_erase_quote_keeps_line_moves() {
        let op = Operation::new("\"", vec![Object::Integer(2), Object::Integer(1), Object::string_literal("x")]);
        let ops: Vec<String> = erase(&op, -500.0).into_iter().map(|op| op.operator).collect();
        assert_eq!(ops, vec!["Tw", "Tc", "T*", "TJ"]);

        let op = Operation::new("Tj", vec![Object::string_literal("")]);
        assert!(erase(&op, 0.0).is_empty());
    }
}
