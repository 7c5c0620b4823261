//! Font dictionary decoding.
//!
//! [`FontInfo`] carries what the run extractor needs from a page font:
//! how to split a string into character codes, how to turn codes into
//! Unicode, glyph advance widths, and vertical extents for bounding boxes.

use super::cmap::ToUnicode;
use super::encoding::{decode_utf16be, winansi_to_unicode};
use super::standard14::{Family, StandardFont};
use crate::pdf::objects;
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

/// Default advance for simple fonts without width information (1/1000 em).
const DEFAULT_SIMPLE_WIDTH: f32 = 500.0;
/// Default `/DW` for CID fonts.
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// How string bytes map to character codes.
#[derive(Debug, Clone, PartialEq)]
pub enum FontEncoding {
    /// Simple font: one byte per code, WinAnsi unless a ToUnicode map says otherwise
    Simple,
    /// Composite (Type0) font: two bytes per code
    Cid {
        /// The encoding CMap is a predefined UCS-2/UTF-16 CMap, so codes are Unicode
        ucs2: bool,
    },
}

/// Glyph advance widths in 1/1000 em.
#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    Cid {
        widths: HashMap<u32, f32>,
        default: f32,
    },
}

/// Decoded font dictionary.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Base font name with any subset tag removed
    pub base_font: String,
    /// Font subtype (Type1, TrueType, Type0, Type3...)
    pub subtype: String,
    /// Code layout and fallback decoding
    pub encoding: FontEncoding,
    /// ToUnicode map, when present and parseable
    pub to_unicode: Option<ToUnicode>,
    /// Ascent in 1/1000 em
    pub ascent: f32,
    /// Descent in 1/1000 em (negative)
    pub descent: f32,
    widths: Widths,
    standard: Option<StandardFont>,
}

impl FontInfo {
    /// Decode a font dictionary. Missing or malformed entries fall back to
    /// defaults; a font never fails to load.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> FontInfo {
        let raw_name = objects::get_name(doc, dict, b"BaseFont").unwrap_or_default();
        let base_font = strip_subset_tag(&raw_name).to_string();
        let subtype = objects::get_name(doc, dict, b"Subtype").unwrap_or_else(|| "Type1".to_string());
        let standard = StandardFont::resolve(&base_font);

        let to_unicode = match objects::get(doc, dict, b"ToUnicode") {
            Some(Object::Stream(stream)) => objects::stream_content(stream).map(|data| ToUnicode::parse(&data)),
            _ => None,
        };

        let (encoding, widths, descriptor) = if subtype == "Type0" {
            let ucs2 = match objects::get(doc, dict, b"Encoding") {
                Some(Object::Name(name)) => {
                    let name = String::from_utf8_lossy(name);
                    name.contains("UCS2") || name.contains("UTF16")
                },
                _ => false,
            };
            let descendant = objects::get_array(doc, dict, b"DescendantFonts")
                .and_then(|fonts| fonts.first())
                .and_then(|font| objects::resolve(doc, font))
                .and_then(objects::as_dict);
            let widths = match descendant {
                Some(cid_font) => Widths::Cid {
                    widths: objects::get_array(doc, cid_font, b"W")
                        .map(|w| parse_cid_widths(doc, w))
                        .unwrap_or_default(),
                    default: objects::get_number(doc, cid_font, b"DW").unwrap_or(DEFAULT_CID_WIDTH),
                },
                None => {
                    log::warn!("Type0 font '{}' has no descendant font", base_font);
                    Widths::Cid {
                        widths: HashMap::new(),
                        default: DEFAULT_CID_WIDTH,
                    }
                },
            };
            let descriptor = descendant.and_then(|d| objects::get_dict(doc, d, b"FontDescriptor"));
            (FontEncoding::Cid { ucs2 }, widths, descriptor)
        } else {
            let descriptor = objects::get_dict(doc, dict, b"FontDescriptor");
            let missing = descriptor
                .and_then(|d| objects::get_number(doc, d, b"MissingWidth"))
                .filter(|w| *w > 0.0)
                .unwrap_or(DEFAULT_SIMPLE_WIDTH);
            let first_char = objects::get_number(doc, dict, b"FirstChar").unwrap_or(0.0).max(0.0) as u32;
            let widths = objects::get_array(doc, dict, b"Widths")
                .map(|items| {
                    items
                        .iter()
                        .map(|w| objects::resolve(doc, w).and_then(objects::number).unwrap_or(missing))
                        .collect()
                })
                .unwrap_or_default();
            (
                FontEncoding::Simple,
                Widths::Simple {
                    first_char,
                    widths,
                    missing,
                },
                descriptor,
            )
        };

        let (default_ascent, default_descent) = default_extents(standard);
        let ascent = descriptor
            .and_then(|d| objects::get_number(doc, d, b"Ascent"))
            .filter(|a| *a > 0.0)
            .unwrap_or(default_ascent);
        let descent = descriptor
            .and_then(|d| objects::get_number(doc, d, b"Descent"))
            .map(|d| -d.abs())
            .filter(|d| *d < 0.0)
            .unwrap_or(default_descent);

        log::debug!(
            "Loaded font '{}' ({}, {:?}, tounicode={})",
            base_font,
            subtype,
            encoding,
            to_unicode.is_some()
        );

        FontInfo {
            base_font,
            subtype,
            encoding,
            to_unicode,
            ascent,
            descent,
            widths,
            standard,
        }
    }

    /// Stand-in for a font resource that cannot be found: Helvetica metrics
    /// and WinAnsi decoding.
    pub fn fallback(name: &str) -> FontInfo {
        let standard = StandardFont::helvetica();
        let (ascent, descent) = default_extents(Some(standard));
        FontInfo {
            base_font: name.to_string(),
            subtype: "Type1".to_string(),
            encoding: FontEncoding::Simple,
            to_unicode: None,
            ascent,
            descent,
            widths: Widths::Simple {
                first_char: 0,
                widths: Vec::new(),
                missing: DEFAULT_SIMPLE_WIDTH,
            },
            standard: Some(standard),
        }
    }

    /// Whether codes are one byte wide (word spacing applies to code 32).
    pub fn is_single_byte(&self) -> bool {
        matches!(self.encoding, FontEncoding::Simple)
    }

    /// The standard-14 font this font's name resolves to, if any.
    pub fn standard_font(&self) -> Option<StandardFont> {
        self.standard
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        match self.encoding {
            FontEncoding::Simple => bytes.iter().map(|&b| b as u32).collect(),
            FontEncoding::Cid { .. } => bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => ((*hi as u32) << 8) | *lo as u32,
                    [single] => *single as u32,
                    _ => 0,
                })
                .collect(),
        }
    }

    /// Unicode text for one character code; empty when undecodable.
    pub fn decode_code(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.get(code)) {
            return text.to_string();
        }
        match self.encoding {
            FontEncoding::Simple => {
                if self.standard.map(|s| s.is_symbolic()).unwrap_or(false) {
                    return String::new();
                }
                u8::try_from(code)
                    .ok()
                    .and_then(winansi_to_unicode)
                    .map(String::from)
                    .unwrap_or_default()
            },
            FontEncoding::Cid { ucs2: true } => decode_utf16be(&(code as u16).to_be_bytes()),
            FontEncoding::Cid { ucs2: false } => {
                log::trace!("No Unicode mapping for CID {} in '{}'", code, self.base_font);
                String::new()
            },
        }
    }

    /// Advance width of a code in 1/1000 em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .or_else(|| self.standard.and_then(|s| s.glyph_width(code)))
                .unwrap_or(*missing),
            Widths::Cid { widths, default } => widths.get(&code).copied().unwrap_or(*default),
        }
    }
}

/// Remove a six-letter subset prefix such as `ABCDEF+`.
///
/// # Examples
///
/// ```
/// use doc_oxide::fonts::strip_subset_tag;
///
/// assert_eq!(strip_subset_tag("EOODIA+Poetica-Bold"), "Poetica-Bold");
/// assert_eq!(strip_subset_tag("Helvetica"), "Helvetica");
/// ```
pub fn strip_subset_tag(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase) {
        &name[7..]
    } else {
        name
    }
}

fn default_extents(standard: Option<StandardFont>) -> (f32, f32) {
    match standard.map(|s| s.family) {
        Some(Family::Helvetica) => (718.0, -207.0),
        Some(Family::Times) => (683.0, -217.0),
        Some(Family::Courier) => (629.0, -157.0),
        _ => (800.0, -200.0),
    }
}

/// Parse a CID font `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_cid_widths(doc: &Document, items: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let resolved: Vec<&Object> = items.iter().filter_map(|o| objects::resolve(doc, o)).collect();
    let mut i = 0;
    while i < resolved.len() {
        let Some(first) = objects::number(resolved[i]) else {
            break;
        };
        let first = first.max(0.0) as u32;
        match resolved.get(i + 1) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    if let Some(w) = objects::resolve(doc, w).and_then(objects::number) {
                        widths.insert(first + offset as u32, w);
                    }
                }
                i += 2;
            },
            Some(last) => {
                let (Some(last), Some(w)) = (
                    objects::number(last),
                    resolved.get(i + 2).and_then(|o| objects::number(o)),
                ) else {
                    break;
                };
                let last = (last.max(0.0) as u32).min(first.saturating_add(0xFFFF));
                for cid in first..=last {
                    widths.insert(cid, w);
                }
                i += 3;
            },
            None => break,
        }
    }
    widths
}
