//! ToUnicode CMaps.
//!
//! Embedded subset fonts rarely carry a usable encoding, so the only way to
//! recover the text of a run is often the font's ToUnicode stream. Only the
//! `bfchar` and `bfrange` operators matter for that; codespace ranges are
//! implied by the font type.

use regex::Regex;
use std::collections::HashMap;

/// Upper bound on codes generated from a single bfrange entry.
const MAX_RANGE: u32 = 0xFFFF;

lazy_static::lazy_static! {
    static ref BFCHAR_SECTION: Regex = Regex::new(r"(?s)beginbfchar(.*?)endbfchar").unwrap();
    static ref BFRANGE_SECTION: Regex = Regex::new(r"(?s)beginbfrange(.*?)endbfrange").unwrap();
    static ref BFCHAR: Regex = Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]*)>").unwrap();
    static ref BFRANGE: Regex = Regex::new(
        r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*(?:<([0-9A-Fa-f]+)>|\[([^\]]*)\])"
    ).unwrap();
    static ref HEX: Regex = Regex::new(r"<([0-9A-Fa-f]*)>").unwrap();
}

/// Character code to Unicode text, as read from a ToUnicode stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicode {
    map: HashMap<u32, String>,
}

impl ToUnicode {
    /// Parse a ToUnicode stream. Entries that cannot be decoded are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::fonts::ToUnicode;
    ///
    /// let cmap = ToUnicode::parse(b"1 beginbfchar <0041> <0058> endbfchar");
    /// assert_eq!(cmap.get(0x41), Some("X"));
    /// ```
    pub fn parse(data: &[u8]) -> Self {
        let content = String::from_utf8_lossy(data);
        let mut map = HashMap::new();

        for section in BFCHAR_SECTION.captures_iter(&content) {
            for entry in BFCHAR.captures_iter(&section[1]) {
                let (Some(code), Some(text)) = (hex_code(&entry[1]), utf16_hex(&entry[2])) else {
                    continue;
                };
                map.insert(code, text);
            }
        }

        for section in BFRANGE_SECTION.captures_iter(&content) {
            for entry in BFRANGE.captures_iter(&section[1]) {
                let (Some(lo), Some(hi)) = (hex_code(&entry[1]), hex_code(&entry[2])) else {
                    continue;
                };
                let count = hi.saturating_sub(lo).min(MAX_RANGE) + 1;
                if let Some(first) = entry.get(3) {
                    insert_incrementing(&mut map, lo, count, first.as_str());
                } else if let Some(array) = entry.get(4) {
                    let targets: Vec<&str> = HEX
                        .captures_iter(array.as_str())
                        .filter_map(|hex| hex.get(1).map(|m| m.as_str()))
                        .collect();
                    if targets.len() != count as usize {
                        log::warn!(
                            "bfrange <{:X}> <{:X}> lists {} targets for {} codes",
                            lo,
                            hi,
                            targets.len(),
                            count
                        );
                    }
                    for (code, target) in (lo..).zip(targets.into_iter().take(count as usize)) {
                        if let Some(text) = utf16_hex(target) {
                            map.insert(code, text);
                        }
                    }
                }
            }
        }

        log::trace!("ToUnicode map with {} entries", map.len());
        Self { map }
    }

    /// Text for a character code.
    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing was mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// `<lo> <hi> <dst>`: consecutive codes map to consecutive values, with the
/// increment applied to the last UTF-16 unit of `dst`.
fn insert_incrementing(map: &mut HashMap<u32, String>, lo: u32, count: u32, dst: &str) {
    let Some(mut units) = utf16_units(dst) else { return };
    if units.is_empty() {
        return;
    }
    for code in lo..lo.saturating_add(count) {
        if let Ok(text) = String::from_utf16(&units) {
            map.insert(code, text);
        }
        if let Some(last) = units.last_mut() {
            *last = last.wrapping_add(1);
        }
    }
}

fn hex_code(hex: &str) -> Option<u32> {
    if hex.is_empty() || hex.len() > 8 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Big-endian UTF-16 units from a hex string. An odd trailing digit is
/// padded with zero.
fn utf16_units(hex: &str) -> Option<Vec<u16>> {
    let digits = hex.as_bytes();
    digits
        .chunks(4)
        .map(|chunk| {
            let chunk = std::str::from_utf8(chunk).ok()?;
            let value = u16::from_str_radix(chunk, 16).ok()?;
            Some(value << (4 * (4 - chunk.len() as u32)))
        })
        .collect()
}

/// Decode a destination string: one or more UTF-16BE code units, which
/// covers single characters, surrogate pairs and ligatures alike.
fn utf16_hex(hex: &str) -> Option<String> {
    let units = utf16_units(hex)?;
    if units.is_empty() {
        return None;
    }
    String::from_utf16(&units).ok()
}
