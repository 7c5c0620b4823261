//! Single-byte and UCS-2 text encodings.
//!
//! WinAnsi (Windows-1252) is the encoding every standard-14 font dictionary
//! we emit declares, and the fallback for decoding simple fonts without a
//! ToUnicode map. UCS-2 big-endian is what the predefined `Uni*-UCS2-H`
//! CMaps of the CJK fallback fonts consume.

/// The 0x80-0x9F block where WinAnsi differs from Latin-1.
const WINANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'), // Euro sign
    (0x82, '\u{201A}'), // Single low-9 quotation mark
    (0x83, '\u{0192}'), // Latin small letter f with hook
    (0x84, '\u{201E}'), // Double low-9 quotation mark
    (0x85, '\u{2026}'), // Horizontal ellipsis
    (0x86, '\u{2020}'), // Dagger
    (0x87, '\u{2021}'), // Double dagger
    (0x88, '\u{02C6}'), // Modifier letter circumflex accent
    (0x89, '\u{2030}'), // Per mille sign
    (0x8A, '\u{0160}'), // Latin capital letter S with caron
    (0x8B, '\u{2039}'), // Single left-pointing angle quotation mark
    (0x8C, '\u{0152}'), // Latin capital ligature OE
    (0x8E, '\u{017D}'), // Latin capital letter Z with caron
    (0x91, '\u{2018}'), // Left single quotation mark
    (0x92, '\u{2019}'), // Right single quotation mark
    (0x93, '\u{201C}'), // Left double quotation mark
    (0x94, '\u{201D}'), // Right double quotation mark
    (0x95, '\u{2022}'), // Bullet
    (0x96, '\u{2013}'), // En dash
    (0x97, '\u{2014}'), // Em dash
    (0x98, '\u{02DC}'), // Small tilde
    (0x99, '\u{2122}'), // Trade mark sign
    (0x9A, '\u{0161}'), // Latin small letter s with caron
    (0x9B, '\u{203A}'), // Single right-pointing angle quotation mark
    (0x9C, '\u{0153}'), // Latin small ligature oe
    (0x9E, '\u{017E}'), // Latin small letter z with caron
    (0x9F, '\u{0178}'), // Latin capital letter Y with diaeresis
];

/// Decode one WinAnsi byte.
pub fn winansi_to_unicode(code: u8) -> Option<char> {
    match code {
        0x09 | 0x0A | 0x0D | 0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => WINANSI_HIGH
            .iter()
            .find(|(byte, _)| *byte == code)
            .map(|(_, ch)| *ch),
        _ => None,
    }
}

/// Encode one character as a WinAnsi byte.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let codepoint = ch as u32;
    if codepoint < 0x80 || (0xA0..=0xFF).contains(&codepoint) {
        return Some(codepoint as u8);
    }
    WINANSI_HIGH
        .iter()
        .find(|(_, mapped)| *mapped == ch)
        .map(|(byte, _)| *byte)
}

/// Check if a character can be encoded in WinAnsi.
pub fn is_winansi_char(ch: char) -> bool {
    unicode_to_winansi(ch).is_some()
}

/// Encode a whole string as WinAnsi, or `None` if any character is missing.
///
/// # Examples
///
/// ```
/// use doc_oxide::fonts::encoding::encode_winansi;
///
/// assert_eq!(encode_winansi("Café"), Some(vec![b'C', b'a', b'f', 0xE9]));
/// assert_eq!(encode_winansi("你好"), None);
/// ```
pub fn encode_winansi(text: &str) -> Option<Vec<u8>> {
    text.chars().map(unicode_to_winansi).collect()
}

/// Decode a WinAnsi byte string; undefined bytes are dropped.
pub fn decode_winansi(bytes: &[u8]) -> String {
    bytes.iter().filter_map(|&b| winansi_to_unicode(b)).collect()
}

/// Encode text as UTF-16BE code units (UCS-2 for the BMP).
pub fn encode_utf16be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
}

/// Decode UTF-16BE; a trailing odd byte is ignored.
pub fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(unicode_to_winansi('A'), Some(0x41));
        assert_eq!(unicode_to_winansi('€'), Some(0x80));
        assert_eq!(unicode_to_winansi('é'), Some(0xE9));
        assert_eq!(unicode_to_winansi('中'), None);
    }

    #[test]
    fn test_winansi_decode_high_block() {
        assert_eq!(winansi_to_unicode(0x93), Some('\u{201C}'));
        assert_eq!(winansi_to_unicode(0x81), None);
        assert_eq!(decode_winansi(b"Hello\x85"), "Hello\u{2026}");
    }

    #[test]
    fn test_winansi_table_is_bijective() {
        for (byte, ch) in WINANSI_HIGH.iter() {
            assert_eq!(unicode_to_winansi(*ch), Some(*byte));
            assert_eq!(winansi_to_unicode(*byte), Some(*ch));
        }
    }

    #[test]
    fn test_is_winansi_char() {
        assert!(is_winansi_char('z'));
        assert!(is_winansi_char('—'));
        assert!(!is_winansi_char('日'));
    }

    #[test]
    fn test_utf16be_round_trip() {
        let bytes = encode_utf16be("你好");
        assert_eq!(bytes, vec![0x4F, 0x60, 0x59, 0x7D]);
        assert_eq!(decode_utf16be(&bytes), "你好");
        assert_eq!(decode_utf16be(&[0x00, 0x41, 0x00]), "A");
    }
}
