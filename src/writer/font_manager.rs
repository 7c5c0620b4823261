//! Font selection and registration for redrawn text.
//!
//! Translated text is drawn either with a standard-14 Type1 font
//! (WinAnsi encoded) or, when the text needs characters outside WinAnsi,
//! with a non-embedded CJK Type0 font addressed through a predefined UCS-2
//! CMap. Neither needs a font program in the file.

use crate::fonts::encoding::{encode_utf16be, encode_winansi, unicode_to_winansi};
use crate::fonts::StandardFont;
use crate::language::TargetLanguage;
use indexmap::IndexMap;
use lopdf::{dictionary, Dictionary, Document, Object, StringFormat};
use std::collections::HashSet;

/// Prefix for font resources added to a page.
const RESOURCE_PREFIX: &str = "DxF";

/// Non-embedded CJK fonts every Acrobat-compatible viewer can substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CjkFont {
    /// Simplified Chinese (Adobe-GB1)
    SimplifiedChinese,
    /// Traditional Chinese (Adobe-CNS1)
    TraditionalChinese,
    /// Japanese (Adobe-Japan1)
    Japanese,
    /// Korean (Adobe-Korea1)
    Korean,
}

impl CjkFont {
    /// Pick the character collection matching the target language.
    /// Languages without a CJK collection of their own use Adobe-GB1.
    pub fn for_language(lang: &TargetLanguage) -> CjkFont {
        match lang {
            TargetLanguage::Japanese => CjkFont::Japanese,
            TargetLanguage::Korean => CjkFont::Korean,
            TargetLanguage::Other(code) => {
                let code = code.to_lowercase();
                if code.starts_with("zh-tw") || code.starts_with("zh-hk") || code.starts_with("zh-hant") {
                    CjkFont::TraditionalChinese
                } else {
                    CjkFont::SimplifiedChinese
                }
            },
            _ => CjkFont::SimplifiedChinese,
        }
    }

    /// CIDFont base name.
    pub fn base_font(&self) -> &'static str {
        match self {
            CjkFont::SimplifiedChinese => "STSong-Light",
            CjkFont::TraditionalChinese => "MSung-Light",
            CjkFont::Japanese => "KozMinPro-Regular",
            CjkFont::Korean => "HYSMyeongJo-Medium",
        }
    }

    /// Predefined horizontal UCS-2 CMap.
    pub fn encoding(&self) -> &'static str {
        match self {
            CjkFont::SimplifiedChinese => "UniGB-UCS2-H",
            CjkFont::TraditionalChinese => "UniCNS-UCS2-H",
            CjkFont::Japanese => "UniJIS-UCS2-H",
            CjkFont::Korean => "UniKS-UCS2-H",
        }
    }

    fn ordering(&self) -> (&'static str, i64) {
        match self {
            CjkFont::SimplifiedChinese => ("GB1", 4),
            CjkFont::TraditionalChinese => ("CNS1", 4),
            CjkFont::Japanese => ("Japan1", 4),
            CjkFont::Korean => ("Korea1", 2),
        }
    }
}

/// The font a translated run is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontChoice {
    /// Standard-14 Type1 font, WinAnsi encoded
    Standard(StandardFont),
    /// CJK Type0 font, UCS-2 encoded
    Cjk(CjkFont),
}

impl FontChoice {
    /// Choose a font for `text` replacing a run drawn in `run_font`.
    ///
    /// The run's own font is kept when it is a standard-14 text font and the
    /// text is WinAnsi-encodable. Otherwise `fallback` is used for WinAnsi
    /// text, and a CJK font for everything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::writer::font_manager::{CjkFont, FontChoice};
    /// use doc_oxide::TargetLanguage;
    ///
    /// let choice = FontChoice::choose("Arial-BoldMT", "Hallo", &TargetLanguage::German, "Helvetica");
    /// assert_eq!(choice.base_font_name(), "Helvetica-Bold");
    ///
    /// let choice = FontChoice::choose("Arial", "你好", &TargetLanguage::Chinese, "Helvetica");
    /// assert_eq!(choice, FontChoice::Cjk(CjkFont::SimplifiedChinese));
    /// ```
    pub fn choose(run_font: &str, text: &str, target: &TargetLanguage, fallback: &str) -> FontChoice {
        if encode_winansi(text).is_none() {
            return FontChoice::Cjk(CjkFont::for_language(target));
        }

        if let Some(font) = StandardFont::resolve(run_font).filter(|f| !f.is_symbolic()) {
            return FontChoice::Standard(font);
        }

        log::warn!("Font '{}' is not a standard font, drawing with '{}'", run_font, fallback);
        let fallback = StandardFont::resolve(fallback)
            .filter(|f| !f.is_symbolic())
            .unwrap_or_else(|| {
                log::warn!("Fallback font '{}' is not a standard text font, using Helvetica", fallback);
                StandardFont::helvetica()
            });
        FontChoice::Standard(fallback)
    }

    /// Name written as `/BaseFont`.
    pub fn base_font_name(&self) -> String {
        match self {
            FontChoice::Standard(font) => font.base_font_name().to_string(),
            FontChoice::Cjk(font) => format!("{}-{}", font.base_font(), font.encoding()),
        }
    }

    /// Encode text for a `Tj` operand. Returns the bytes and whether they
    /// should be written as a hex string.
    pub fn encode(&self, text: &str) -> (Vec<u8>, bool) {
        match self {
            FontChoice::Standard(_) => {
                let bytes = text
                    .chars()
                    .map(|c| unicode_to_winansi(c).unwrap_or(b'?'))
                    .collect();
                (bytes, false)
            },
            FontChoice::Cjk(_) => (encode_utf16be(text), true),
        }
    }

    /// Build the font dictionary, adding any indirect sub-objects to `doc`.
    pub fn font_dictionary(&self, doc: &mut Document) -> Dictionary {
        match self {
            FontChoice::Standard(font) => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font_name(),
                "Encoding" => "WinAnsiEncoding",
            },
            FontChoice::Cjk(font) => {
                let (ordering, supplement) = font.ordering();
                let descriptor = doc.add_object(dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => font.base_font(),
                    "Flags" => 4,
                    "FontBBox" => vec![Object::Integer(0), Object::Integer(-200), Object::Integer(1000), Object::Integer(900)],
                    "ItalicAngle" => 0,
                    "Ascent" => 880,
                    "Descent" => -120,
                    "CapHeight" => 700,
                    "StemV" => 80,
                });
                let cid_font = doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "CIDFontType0",
                    "BaseFont" => font.base_font(),
                    "CIDSystemInfo" => dictionary! {
                        "Registry" => Object::String(b"Adobe".to_vec(), StringFormat::Literal),
                        "Ordering" => Object::String(ordering.as_bytes().to_vec(), StringFormat::Literal),
                        "Supplement" => supplement,
                    },
                    "FontDescriptor" => descriptor,
                    "DW" => 1000,
                });
                dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type0",
                    "BaseFont" => Object::Name(self.base_font_name().into_bytes()),
                    "Encoding" => font.encoding(),
                    "DescendantFonts" => vec![Object::Reference(cid_font)],
                }
            },
        }
    }
}

/// Font resources added to one page, keyed by choice.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: IndexMap<FontChoice, String>,
    taken: HashSet<String>,
    next_id: u32,
}

impl FontRegistry {
    /// Create a registry that avoids the page's existing resource names.
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            fonts: IndexMap::new(),
            taken: existing.into_iter().collect(),
            next_id: 1,
        }
    }

    /// Resource name for a font choice, allocating one on first use.
    pub fn resource_name(&mut self, choice: FontChoice) -> String {
        if let Some(name) = self.fonts.get(&choice) {
            return name.clone();
        }
        let name = loop {
            let candidate = format!("{}{}", RESOURCE_PREFIX, self.next_id);
            self.next_id += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };
        self.taken.insert(name.clone());
        self.fonts.insert(choice, name.clone());
        name
    }

    /// Registered fonts in allocation order.
    pub fn entries(&self) -> impl Iterator<Item = (&FontChoice, &str)> {
        self.fonts.iter().map(|(choice, name)| (choice, name.as_str()))
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no fonts were registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Write every registered font into a page's `/Font` resource dictionary.
    pub fn install(&self, doc: &mut Document, font_resources: &mut Dictionary) {
        for (choice, name) in self.entries() {
            let dict = choice.font_dictionary(doc);
            let id = doc.add_object(dict);
            font_resources.set(name.as_bytes().to_vec(), Object::Reference(id));
        }
    }
}
