//! The standard 14 Type 1 fonts.
//!
//! Every conforming viewer can render these without embedded font programs,
//! so a translated run reuses its source font only when that font's name
//! resolves to one of them.

/// A standard-14 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Helvetica (also Arial)
    Helvetica,
    /// Times (also Times New Roman)
    Times,
    /// Courier (also Courier New)
    Courier,
    /// Symbol
    Symbol,
    /// ZapfDingbats
    ZapfDingbats,
}

/// One of the standard 14 fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFont {
    /// Font family
    pub family: Family,
    /// Bold weight
    pub bold: bool,
    /// Italic or oblique style
    pub italic: bool,
}

impl StandardFont {
    /// Plain Helvetica.
    pub fn helvetica() -> Self {
        Self {
            family: Family::Helvetica,
            bold: false,
            italic: false,
        }
    }

    /// Resolve a font name (PostScript or common Windows name) to a
    /// standard-14 font.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::fonts::standard14::{Family, StandardFont};
    ///
    /// let font = StandardFont::resolve("Arial,BoldItalic").unwrap();
    /// assert_eq!(font.family, Family::Helvetica);
    /// assert_eq!(font.base_font_name(), "Helvetica-BoldOblique");
    ///
    /// let font = StandardFont::resolve("TimesNewRomanPSMT").unwrap();
    /// assert_eq!(font.base_font_name(), "Times-Roman");
    ///
    /// assert!(StandardFont::resolve("Calibri").is_none());
    /// ```
    pub fn resolve(name: &str) -> Option<StandardFont> {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        const PREFIXES: [(&str, Family); 7] = [
            ("helvetica", Family::Helvetica),
            ("arial", Family::Helvetica),
            ("timesnewroman", Family::Times),
            ("times", Family::Times),
            ("couriernew", Family::Courier),
            ("courier", Family::Courier),
            ("symbol", Family::Symbol),
        ];

        let (family, rest) = if let Some(rest) = normalized.strip_prefix("zapfdingbats") {
            (Family::ZapfDingbats, rest)
        } else {
            PREFIXES
                .iter()
                .find_map(|(prefix, family)| {
                    normalized.strip_prefix(prefix).map(|rest| (*family, rest))
                })?
        };

        // Anything after the family name must be a style suffix, so that
        // e.g. "Arial Narrow" or "Timeless" do not resolve.
        let style = rest.trim_start_matches(|c: char| c == ',' || c == '-');
        let style = style.strip_suffix("psmt").or_else(|| style.strip_suffix("mt")).unwrap_or(style);
        let style = style.strip_prefix("ps").unwrap_or(style);
        let style = style.trim_matches(|c: char| c == ',' || c == '-');
        let known = style
            .replace("bold", "")
            .replace("black", "")
            .replace("italic", "")
            .replace("oblique", "")
            .replace("roman", "")
            .replace("regular", "")
            .replace(['-', ','], "");
        if !known.is_empty() {
            return None;
        }

        let bold = style.contains("bold") || style.contains("black");
        let italic = style.contains("italic") || style.contains("oblique");
        Some(StandardFont {
            family,
            bold: bold && !matches!(family, Family::Symbol | Family::ZapfDingbats),
            italic: italic && !matches!(family, Family::Symbol | Family::ZapfDingbats),
        })
    }

    /// The `/BaseFont` name of this font.
    pub fn base_font_name(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (Family::Helvetica, false, false) => "Helvetica",
            (Family::Helvetica, true, false) => "Helvetica-Bold",
            (Family::Helvetica, false, true) => "Helvetica-Oblique",
            (Family::Helvetica, true, true) => "Helvetica-BoldOblique",
            (Family::Times, false, false) => "Times-Roman",
            (Family::Times, true, false) => "Times-Bold",
            (Family::Times, false, true) => "Times-Italic",
            (Family::Times, true, true) => "Times-BoldItalic",
            (Family::Courier, false, false) => "Courier",
            (Family::Courier, true, false) => "Courier-Bold",
            (Family::Courier, false, true) => "Courier-Oblique",
            (Family::Courier, true, true) => "Courier-BoldOblique",
            (Family::Symbol, _, _) => "Symbol",
            (Family::ZapfDingbats, _, _) => "ZapfDingbats",
        }
    }

    /// Symbol and ZapfDingbats have their own built-in encodings and cannot
    /// draw WinAnsi text.
    pub fn is_symbolic(&self) -> bool {
        matches!(self.family, Family::Symbol | Family::ZapfDingbats)
    }

    /// Advance width of a printable ASCII code in 1/1000 em.
    ///
    /// Regular-weight widths are used for every style.
    pub fn glyph_width(&self, code: u32) -> Option<f32> {
        if !(32..=126).contains(&code) {
            return None;
        }
        let index = (code - 32) as usize;
        match self.family {
            Family::Helvetica => Some(HELVETICA_WIDTHS[index] as f32),
            Family::Times => Some(TIMES_WIDTHS[index] as f32),
            Family::Courier => Some(600.0),
            Family::Symbol | Family::ZapfDingbats => None,
        }
    }
}

/// Helvetica advance widths for codes 32-126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Times-Roman advance widths for codes 32-126.
#[rustfmt::skip]
const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];
