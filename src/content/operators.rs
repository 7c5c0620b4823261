//! Typed view of the content stream operators that affect text placement.
//!
//! Content streams are decoded by `lopdf` into untyped
//! [`Operation`](lopdf::content::Operation)s; [`Operator::from_operation`]
//! lifts the subset the run extractor interprets into a typed enum. Every
//! other operator maps to [`Operator::Other`] and is passed through untouched.

use super::inline_image::INLINE_IMAGE;
use lopdf::content::Operation;
use lopdf::Object;

/// A content stream operator relevant to text geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Concatenate matrix to CTM (cm)
    Cm([f32; 6]),

    /// Begin text object (BT)
    BeginText,
    /// End text object (ET)
    EndText,

    /// Set character spacing (Tc)
    Tc(f32),
    /// Set word spacing (Tw)
    Tw(f32),
    /// Set horizontal scaling percentage (Tz)
    Tz(f32),
    /// Set text leading (TL)
    TL(f32),
    /// Set font resource and size (Tf)
    Tf {
        /// Font resource name
        font: String,
        /// Font size
        size: f32,
    },
    /// Set text rendering mode (Tr)
    Tr(u8),
    /// Set text rise (Ts)
    Ts(f32),

    /// Move text position (Td)
    Td {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Move text position and set leading (TD)
    TD {
        /// Horizontal offset
        tx: f32,
        /// Vertical offset
        ty: f32,
    },
    /// Set text matrix (Tm)
    Tm([f32; 6]),
    /// Move to start of next line (T*)
    TStar,

    /// Show text string (Tj)
    Tj(Vec<u8>),
    /// Show text with glyph positioning (TJ)
    TJ(Vec<TextElement>),
    /// Move to next line and show text (')
    Quote(Vec<u8>),
    /// Set spacing, move to next line and show text (")
    DoubleQuote {
        /// Word spacing
        word_space: f32,
        /// Character spacing
        char_space: f32,
        /// Text to show
        text: Vec<u8>,
    },

    /// Paint XObject (Do)
    Do(String),
    /// Inline image (BI ... EI), kept out of the decoded operator list
    InlineImage,

    /// Anything the extractor does not interpret
    Other,
}

/// Element of a TJ array.
#[derive(Debug, Clone, PartialEq)]
pub enum TextElement {
    /// A string of character codes
    String(Vec<u8>),
    /// Positioning adjustment in thousandths of text space units
    Offset(f32),
}

impl Operator {
    /// Lift a decoded operation into a typed operator.
    ///
    /// Operations with missing or mistyped operands map to [`Operator::Other`]
    /// rather than failing, so a sloppy content stream still yields the runs
    /// it can.
    pub fn from_operation(op: &Operation) -> Operator {
        let operands = &op.operands;
        let typed = match op.operator.as_str() {
            "q" => Some(Operator::SaveState),
            "Q" => Some(Operator::RestoreState),
            "cm" => six_numbers(operands).map(Operator::Cm),
            "BT" => Some(Operator::BeginText),
            "ET" => Some(Operator::EndText),
            "Tc" => number_at(operands, 0).map(Operator::Tc),
            "Tw" => number_at(operands, 0).map(Operator::Tw),
            "Tz" => number_at(operands, 0).map(Operator::Tz),
            "TL" => number_at(operands, 0).map(Operator::TL),
            "Tf" => match (operands.first().and_then(name_of), number_at(operands, 1)) {
                (Some(font), Some(size)) => Some(Operator::Tf { font, size }),
                _ => None,
            },
            "Tr" => number_at(operands, 0).map(|mode| Operator::Tr(mode.max(0.0) as u8)),
            "Ts" => number_at(operands, 0).map(Operator::Ts),
            "Td" => match (number_at(operands, 0), number_at(operands, 1)) {
                (Some(tx), Some(ty)) => Some(Operator::Td { tx, ty }),
                _ => None,
            },
            "TD" => match (number_at(operands, 0), number_at(operands, 1)) {
                (Some(tx), Some(ty)) => Some(Operator::TD { tx, ty }),
                _ => None,
            },
            "Tm" => six_numbers(operands).map(Operator::Tm),
            "T*" => Some(Operator::TStar),
            "Tj" => operands.first().and_then(string_bytes).map(Operator::Tj),
            "TJ" => match operands.first() {
                Some(Object::Array(items)) => Some(Operator::TJ(
                    items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(TextElement::String(bytes.clone())),
                            other => as_number(other).map(TextElement::Offset),
                        })
                        .collect(),
                )),
                _ => None,
            },
            "'" => operands.first().and_then(string_bytes).map(Operator::Quote),
            "\"" => match (
                number_at(operands, 0),
                number_at(operands, 1),
                operands.get(2).and_then(string_bytes),
            ) {
                (Some(word_space), Some(char_space), Some(text)) => Some(Operator::DoubleQuote {
                    word_space,
                    char_space,
                    text,
                }),
                _ => None,
            },
            "Do" => operands.first().and_then(name_of).map(Operator::Do),
            INLINE_IMAGE => Some(Operator::InlineImage),
            _ => Some(Operator::Other),
        };

        typed.unwrap_or_else(|| {
            log::trace!("Malformed operands for '{}': {:?}", op.operator, operands);
            Operator::Other
        })
    }

    /// Whether this operator paints glyphs.
    pub fn shows_text(&self) -> bool {
        matches!(
            self,
            Operator::Tj(_) | Operator::TJ(_) | Operator::Quote(_) | Operator::DoubleQuote { .. }
        )
    }
}

/// Numeric value of an Integer or Real object.
pub fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn number_at(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(as_number)
}

fn six_numbers(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut out = [0.0; 6];
    for (slot, obj) in out.iter_mut().zip(operands) {
        *slot = as_number(obj)?;
    }
    Some(out)
}

fn name_of(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn string_bytes(obj: &Object) -> Option<Vec<u8>> {
    match obj {
        Object::String(bytes, _) => Some(bytes.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_tf_operator() {
        let typed = Operator::from_operation(&op(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
        ));
        assert_eq!(
            typed,
            Operator::Tf {
                font: "F1".to_string(),
                size: 12.0
            }
        );
    }

    #[test]
    fn test_tj_array_mixes_strings_and_offsets() {
        let typed = Operator::from_operation(&op(
            "TJ",
            vec![Object::Array(vec![
                Object::String(b"Hel".to_vec(), StringFormat::Literal),
                Object::Integer(-250),
                Object::String(b"lo".to_vec(), StringFormat::Literal),
            ])],
        ));
        assert_eq!(
            typed,
            Operator::TJ(vec![
                TextElement::String(b"Hel".to_vec()),
                TextElement::Offset(-250.0),
                TextElement::String(b"lo".to_vec()),
            ])
        );
        assert!(typed.shows_text());
    }

    #[test]
    fn test_malformed_operands_become_other() {
        let typed = Operator::from_operation(&op("Td", vec![Object::Integer(1)]));
        assert_eq!(typed, Operator::Other);
        let typed = Operator::from_operation(&op("cm", vec![Object::Integer(1); 4]));
        assert_eq!(typed, Operator::Other);
    }

    #[test]
    fn test_path_operator_is_other() {
        let typed = Operator::from_operation(&op("re", vec![Object::Integer(0); 4]));
        assert_eq!(typed, Operator::Other);
        assert!(!typed.shows_text());
    }

    #[test]
    fn test_real_operands() {
        let typed = Operator::from_operation(&op(
            "Td",
            vec![Object::Real(72.5), Object::Integer(-14)],
        ));
        assert_eq!(typed, Operator::Td { tx: 72.5, ty: -14.0 });
    }
}
