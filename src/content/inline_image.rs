//! Inline images (`BI` ... `ID` <data> `EI`) in raw content streams.
//!
//! `lopdf` cannot decode inline images, so they are cut out of the stream
//! before decoding and carried through verbatim. A page's operator list
//! stands in for each one with a `BI` operation whose single operand is the
//! image's slot number.
//!
//! The scanner here only knows enough PDF syntax to find bare keywords:
//! strings, names, comments and dictionary brackets are skipped.

/// Operator name of the placeholder standing in for an inline image.
pub const INLINE_IMAGE: &str = "BI";

/// A piece of a raw content stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSegment<'a> {
    /// Ordinary operators, decodable by `lopdf`
    Operators(&'a [u8]),
    /// One inline image, `BI` through `EI`
    InlineImage(&'a [u8]),
}

/// Split a content stream around its inline images.
///
/// An image whose `EI` cannot be found runs to the end of the stream.
///
/// # Examples
///
/// ```
/// use doc_oxide::content::inline_image::{split_inline_images, ContentSegment};
///
/// let segments = split_inline_images(b"q BI /W 1 /H 1 ID \xff EI Q");
/// assert_eq!(
///     segments,
///     vec![
///         ContentSegment::Operators(b"q "),
///         ContentSegment::InlineImage(b"BI /W 1 /H 1 ID \xff EI"),
///         ContentSegment::Operators(b" Q"),
///     ]
/// );
/// ```
pub fn split_inline_images(data: &[u8]) -> Vec<ContentSegment<'_>> {
    let mut segments = Vec::new();
    let mut keywords = Keywords::new(data);
    let mut chunk_start = 0;

    while let Some((start, end)) = keywords.next() {
        if &data[start..end] != INLINE_IMAGE.as_bytes() {
            continue;
        }
        let image_data = keywords
            .by_ref()
            .find(|&(s, e)| &data[s..e] == b"ID")
            .map(|(_, e)| (e + 1).min(data.len()));
        let image_end = image_data
            .and_then(|from| end_of_image(data, from))
            .unwrap_or_else(|| {
                log::warn!("Inline image at byte {} has no EI, keeping the rest of the stream", start);
                data.len()
            });

        if start > chunk_start {
            segments.push(ContentSegment::Operators(&data[chunk_start..start]));
        }
        segments.push(ContentSegment::InlineImage(&data[start..image_end]));
        chunk_start = image_end;
        keywords.pos = image_end;
    }

    if chunk_start < data.len() {
        segments.push(ContentSegment::Operators(&data[chunk_start..]));
    }
    segments
}

/// Number of operators in a stream without inline images.
///
/// Compared against what `lopdf` decoded to notice a stream it only
/// partially understood.
pub fn count_operators(data: &[u8]) -> usize {
    Keywords::new(data).count()
}

/// Offset just past the `EI` ending image data that starts at `from`.
///
/// `EI` must be preceded by whitespace and followed by whitespace, a
/// delimiter or the end of the stream; the same two bytes inside binary
/// data are skipped.
fn end_of_image(data: &[u8], from: usize) -> Option<usize> {
    let first = from.saturating_sub(1);
    (first..data.len().saturating_sub(2))
        .find(|&i| {
            is_whitespace(data[i])
                && &data[i + 1..i + 3] == b"EI"
                && data.get(i + 3).map_or(true, |&b| is_whitespace(b) || is_delimiter(b))
        })
        .map(|i| i + 3)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\0' | b' ' | b'\t' | b'\r' | b'\n' | b'\x0C')
}

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// Byte ranges of bare keywords (operators), in stream order.
struct Keywords<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Keywords<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek(0).is_some_and(&pred) {
            self.pos += 1;
        }
    }

    fn skip_literal_string(&mut self) {
        let mut depth = 0usize;
        while let Some(byte) = self.peek(0) {
            self.pos += 1;
            match byte {
                b'\\' => self.pos += 1,
                b'(' => depth += 1,
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                },
                _ => {},
            }
        }
    }
}

impl Iterator for Keywords<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        loop {
            self.skip_while(is_whitespace);
            let byte = self.peek(0)?;
            match byte {
                b'%' => self.skip_while(|b| b != b'\r' && b != b'\n'),
                b'(' => self.skip_literal_string(),
                b'<' | b'>' if self.peek(1) == Some(byte) => self.pos += 2,
                b'<' => {
                    self.skip_while(|b| b != b'>');
                    self.pos += 1;
                },
                b'/' => {
                    self.pos += 1;
                    self.skip_while(|b| !is_whitespace(b) && !is_delimiter(b));
                },
                b if is_delimiter(b) => self.pos += 1,
                _ => {
                    let start = self.pos;
                    self.skip_while(|b| !is_whitespace(b) && !is_delimiter(b));
                    let token = &self.data[start..self.pos];
                    let is_number = matches!(token[0], b'0'..=b'9' | b'+' | b'-' | b'.');
                    if !is_number && !matches!(token, b"true" | b"false" | b"null") {
                        return Some((start, self.pos));
                    }
                },
            }
        }
    }
}
