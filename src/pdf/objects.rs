//! Helpers for walking `lopdf` object graphs.
//!
//! Indirect references are followed with a depth limit so a reference cycle
//! in a damaged file cannot hang extraction.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

const MAX_DEPTH: usize = 32;

/// Follow references until a direct object is reached.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            direct => return Some(direct),
        }
    }
    log::warn!("Reference chain deeper than {} levels, giving up", MAX_DEPTH);
    None
}

/// Dictionary of a dictionary or stream object.
pub fn as_dict(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up `key` and resolve the value.
pub fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

/// Look up `key` as a dictionary (or stream dictionary).
pub fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    get(doc, dict, key).and_then(as_dict)
}

/// Look up `key` as an array.
pub fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Vec<Object>> {
    match get(doc, dict, key)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

/// Look up `key` as a number.
pub fn get_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f32> {
    get(doc, dict, key).and_then(number)
}

/// Look up `key` as a name.
pub fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Numeric value of a direct Integer or Real.
pub fn number(obj: &Object) -> Option<f32> {
    crate::content::as_number(obj)
}

/// Stream bytes with filters applied. Unfiltered streams are returned as-is.
pub fn stream_content(stream: &Stream) -> Option<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        match stream.decompressed_content() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Failed to decode stream: {}", e);
                None
            },
        }
    } else {
        Some(stream.content.clone())
    }
}

/// Look up a page attribute, walking up `/Parent` for inheritable keys
/// such as `/Resources` and `/MediaBox`.
pub fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_object(page_id).ok().and_then(as_dict)?;
    for _ in 0..MAX_DEPTH {
        if let Some(value) = get(doc, node, key) {
            return Some(value);
        }
        node = get_dict(doc, node, b"Parent")?;
    }
    None
}
