//! Page resources the interpreter consults: fonts and XObjects.

use super::objects;
use crate::fonts::FontInfo;
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Font name reported for runs whose font cannot be recovered.
pub const DEFAULT_FONT_NAME: &str = "Helvetica";

/// Kind of a named XObject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XObjectKind {
    /// Raster image
    Image,
    /// Form XObject (not descended into)
    Form,
    /// Anything else
    Other,
}

/// Decoded `/Font` and `/XObject` resources of a page.
#[derive(Debug, Clone)]
pub struct PageResources {
    fonts: HashMap<String, FontInfo>,
    xobjects: HashMap<String, XObjectKind>,
    fallback: FontInfo,
}

impl PageResources {
    /// Resources with no fonts or XObjects.
    pub fn empty() -> Self {
        Self {
            fonts: HashMap::new(),
            xobjects: HashMap::new(),
            fallback: FontInfo::fallback(DEFAULT_FONT_NAME),
        }
    }

    /// Load the (possibly inherited) resources of a page.
    pub fn load(doc: &Document, page_id: ObjectId) -> Self {
        let mut resources = Self::empty();
        let Some(dict) = objects::inherited(doc, page_id, b"Resources").and_then(objects::as_dict) else {
            log::debug!("Page {:?} has no resources", page_id);
            return resources;
        };

        if let Some(fonts) = objects::get_dict(doc, dict, b"Font") {
            for (name, value) in fonts.iter() {
                let name = String::from_utf8_lossy(name).into_owned();
                match objects::resolve(doc, value).and_then(objects::as_dict) {
                    Some(font_dict) => {
                        resources.fonts.insert(name, FontInfo::from_dict(doc, font_dict));
                    },
                    None => log::warn!("Font resource /{} is not a dictionary", name),
                }
            }
        }

        if let Some(xobjects) = objects::get_dict(doc, dict, b"XObject") {
            for (name, value) in xobjects.iter() {
                let kind = match objects::resolve(doc, value) {
                    Some(Object::Stream(stream)) => match stream.dict.get(b"Subtype") {
                        Ok(Object::Name(subtype)) if subtype.as_slice() == b"Image" => XObjectKind::Image,
                        Ok(Object::Name(subtype)) if subtype.as_slice() == b"Form" => XObjectKind::Form,
                        _ => XObjectKind::Other,
                    },
                    _ => XObjectKind::Other,
                };
                resources
                    .xobjects
                    .insert(String::from_utf8_lossy(name).into_owned(), kind);
            }
        }

        resources
    }

    /// Register a font under a resource name.
    pub fn insert_font(&mut self, name: impl Into<String>, font: FontInfo) {
        self.fonts.insert(name.into(), font);
    }

    /// Register an XObject kind under a resource name.
    pub fn insert_xobject(&mut self, name: impl Into<String>, kind: XObjectKind) {
        self.xobjects.insert(name.into(), kind);
    }

    /// Font for a resource name; unknown names get Helvetica metrics.
    pub fn font(&self, name: &str) -> &FontInfo {
        self.fonts.get(name).unwrap_or_else(|| {
            log::debug!("Font resource /{} not found, using {} metrics", name, DEFAULT_FONT_NAME);
            &self.fallback
        })
    }

    /// Whether a font resource exists.
    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// Kind of a named XObject.
    pub fn xobject(&self, name: &str) -> XObjectKind {
        self.xobjects.get(name).copied().unwrap_or(XObjectKind::Other)
    }
}
