//! Lossless XML element tree over quick-xml events.
//!
//! Every event is kept as read (declarations, comments, whitespace, raw
//! escaped text), so writing an unmodified tree reproduces the part.
//! Elements are matched by local name; new elements borrow the prefix of the
//! element they are created next to.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// A node of the tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Element with its children
    Element(Element),
    /// Character data, still escaped
    Text(BytesText<'static>),
    /// Declaration, comment, CDATA, processing instruction or doctype
    Other(Event<'static>),
}

/// An XML element.
#[derive(Debug, Clone)]
pub struct Element {
    /// Start tag, including attributes
    pub start: BytesStart<'static>,
    /// Child nodes in document order
    pub children: Vec<Node>,
    /// Written as `<tag/>` while it has no children
    pub empty: bool,
}

impl Element {
    /// New element with a qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: BytesStart::new(name.into()),
            children: Vec::new(),
            empty: true,
        }
    }

    /// Qualified name, e.g. `w:p`.
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.start.name().into_inner())
    }

    /// Whether the local name (without prefix) is `local`.
    pub fn is(&self, local: &str) -> bool {
        self.start.local_name().as_ref() == local.as_bytes()
    }

    /// `local` qualified with this element's prefix.
    pub fn sibling_name(&self, local: &str) -> String {
        match self.start.name().prefix() {
            Some(prefix) => format!("{}:{}", String::from_utf8_lossy(prefix.as_ref()), local),
            None => local.to_string(),
        }
    }

    /// Value of the attribute with qualified name `name`, unescaped.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == name.as_bytes())
            .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Add an attribute.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.start.push_attribute((name, value));
        self
    }

    /// Child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Child elements, mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with local name `local`.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(local))
    }

    /// First child element with local name `local`, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|el| el.is(local))
    }

    /// Unescaped text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => match text.unescape() {
                    Ok(value) => out.push_str(&value),
                    Err(_) => out.push_str(&String::from_utf8_lossy(text)),
                },
                Node::Other(Event::CData(data)) => out.push_str(&String::from_utf8_lossy(data)),
                Node::Element(el) => el.collect_text(out),
                Node::Other(_) => {},
            }
        }
    }

    /// Replace all children with one text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(BytesText::new(text).into_owned())];
        self.empty = false;
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Call `f` on every element matching `is_target`, depth first. Matching
    /// elements are not descended into.
    pub fn for_each_mut<P, F>(&mut self, is_target: &P, f: &mut F) -> Result<()>
    where
        P: Fn(&Element) -> bool,
        F: FnMut(&mut Element) -> Result<()>,
    {
        for child in self.elements_mut() {
            if is_target(child) {
                f(child)?;
            } else {
                child.for_each_mut(is_target, f)?;
            }
        }
        Ok(())
    }

    /// Every element matching `is_target`, depth first, not descending into
    /// matches.
    pub fn find_all<'a, P>(&'a self, is_target: &P, out: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool,
    {
        for child in self.elements() {
            if is_target(child) {
                out.push(child);
            } else {
                child.find_all(is_target, out);
            }
        }
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> std::result::Result<(), String> {
        if self.empty && self.children.is_empty() {
            return emit(writer, Event::Empty(self.start.clone()));
        }
        emit(writer, Event::Start(self.start.clone()))?;
        for child in &self.children {
            child.write(writer)?;
        }
        emit(writer, Event::End(self.start.to_end()))
    }
}

impl Node {
    fn write(&self, writer: &mut Writer<Vec<u8>>) -> std::result::Result<(), String> {
        match self {
            Node::Element(el) => el.write(writer),
            Node::Text(text) => emit(writer, Event::Text(text.clone())),
            Node::Other(event) => emit(writer, event.clone()),
        }
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// A parsed XML part.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Top-level nodes: prolog, root element, trailing whitespace
    pub nodes: Vec<Node>,
}

impl XmlDocument {
    /// Parse a part. `format` labels errors.
    pub fn parse(bytes: &[u8], format: &'static str) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut nodes = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                Error::malformed(format, format!("XML error at byte {}: {}", reader.buffer_position(), e))
            })?;
            match event {
                Event::Start(start) => open.push(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    empty: false,
                }),
                Event::Empty(start) => attach(
                    &mut open,
                    &mut nodes,
                    Node::Element(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        empty: true,
                    }),
                ),
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| Error::malformed(format, "unexpected closing tag"))?;
                    attach(&mut open, &mut nodes, Node::Element(element));
                },
                Event::Text(text) => attach(&mut open, &mut nodes, Node::Text(text.into_owned())),
                Event::Eof => break,
                other => attach(&mut open, &mut nodes, Node::Other(other.into_owned())),
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(Error::malformed(format, format!("unclosed element <{}>", unclosed.name())));
        }
        let document = Self { nodes };
        if document.root().is_none() {
            return Err(Error::malformed(format, "XML part has no root element"));
        }
        Ok(document)
    }

    /// Root element.
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Root element, mutably.
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Serialize the tree. `format` labels errors.
    pub fn to_bytes(&self, format: &'static str) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            node.write(&mut writer).map_err(|e| Error::serialization(format, e))?;
        }
        Ok(writer.into_inner())
    }
}

fn attach(open: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}
