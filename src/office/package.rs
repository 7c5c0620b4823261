//! Office Open XML packages: zip archives of XML parts.

use super::xml::XmlDocument;
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// All entries of a package, in archive order.
///
/// Entries are rewritten with their original order and compression method;
/// parts that are never replaced keep their original bytes.
#[derive(Debug, Clone)]
pub struct Package {
    format: &'static str,
    parts: Vec<Part>,
}

impl Package {
    /// Read every entry of an archive. `format` labels errors.
    pub fn open(bytes: &[u8], format: &'static str) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| Error::malformed(format, e))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(|e| Error::malformed(format, e))?;
            let mut data = Vec::with_capacity(capacity_hint(file.size()));
            file.read_to_end(&mut data)
                .map_err(|e| Error::malformed(format, format!("{}: {}", file.name(), e)))?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }
        log::debug!("Opened {} package with {} entries", format, parts.len());
        Ok(Self { format, parts })
    }

    /// Entry names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    /// Whether an entry exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|part| part.name == name)
    }

    /// Bytes of an entry.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    /// Parse an XML entry, or `None` if it does not exist.
    pub fn xml(&self, name: &str) -> Result<Option<XmlDocument>> {
        self.part(name)
            .map(|bytes| XmlDocument::parse(bytes, self.format))
            .transpose()
    }

    /// Replace an entry's bytes, adding it (deflated) if it is new.
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|part| part.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Write the archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let format = self.format;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            let options = SimpleFileOptions::default().compression_method(writable(part.compression));
            if part.is_dir {
                writer
                    .add_directory(part.name.as_str(), options)
                    .map_err(|e| Error::serialization(format, e))?;
                continue;
            }
            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| Error::serialization(format, format!("{}: {}", part.name, e)))?;
            writer
                .write_all(&part.data)
                .map_err(|e| Error::serialization(format, format!("{}: {}", part.name, e)))?;
        }
        let cursor = writer.finish().map_err(|e| Error::serialization(format, e))?;
        Ok(cursor.into_inner())
    }
}

/// Declared sizes come from the archive and may be bogus.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Stored entries stay stored; everything else is deflated.
fn writable(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}
