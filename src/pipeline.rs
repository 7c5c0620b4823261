//! Request orchestration: dispatch by file name, translate, serialize.

use crate::codec::{output_file_name, DocumentCodec, DocumentFormat, TranslationStats};
use crate::config::TranslateConfig;
use crate::error::Result;
use crate::language::TargetLanguage;
use crate::office::{DocxDocument, PptxDocument};
use crate::pdf::PdfDocument;
use crate::translator::{TranslationBridge, Translator};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The result of one translation request.
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    /// `translated_<original name>`
    pub file_name: String,
    /// Media type matching the input format
    pub media_type: &'static str,
    /// Serialized container
    pub bytes: Vec<u8>,
    /// Counters
    pub stats: TranslationStats,
}

/// Translate an uploaded document held in memory.
///
/// The format comes from `file_name`'s extension; unsupported extensions are
/// rejected before the bytes are looked at. Any failure aborts the whole
/// document and no output is produced.
///
/// # Examples
///
/// ```
/// use doc_oxide::{translate_bytes, Error, Result, TargetLanguage, TranslateConfig, Translator};
///
/// struct Echo;
///
/// impl Translator for Echo {
///     fn translate(&self, text: &str, _: &TargetLanguage) -> Result<String> {
///         Ok(text.to_string())
///     }
/// }
///
/// let err = translate_bytes("notes.txt", b"hello", &TargetLanguage::German, &Echo, &TranslateConfig::default())
///     .unwrap_err();
/// assert!(matches!(err, Error::UnsupportedFormat(_)));
/// ```
pub fn translate_bytes(
    file_name: &str,
    bytes: &[u8],
    target: &TargetLanguage,
    translator: &dyn Translator,
    config: &TranslateConfig,
) -> Result<TranslatedDocument> {
    let format = DocumentFormat::from_file_name(file_name)?;
    let started = Instant::now();
    log::info!("Translating {} ({}, {} bytes) into {}", file_name, format, bytes.len(), target);

    let bridge = TranslationBridge::new(translator);
    let (bytes, stats) = match format {
        DocumentFormat::Docx => run::<DocxDocument>(bytes, &bridge, target, config)?,
        DocumentFormat::Pptx => run::<PptxDocument>(bytes, &bridge, target, config)?,
        DocumentFormat::Pdf => run::<PdfDocument>(bytes, &bridge, target, config)?,
    };

    log::info!(
        "Finished {} in {:.1}s: {} ({} backend calls)",
        file_name,
        started.elapsed().as_secs_f32(),
        stats,
        bridge.calls()
    );
    Ok(TranslatedDocument {
        file_name: output_file_name(file_name),
        media_type: format.media_type(),
        bytes,
        stats,
    })
}

fn run<C: DocumentCodec>(
    bytes: &[u8],
    bridge: &TranslationBridge<'_>,
    target: &TargetLanguage,
    config: &TranslateConfig,
) -> Result<(Vec<u8>, TranslationStats)> {
    let mut document = C::open(bytes)?;
    let stats = document.translate(bridge, target, config)?;
    let bytes = document.serialize()?;
    Ok((bytes, stats))
}

/// Translate a file on disk and write `translated_<name>` into `output_dir`.
///
/// Returns the written path.
pub fn translate_file(
    input: &Path,
    output_dir: &Path,
    target: &TargetLanguage,
    translator: &dyn Translator,
    config: &TranslateConfig,
) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string_lossy().into_owned());
    // Unsupported formats fail before any read.
    DocumentFormat::from_file_name(&file_name)?;

    let bytes = std::fs::read(input)?;
    let translated = translate_bytes(&file_name, &bytes, target, translator, config)?;

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&translated.file_name);
    std::fs::write(&path, &translated.bytes)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}
