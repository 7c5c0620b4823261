//! The translation bridge: the core's only view of the translation service.
//!
//! A [`Translator`] is any text-to-text capability keyed by target language.
//! [`TranslationBridge`] wraps one and enforces the contract every codec
//! relies on: blank input never reaches the backend, and backend failures
//! surface as [`Error::TranslationFailure`].

pub mod openai;
pub mod retry;

pub use openai::{OpenAiConfig, OpenAiTranslator};
pub use retry::RetryingTranslator;

use crate::error::{Error, Result};
use crate::language::TargetLanguage;
use std::cell::Cell;

/// A remote (or local) translation capability.
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`.
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String>;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        (**self).translate(text, target)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        (**self).translate(text, target)
    }
}

impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        (**self).translate(text, target)
    }
}

/// Request-scoped adapter between the codecs and a [`Translator`].
///
/// # Examples
///
/// ```
/// use doc_oxide::translator::{TranslationBridge, Translator};
/// use doc_oxide::{Result, TargetLanguage};
///
/// struct Upper;
///
/// impl Translator for Upper {
///     fn translate(&self, text: &str, _: &TargetLanguage) -> Result<String> {
///         Ok(text.to_uppercase())
///     }
/// }
///
/// let bridge = TranslationBridge::new(&Upper);
/// assert_eq!(bridge.translate("hi", &TargetLanguage::English).unwrap(), "HI");
/// assert_eq!(bridge.translate("  ", &TargetLanguage::English).unwrap(), "  ");
/// assert_eq!(bridge.calls(), 1);
/// ```
pub struct TranslationBridge<'t> {
    backend: &'t dyn Translator,
    calls: Cell<usize>,
}

impl<'t> TranslationBridge<'t> {
    /// Wrap a translator for one request.
    pub fn new(backend: &'t dyn Translator) -> Self {
        Self {
            backend,
            calls: Cell::new(0),
        }
    }

    /// Translate `text`, returning it unchanged when it is blank.
    pub fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.calls.set(self.calls.get() + 1);
        log::trace!("Translating {} chars into {}", text.chars().count(), target);
        self.backend.translate(text, target).map_err(|e| match e {
            Error::TranslationFailure(_) => e,
            other => Error::TranslationFailure(other.to_string()),
        })
    }

    /// Number of backend calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}
