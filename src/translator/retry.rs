//! Retry decorator for flaky translation backends.
//!
//! Lives outside the core: codecs only ever see a plain [`Translator`], so
//! a retrying one is an opt-in choice of the caller.

use super::Translator;
use crate::error::Result;
use crate::language::TargetLanguage;
use std::time::Duration;

/// Retries failed calls with linear backoff (`delay`, `2 * delay`, ...).
pub struct RetryingTranslator<T> {
    inner: T,
    retries: u32,
    delay: Duration,
}

impl<T: Translator> RetryingTranslator<T> {
    /// Wrap `inner`, retrying each failed call up to `retries` times.
    pub fn new(inner: T, retries: u32) -> Self {
        Self {
            inner,
            retries,
            delay: Duration::from_secs(1),
        }
    }

    /// Base delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The wrapped translator.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Translator> Translator for RetryingTranslator<T> {
    fn translate(&self, text: &str, target: &TargetLanguage) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.translate(text, target) {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    let wait = self.delay * attempt;
                    log::warn!(
                        "Translation attempt {} of {} failed ({}), retrying in {:?}",
                        attempt,
                        self.retries + 1,
                        e,
                        wait
                    );
                    std::thread::sleep(wait);
                },
                Err(e) => return Err(e),
            }
        }
    }
}
