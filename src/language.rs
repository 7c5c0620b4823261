//! Target language identifiers.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Language a document is translated into.
///
/// The named variants are the languages the UI offers; anything else the
/// backend understands can be passed through as [`TargetLanguage::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetLanguage {
    /// Chinese (`zh`)
    Chinese,
    /// English (`en`)
    English,
    /// German (`de`)
    German,
    /// Japanese (`ja`)
    Japanese,
    /// Korean (`ko`)
    Korean,
    /// Any other language, as given (code or name)
    Other(String),
}

impl TargetLanguage {
    /// Short language code.
    pub fn code(&self) -> &str {
        match self {
            TargetLanguage::Chinese => "zh",
            TargetLanguage::English => "en",
            TargetLanguage::German => "de",
            TargetLanguage::Japanese => "ja",
            TargetLanguage::Korean => "ko",
            TargetLanguage::Other(code) => code,
        }
    }

    /// English name used in the translation prompt.
    pub fn display_name(&self) -> &str {
        match self {
            TargetLanguage::Chinese => "Chinese",
            TargetLanguage::English => "English",
            TargetLanguage::German => "German",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::Korean => "Korean",
            TargetLanguage::Other(name) => name,
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = Error;

    /// Parse a language code or name, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_oxide::TargetLanguage;
    ///
    /// assert_eq!("ZH".parse::<TargetLanguage>().unwrap(), TargetLanguage::Chinese);
    /// assert_eq!("德文".parse::<TargetLanguage>().unwrap(), TargetLanguage::German);
    /// assert_eq!(
    ///     "fr".parse::<TargetLanguage>().unwrap(),
    ///     TargetLanguage::Other("fr".to_string())
    /// );
    /// assert!("".parse::<TargetLanguage>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lang = match trimmed.to_lowercase().as_str() {
            "" => return Err(Error::InvalidLanguage(s.to_string())),
            "zh" | "zh-cn" | "zh-hans" | "chinese" | "中文" => TargetLanguage::Chinese,
            "en" | "en-us" | "en-gb" | "english" | "英文" => TargetLanguage::English,
            "de" | "de-de" | "german" | "deutsch" | "德文" => TargetLanguage::German,
            "ja" | "ja-jp" | "japanese" | "日文" | "日本語" => TargetLanguage::Japanese,
            "ko" | "ko-kr" | "korean" | "韩文" | "한국어" => TargetLanguage::Korean,
            _ => {
                let valid = trimmed
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == ' ');
                if !valid {
                    return Err(Error::InvalidLanguage(s.to_string()));
                }
                TargetLanguage::Other(trimmed.to_string())
            },
        };
        Ok(lang)
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("zh".parse::<TargetLanguage>().unwrap(), TargetLanguage::Chinese);
        assert_eq!("en".parse::<TargetLanguage>().unwrap(), TargetLanguage::English);
        assert_eq!(" de ".parse::<TargetLanguage>().unwrap(), TargetLanguage::German);
        assert_eq!("JA".parse::<TargetLanguage>().unwrap(), TargetLanguage::Japanese);
        assert_eq!("ko".parse::<TargetLanguage>().unwrap(), TargetLanguage::Korean);
    }

    #[test]
    fn test_parse_ui_names() {
        assert_eq!("中文".parse::<TargetLanguage>().unwrap(), TargetLanguage::Chinese);
        assert_eq!("英文".parse::<TargetLanguage>().unwrap(), TargetLanguage::English);
        assert_eq!("日文".parse::<TargetLanguage>().unwrap(), TargetLanguage::Japanese);
        assert_eq!("English".parse::<TargetLanguage>().unwrap(), TargetLanguage::English);
    }

    #[test]
    fn test_parse_other() {
        let lang = "Brazilian Portuguese".parse::<TargetLanguage>().unwrap();
        assert_eq!(lang.display_name(), "Brazilian Portuguese");
        assert_eq!("zh-TW".parse::<TargetLanguage>().unwrap().code(), "zh-TW");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "   ".parse::<TargetLanguage>(),
            Err(Error::InvalidLanguage(_))
        ));
        assert!("en; drop".parse::<TargetLanguage>().is_err());
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(TargetLanguage::Japanese.to_string(), "ja");
        assert_eq!(TargetLanguage::Korean.display_name(), "Korean");
    }
}
