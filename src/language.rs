//! Track language extraction and consistency checks.

use isolang::Language;

use crate::document::TtmlDocument;
use crate::error::{Result, TtmlError};

/// ISO 639-3 code used when a document's language is missing or unknown
pub const UNDETERMINED: &str = "und";

/// Convert a BCP 47 style tag (`en`, `en-US`, `deu`) to an ISO 639-3 code.
pub fn to_iso639_3(tag: &str) -> Option<&'static str> {
    let primary = tag
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    };
    language.map(|l| l.to_639_3())
}

/// Adopts the language of the first document and checks every later one
/// against it.
#[derive(Debug, Default)]
pub struct LanguageValidator {
    first: Option<String>,
    iso3: Option<String>,
}

impl LanguageValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the language of document number `index`.
    ///
    /// Raw tags are compared as strings: `en` and `en-US` are different languages here.
    pub fn check(&mut self, index: usize, document: &TtmlDocument) -> Result<()> {
        let lang = document.language();
        match &self.first {
            None => {
                let iso3 = match to_iso639_3(lang) {
                    Some(code) => code,
                    None => {
                        tracing::warn!(
                            "Unrecognised language '{}', using '{}'",
                            lang,
                            UNDETERMINED
                        );
                        UNDETERMINED
                    }
                };
                tracing::debug!("Track language: {} ({})", lang, iso3);
                self.first = Some(lang.to_string());
                self.iso3 = Some(iso3.to_string());
                Ok(())
            }
            Some(first) if first == lang => Ok(()),
            Some(first) => Err(TtmlError::InconsistentLanguage {
                document: index,
                expected: first.clone(),
                found: lang.to_string(),
            }),
        }
    }

    /// ISO 639-3 code of the adopted language, once a document has been checked
    pub fn iso3(&self) -> Option<&str> {
        self.iso3.as_deref()
    }
}
