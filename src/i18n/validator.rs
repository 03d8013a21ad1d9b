//! Dictionary quality validation.
//!
//! Compares a translated dictionary against the default-language one: the
//! reserved `meta.*` keys must exist, and every `{placeholder}` a template
//! uses must survive translation, otherwise substitutions silently stop
//! working in that language.

use crate::i18n::Dictionary;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const REQUIRED_KEYS: &[&str] = &["meta.title", "meta.description"];

/// Validation report containing errors and warnings about a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that break rendering or substitution
    pub errors: Vec<String>,

    /// Gaps that degrade to default-language text
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct DictionaryValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl DictionaryValidator {
    /// Validate `translated` against the `reference` (default-language) dictionary.
    pub fn validate(reference: &Dictionary, translated: &Dictionary) -> ValidationReport {
        let mut report = ValidationReport::new();

        for key in REQUIRED_KEYS {
            if translated.get(key).is_none() {
                report.errors.push(format!("Missing required key '{}'", key));
            }
        }

        let reference_keys: BTreeSet<String> = reference.keys().into_iter().collect();
        let translated_keys: BTreeSet<String> = translated.keys().into_iter().collect();

        for key in reference_keys.difference(&translated_keys) {
            report
                .warnings
                .push(format!("Key '{}' is missing and falls back to the default language", key));
        }
        for key in translated_keys.difference(&reference_keys) {
            report
                .warnings
                .push(format!("Key '{}' is not present in the default language", key));
        }

        for key in reference_keys.intersection(&translated_keys) {
            let (Some(original), Some(translation)) = (reference.get(key), translated.get(key))
            else {
                continue;
            };
            let expected = Self::extract_placeholders(original);
            let actual = Self::extract_placeholders(translation);
            if expected != actual {
                report.errors.push(format!(
                    "Placeholder mismatch in '{}': expected {:?}, found {:?}",
                    key, expected, actual
                ));
            }
        }

        report
    }

    /// `{name}` placeholders used by a template.
    pub fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
