//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is a lazily initialised, immutable singleton behind a
//! `OnceLock`. Every language code the site accepts, from the query string,
//! from storage, or from the browser locale, is checked against it.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "de")
    pub code: &'static str,

    /// English name of the language (e.g., "German")
    pub name: &'static str,

    /// Label shown in the language selector (e.g., "DE", "日本語")
    pub native_name: &'static str,

    /// Whether this is the default language (exactly one should be true).
    /// Its dictionary is always loaded and backs every lookup.
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,

    /// Extra stylesheet needed to render the script (CJK fonts)
    pub stylesheet: Option<&'static str>,
}

impl LanguageConfig {
    pub fn is_cjk(&self) -> bool {
        self.stylesheet.is_some()
    }
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All enabled languages, in selector order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one canonical language.
    /// The table is static, so this is a programming error caught by tests.
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

const NOTO_SANS_SC: &str =
    "https://fonts.googleapis.com/css2?family=Noto+Sans+SC:wght@400;500;700&display=swap";
const NOTO_SANS_JP: &str =
    "https://fonts.googleapis.com/css2?family=Noto+Sans+JP:wght@400;500;700&display=swap";
const NOTO_SANS_KR: &str =
    "https://fonts.googleapis.com/css2?family=Noto+Sans+KR:wght@400;500;700&display=swap";

fn default_languages() -> Vec<LanguageConfig> {
    let latin = |code, name, native_name, is_canonical| LanguageConfig {
        code,
        name,
        native_name,
        is_canonical,
        enabled: true,
        stylesheet: None,
    };
    let cjk = |code, name, native_name, stylesheet| LanguageConfig {
        code,
        name,
        native_name,
        is_canonical: false,
        enabled: true,
        stylesheet: Some(stylesheet),
    };

    vec![
        latin("en", "English", "EN", true),
        latin("de", "German", "DE", false),
        latin("fr", "French", "FR", false),
        latin("it", "Italian", "IT", false),
        cjk("zh", "Chinese", "中文", NOTO_SANS_SC),
        cjk("ja", "Japanese", "日本語", NOTO_SANS_JP),
        cjk("ko", "Korean", "한국어", NOTO_SANS_KR),
    ]
}
