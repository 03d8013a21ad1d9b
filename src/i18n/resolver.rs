use crate::i18n::Language;
use crate::storage::Preferences;
use reqwest::Url;
use tracing::debug;

/// What the host page tells us about the visitor.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Full URL of the current page; only its `lang` query parameter is read
    pub page_url: Option<Url>,

    /// Locale reported by the browser, e.g. "de-CH"
    pub browser_locale: Option<String>,
}

impl PageContext {
    pub fn new(page_url: Option<Url>, browser_locale: Option<&str>) -> Self {
        Self {
            page_url,
            browser_locale: browser_locale.map(str::to_string),
        }
    }
}

/// Pick the session language, first match wins:
/// `?lang=` (persisted when valid), stored preference, browser locale
/// reduced to its primary subtag, then the default language.
pub fn resolve_language(context: &PageContext, preferences: &Preferences) -> Language {
    if let Some(url) = &context.page_url {
        let requested = url
            .query_pairs()
            .find(|(name, _)| name == "lang")
            .map(|(_, value)| value.to_lowercase());
        if let Some(language) = requested.and_then(|code| Language::from_code(&code).ok()) {
            debug!("Language {} taken from query parameter", language);
            preferences.set_language(language.code());
            return language;
        }
    }

    if let Some(language) = preferences
        .language()
        .and_then(|code| Language::from_code(&code).ok())
    {
        debug!("Language {} taken from stored preference", language);
        return language;
    }

    if let Some(locale) = &context.browser_locale {
        let locale = locale.to_lowercase();
        let primary = locale.split('-').next().unwrap_or_default();
        if let Ok(language) = Language::from_code(primary) {
            debug!("Language {} taken from browser locale {}", language, locale);
            return language;
        }
    }

    Language::canonical()
}
