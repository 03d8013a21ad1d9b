use crate::i18n::dictionary::substitute;
use crate::i18n::resolver::{resolve_language, PageContext};
use crate::i18n::{
    Dictionary, DictionaryLoader, DictionaryMetrics, DictionarySource, Document, Language,
    LanguageSelector, Localizer, MetricsReport,
};
use crate::storage::Preferences;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Emitted after a language switch has been applied to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageChanged {
    pub language: Language,
}

/// The session's translation engine.
///
/// Owns the dictionary cache and the active language. Lookups go active
/// dictionary, then default-language dictionary, then the raw key.
pub struct Translator {
    loader: DictionaryLoader,
    preferences: Preferences,
    metrics: Arc<DictionaryMetrics>,
    language: Language,
    active: Arc<Dictionary>,
    fallback: Arc<Dictionary>,
    events: broadcast::Sender<LanguageChanged>,
}

impl Translator {
    /// Resolve the session language, load the default and active
    /// dictionaries, and apply the active one to `document`.
    pub async fn bootstrap(
        source: DictionarySource,
        preferences: Preferences,
        context: &PageContext,
        document: &mut Document,
    ) -> Self {
        let metrics = Arc::new(DictionaryMetrics::new());
        let mut loader = DictionaryLoader::new(source, metrics.clone());
        let language = resolve_language(context, &preferences);

        let fallback = loader.load(Language::canonical()).await;
        let active = if language.is_canonical() {
            fallback.clone()
        } else {
            loader.load(language).await
        };

        document.apply(&active, language);
        info!("Translations ready for {}", language);

        let (events, _) = broadcast::channel(16);
        Self {
            loader,
            preferences,
            metrics,
            language,
            active,
            fallback,
            events,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LanguageChanged> {
        self.events.subscribe()
    }

    pub fn selector(&self) -> LanguageSelector {
        LanguageSelector::build(self.language)
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Fetch (or reuse) the dictionary for `language` without activating it.
    pub async fn load_dictionary(&mut self, language: Language) -> Arc<Dictionary> {
        self.loader.load(language).await
    }

    /// Switch to `code`. Unsupported codes are ignored and return `false`.
    pub async fn switch_language(&mut self, code: &str, document: &mut Document) -> bool {
        let Ok(language) = Language::from_code(code) else {
            debug!("Ignoring switch to unsupported language '{}'", code);
            return false;
        };

        self.preferences.set_language(language.code());
        self.active = self.loader.load(language).await;
        self.language = language;
        document.apply(&self.active, language);

        // No subscribers is fine.
        let _ = self.events.send(LanguageChanged { language });
        info!("Switched language to {}", language);
        true
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.active.get(key) {
            return Some(value);
        }
        let value = self.fallback.get(key);
        if value.is_some() {
            self.metrics.record_fallback();
        }
        value
    }
}

impl Localizer for Translator {
    fn translate(&self, key: &str, substitutions: &[(&str, &str)]) -> String {
        match self.lookup(key) {
            Some(template) => substitute(template, substitutions),
            None => {
                self.metrics.record_miss();
                key.to_string()
            }
        }
    }
}
