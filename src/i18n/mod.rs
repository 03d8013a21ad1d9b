//! Internationalization (i18n) module: the site's translation engine.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages
//! - `language`: Validated `Language` type
//! - `dictionary`: Nested JSON string tables addressed by dotted keys
//! - `loader`: Fetch-once-per-session dictionary cache (HTTP or directory)
//! - `resolver`: Session language resolution (query, storage, browser, default)
//! - `document`: Renderer-agnostic model of translatable page elements
//! - `engine`: `Translator`, the lookup function other components call
//! - `strings`: Built-in English for widgets running without a translator
//! - `validator`: Dictionary quality checks
//! - `metrics`: Dictionary loading and lookup counters
//!
//! # Example
//!
//! ```rust,ignore
//! use amanthos_booking::i18n::{Localizer, Translator};
//!
//! let translator = Translator::bootstrap(source, prefs, &context, &mut document).await;
//! let label = translator.translate("booking.only_left", &[("n", "2")]);
//! ```

mod dictionary;
mod document;
mod engine;
mod language;
mod loader;
mod metrics;
mod registry;
mod resolver;
mod strings;
mod validator;

pub use dictionary::{substitute, Dictionary};
pub use document::{Binding, Document, Element, LanguageOption, LanguageSelector};
pub use engine::{LanguageChanged, Translator};
pub use language::Language;
pub use loader::{DictionaryLoader, DictionarySource};
pub use metrics::{DictionaryMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use resolver::{resolve_language, PageContext};
pub use strings::{BuiltinEnglish, ENGLISH_STRINGS};
pub use validator::{DictionaryValidator, ValidationReport};

/// Resolves display strings by key. Implemented by the live `Translator` and
/// by the built-in English table.
pub trait Localizer {
    /// Look up `key` and replace each `{name}` with its substitution.
    fn translate(&self, key: &str, substitutions: &[(&str, &str)]) -> String;
}
