//! Renderer-agnostic model of the translatable parts of a page.

use crate::i18n::{Dictionary, Language};
use std::collections::BTreeMap;

/// How an element takes its text from the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Replace the element's text content
    Text(String),
    /// Set a caller-named attribute
    Attribute { key: String, attribute: String },
    /// Set the `placeholder` attribute
    Placeholder(String),
    /// Set the `aria-label` attribute
    AriaLabel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub bindings: Vec<Binding>,
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn text(key: &str, fallback: &str) -> Self {
        Self {
            bindings: vec![Binding::Text(key.to_string())],
            text: fallback.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub lang: String,
    pub title: String,
    pub meta_description: Option<String>,
    pub stylesheets: Vec<String>,
    pub cjk: bool,
    pub elements: Vec<Element>,
}

impl Document {
    /// Rewrite every bound element from `dict`. Keys the dictionary lacks
    /// leave the element as it was.
    pub fn apply(&mut self, dict: &Dictionary, language: Language) {
        for element in &mut self.elements {
            for binding in &element.bindings {
                match binding {
                    Binding::Text(key) => {
                        if let Some(value) = dict.get(key) {
                            element.text = value.to_string();
                        }
                    }
                    Binding::Attribute { key, attribute } => {
                        if let Some(value) = dict.get(key) {
                            element.attributes.insert(attribute.clone(), value.to_string());
                        }
                    }
                    Binding::Placeholder(key) => {
                        if let Some(value) = dict.get(key) {
                            element
                                .attributes
                                .insert("placeholder".to_string(), value.to_string());
                        }
                    }
                    Binding::AriaLabel(key) => {
                        if let Some(value) = dict.get(key) {
                            element
                                .attributes
                                .insert("aria-label".to_string(), value.to_string());
                        }
                    }
                }
            }
        }

        self.lang = language.code().to_string();

        if let (Some(current), Some(value)) = (&mut self.meta_description, dict.get("meta.description")) {
            *current = value.to_string();
        }
        if let Some(value) = dict.get("meta.title") {
            self.title = value.to_string();
        }

        // CJK fonts are attached once and kept for the rest of the session.
        if let Some(stylesheet) = language.config().stylesheet {
            if !self.cjk {
                self.stylesheets.push(stylesheet.to_string());
                self.cjk = true;
            }
        }
    }
}

/// One entry of the language picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub code: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelector {
    pub current_label: &'static str,
    pub options: Vec<LanguageOption>,
}

impl LanguageSelector {
    pub fn build(current: Language) -> Self {
        let options = crate::i18n::LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| LanguageOption {
                code: config.code,
                label: config.native_name,
                active: config.code == current.code(),
            })
            .collect();

        Self {
            current_label: current.native_name(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn german() -> Dictionary {
        Dictionary::from_value(json!({
            "meta": {"title": "Amanthos Living – Apartments", "description": "Serviced Apartments in der Schweiz"},
            "nav": {"book_now": "Jetzt buchen"},
            "booking": {"guest_email": "E-Mail", "close": "Schliessen"}
        }))
    }

    fn page() -> Document {
        Document {
            lang: "en".to_string(),
            title: "Amanthos Living".to_string(),
            meta_description: Some("Serviced apartments in Switzerland".to_string()),
            stylesheets: Vec::new(),
            cjk: false,
            elements: vec![
                Element::text("nav.book_now", "Book now"),
                Element::text("nav.missing", "About us"),
                Element::default().with_binding(Binding::Placeholder("booking.guest_email".to_string())),
                Element::default().with_binding(Binding::AriaLabel("booking.close".to_string())),
                Element::default().with_binding(Binding::Attribute {
                    key: "booking.close".to_string(),
                    attribute: "title".to_string(),
                }),
            ],
        }
    }

    #[test]
    fn test_apply_rewrites_text_and_attributes() {
        let mut doc = page();
        doc.apply(&german(), Language::GERMAN);

        assert_eq!(doc.elements[0].text, "Jetzt buchen");
        assert_eq!(doc.elements[2].attribute("placeholder"), Some("E-Mail"));
        assert_eq!(doc.elements[3].attribute("aria-label"), Some("Schliessen"));
        assert_eq!(doc.elements[4].attribute("title"), Some("Schliessen"));
    }

    #[test]
    fn test_apply_leaves_missing_keys_untouched() {
        let mut doc = page();
        doc.apply(&german(), Language::GERMAN);
        assert_eq!(doc.elements[1].text, "About us");
    }

    #[test]
    fn test_apply_updates_document_metadata() {
        let mut doc = page();
        doc.apply(&german(), Language::GERMAN);

        assert_eq!(doc.lang, "de");
        assert_eq!(doc.title, "Amanthos Living – Apartments");
        assert_eq!(
            doc.meta_description.as_deref(),
            Some("Serviced Apartments in der Schweiz")
        );
        assert!(!doc.cjk);
    }

    #[test]
    fn test_apply_with_empty_dictionary_only_sets_lang() {
        let mut doc = page();
        let before = doc.clone();
        doc.apply(&Dictionary::empty(), Language::GERMAN);

        assert_eq!(doc.lang, "de");
        assert_eq!(doc.title, before.title);
        assert_eq!(doc.elements, before.elements);
    }

    #[test]
    fn test_cjk_stylesheet_attached_once() {
        let mut doc = page();
        let japanese = Language::from_code("ja").unwrap();
        doc.apply(&Dictionary::empty(), japanese);
        doc.apply(&Dictionary::empty(), Language::from_code("ko").unwrap());

        assert!(doc.cjk);
        assert_eq!(doc.stylesheets.len(), 1);
        assert!(doc.stylesheets[0].contains("Noto+Sans+JP"));
    }

    #[test]
    fn test_language_selector_marks_active() {
        let selector = LanguageSelector::build(Language::GERMAN);
        assert_eq!(selector.current_label, "DE");
        assert_eq!(selector.options.len(), 7);
        let active: Vec<_> = selector.options.iter().filter(|o| o.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "de");
    }
}
