use crate::i18n::Localizer;

/// A user-facing message held in flow state. Localized messages are kept as
/// keys and resolved when the view is built, so a language switch re-renders
/// them. Server messages are shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Key {
        key: &'static str,
        substitutions: Vec<(&'static str, String)>,
    },
    Server(String),
}

impl Notice {
    pub fn key(key: &'static str) -> Self {
        Self::Key {
            key,
            substitutions: Vec::new(),
        }
    }

    pub fn with(key: &'static str, name: &'static str, value: impl Into<String>) -> Self {
        Self::Key {
            key,
            substitutions: vec![(name, value.into())],
        }
    }

    /// A server-provided message, or `fallback` when the server sent none.
    pub fn server_or(message: Option<&str>, fallback: &'static str) -> Self {
        match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(message) => Self::Server(message.to_string()),
            None => Self::key(fallback),
        }
    }

    pub fn render(&self, localizer: &dyn Localizer) -> String {
        match self {
            Notice::Key { key, substitutions } => {
                let pairs: Vec<(&str, &str)> = substitutions
                    .iter()
                    .map(|(name, value)| (*name, value.as_str()))
                    .collect();
                localizer.translate(key, &pairs)
            }
            Notice::Server(message) => message.clone(),
        }
    }
}
