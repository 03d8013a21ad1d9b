use crate::i18n::{Dictionary, DictionaryMetrics, Language};
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where `<lang>.json` dictionaries come from.
#[derive(Debug, Clone)]
pub enum DictionarySource {
    /// `GET {base_url}/{lang}.json`
    Http {
        client: reqwest::Client,
        base_url: String,
    },
    /// `{dir}/{lang}.json` on the local filesystem
    Directory(PathBuf),
}

impl DictionarySource {
    /// `http://` and `https://` locations are fetched; anything else is a directory.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http {
                client: reqwest::Client::new(),
                base_url: location.trim_end_matches('/').to_string(),
            }
        } else {
            Self::Directory(PathBuf::from(location))
        }
    }

    async fn fetch(&self, language: Language) -> Result<Dictionary> {
        let body = match self {
            Self::Http { client, base_url } => {
                let url = format!("{}/{}.json", base_url, language.code());
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to request {}", url))?;
                if !response.status().is_success() {
                    bail!("Dictionary request {} returned {}", url, response.status());
                }
                response
                    .text()
                    .await
                    .with_context(|| format!("Failed to read {}", url))?
            }
            Self::Directory(dir) => {
                let path = dir.join(format!("{}.json", language.code()));
                tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", path))?
            }
        };

        Dictionary::parse(&body).context("Dictionary is not valid JSON")
    }
}

/// Loads each language's dictionary at most once per session.
///
/// A failed fetch or parse caches an empty dictionary for that language, so
/// it is never retried and never reported to the caller.
#[derive(Debug)]
pub struct DictionaryLoader {
    source: DictionarySource,
    cache: HashMap<Language, Arc<Dictionary>>,
    metrics: Arc<DictionaryMetrics>,
}

impl DictionaryLoader {
    pub fn new(source: DictionarySource, metrics: Arc<DictionaryMetrics>) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            metrics,
        }
    }

    pub fn cached(&self, language: Language) -> Option<Arc<Dictionary>> {
        self.cache.get(&language).cloned()
    }

    pub async fn load(&mut self, language: Language) -> Arc<Dictionary> {
        if let Some(dict) = self.cache.get(&language) {
            self.metrics.record_cache_hit();
            return dict.clone();
        }

        self.metrics.record_fetch();
        let dict = match self.source.fetch(language).await {
            Ok(dict) => {
                debug!("Loaded {} dictionary ({} keys)", language, dict.keys().len());
                dict
            }
            Err(e) => {
                self.metrics.record_fetch_failure();
                warn!("Could not load {} dictionary, using raw keys: {:#}", language, e);
                Dictionary::empty()
            }
        };

        let dict = Arc::new(dict);
        self.cache.insert(language, dict.clone());
        dict
    }
}
