//! Validate translation dictionaries against the default language.
//!
//! Usage:
//!   cargo run --bin check-locales              # checks LOCALES_SOURCE (default: locales/)
//!   cargo run --bin check-locales -- path/to   # checks another directory
//!
//! Every enabled language other than the default is compared with the
//! default-language file. Missing files are reported; placeholder or
//! `meta.*` problems fail the run.

use amanthos_booking::i18n::{Dictionary, DictionaryValidator, LanguageRegistry};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

fn read_dictionary(path: &Path) -> Result<Dictionary> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Dictionary::parse(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("check_locales=info".parse()?),
        )
        .init();

    let dir: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LOCALES_SOURCE").ok())
        .unwrap_or_else(|| "locales".to_string())
        .into();

    let registry = LanguageRegistry::get();
    let canonical = registry.canonical();
    let reference = read_dictionary(&dir.join(format!("{}.json", canonical.code)))?;
    info!(
        "Reference dictionary {}.json has {} keys",
        canonical.code,
        reference.keys().len()
    );

    let mut failed = 0;
    for language in registry.list_enabled() {
        if language.is_canonical {
            continue;
        }
        let path = dir.join(format!("{}.json", language.code));
        if !path.exists() {
            warn!("{} ({}): no dictionary, falls back to {}", language.code, language.name, canonical.code);
            continue;
        }

        let report = DictionaryValidator::validate(&reference, &read_dictionary(&path)?);
        for message in &report.warnings {
            warn!("{}: {}", language.code, message);
        }
        for message in &report.errors {
            error!("{}: {}", language.code, message);
        }

        if report.has_errors() {
            failed += 1;
        } else if report.is_clean() {
            info!("{} ({}): OK", language.code, language.name);
        } else {
            info!(
                "{} ({}): OK with {} warnings",
                language.code,
                language.name,
                report.warnings.len()
            );
        }
    }

    if failed > 0 {
        bail!("{} dictionaries have errors", failed);
    }
    Ok(())
}
