//! Command-line front end for the booking widget.
//!
//! Usage:
//!   amanthos-booking [PROPERTY] ARRIVAL DEPARTURE [ADULTS] [--lang CODE] [--select N] [--promo CODE]
//!
//! PROPERTY is one of GBAL, GNBE, NYAL. When omitted, a location preselected
//! elsewhere on the site is used. `--select` and `--promo` preview the
//! checkout total for one offer; no booking is created.
//!
//! Environment: BOOKING_API_BASE, LOCALES_SOURCE, PREFERENCES_PATH,
//! WAKE_DELAY_MS, BOOKING_ORIGIN (all optional).

use amanthos_booking::api::ApiClient;
use amanthos_booking::booking::{BookingFlow, FlowView, OffersView, SearchForm, WidgetView};
use amanthos_booking::config::Config;
use amanthos_booking::i18n::{DictionarySource, Document, PageContext, Translator};
use amanthos_booking::models::find_property;
use amanthos_booking::storage::{FileStorage, MemoryStorage, Preferences};
use amanthos_booking::wake::spawn_wake_ping;
use anyhow::{bail, Context, Result};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

struct Args {
    positional: Vec<String>,
    lang: Option<String>,
    select: Option<usize>,
    promo: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        positional: Vec::new(),
        lang: None,
        select: None,
        promo: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lang" => args.lang = Some(iter.next().context("--lang needs a language code")?),
            "--select" => {
                let value = iter.next().context("--select needs an offer number")?;
                let number: usize = value
                    .parse()
                    .with_context(|| format!("Invalid offer number: {}", value))?;
                if number == 0 {
                    bail!("Offer numbers start at 1");
                }
                args.select = Some(number - 1);
            }
            "--promo" => args.promo = Some(iter.next().context("--promo needs a code")?),
            _ => args.positional.push(arg),
        }
    }
    Ok(args)
}

fn search_form(args: &Args, preferences: &Preferences) -> Result<SearchForm> {
    let mut positional = args.positional.clone();
    let has_property = positional
        .first()
        .is_some_and(|p| find_property(&p.to_uppercase()).is_some());

    let location = if has_property {
        positional.remove(0).to_uppercase()
    } else {
        preferences
            .take_preselected_location()
            .context("No property given and none preselected")?
    };

    let mut rest = positional.into_iter();
    let (Some(check_in), Some(check_out)) = (rest.next(), rest.next()) else {
        bail!("Usage: amanthos-booking [PROPERTY] ARRIVAL DEPARTURE [ADULTS] [--lang CODE]");
    };
    let guests = rest.next().unwrap_or_else(|| "2".to_string());

    Ok(SearchForm::new(&location, &check_in, &check_out, &guests))
}

fn print_offers(view: &OffersView) {
    println!("{}", view.property_name);
    println!("{}", view.summary);
    if let Some(message) = &view.empty_message {
        println!("{}", message);
    }
    for group in &view.groups {
        println!("\n{}", group.heading);
        for card in &group.cards {
            let marker = if card.selected { ">" } else { " " };
            let tag = card
                .best_price_tag
                .as_deref()
                .map(|t| format!(" [{}]", t))
                .unwrap_or_default();
            println!(
                "{} {}. {}{} - {}",
                marker,
                card.index + 1,
                card.unit_name,
                tag,
                card.rate_name
            );
            println!("     {}  ({})", card.total, card.per_night);
            if let Some(scarcity) = &card.scarcity {
                println!("     {}", scarcity);
            }
            println!("     {}", card.trust_line);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("amanthos_booking=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let args = parse_args()?;

    let preferences = Preferences::new(
        Arc::new(FileStorage::open(&config.preferences_path)),
        Arc::new(MemoryStorage::new()),
    );

    let api = ApiClient::new(&config);
    let wake = spawn_wake_ping(api.clone(), Duration::from_millis(config.wake_delay_ms));

    let page_url = match &args.lang {
        Some(code) => Some(
            Url::parse_with_params("https://amanthosliving.com/", &[("lang", code)])
                .context("Failed to build page URL")?,
        ),
        None => None,
    };
    let browser_locale = std::env::var("LANG").ok().map(|l| l.replace('_', "-"));
    let context = PageContext::new(page_url, browser_locale.as_deref());

    let mut document = Document::default();
    let translator = Translator::bootstrap(
        DictionarySource::from_location(&config.locales_source),
        preferences.clone(),
        &context,
        &mut document,
    )
    .await;

    let form = search_form(&args, &preferences)?;
    info!("Searching {} from {} to {}", form.location, form.check_in, form.check_out);

    let mut flow = BookingFlow::new(api, &config.booking_origin);
    if let Err(e) = flow.search(&form).await {
        bail!("{}", flow_message(&flow.view(&translator), &e.to_string()));
    }

    if let Some(index) = args.select {
        flow.select_offer(index)
            .with_context(|| format!("Offer {} does not exist", index + 1))?;
        if let Some(code) = &args.promo {
            flow.apply_promo(code)?;
        }
    }

    match flow.view(&translator).body {
        FlowView::Offers(offers) => print_offers(&offers),
        FlowView::Checkout { offers, checkout } => {
            print_offers(&offers);
            println!("\n{}", checkout.offer_title);
            match &checkout.discounted_total {
                Some(discounted) => println!("{} -> {}", checkout.total, discounted),
                None => println!("{}", checkout.total),
            }
            if let Some(message) = &checkout.promo_message {
                println!("{}", message);
            }
        }
        FlowView::Error(error) => {
            println!("{}", error.message);
            println!("{}", error.help);
        }
        other => warn!("Unexpected view after search: {:?}", other),
    }

    let report = translator.metrics();
    info!(
        "Translations: {} fetches, {} failures, {} fallbacks, {} missing keys",
        report.fetches, report.fetch_failures, report.fallbacks, report.misses
    );
    if !wake.is_finished() {
        wake.abort();
    }
    Ok(())
}

fn flow_message(view: &WidgetView, fallback: &str) -> String {
    match &view.search_error {
        Some(field) => field.message.clone(),
        None => fallback.to_string(),
    }
}
