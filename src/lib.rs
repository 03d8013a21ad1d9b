//! Amanthos Living booking client.
//!
//! The booking widget (search, offers, promo codes, guest details, payment)
//! as a rendering-agnostic state machine, the site's translation engine,
//! and the small pieces around them: reservation API client, client-side
//! preferences, support chat and funnel analytics.

pub mod analytics;
pub mod api;
pub mod booking;
pub mod chat;
pub mod config;
pub mod error;
pub mod i18n;
pub mod models;
pub mod storage;
pub mod wake;
