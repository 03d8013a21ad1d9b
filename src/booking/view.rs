//! View models for the booking widget.
//!
//! Built from the flow state and a `Localizer` on every render, so a
//! language switch only needs a re-render. Nothing here holds state.

use crate::booking::state::{BookingState, Confirmation, OfferSet, SearchFailure, Selection};
use crate::error::{Field, FieldError};
use crate::i18n::Localizer;
use crate::models::{Money, Offer, RateCategory};

/// Placeholder cards shown while offers load.
pub const SKELETON_CARDS: usize = 3;

/// Scarcity is highlighted at or below this many units.
pub const SCARCITY_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    pub field: Field,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferCard {
    /// Position in display order, the index `select_offer` takes.
    pub index: usize,
    pub category: &'static str,
    pub best_price_tag: Option<String>,
    pub unit_name: String,
    pub rate_name: String,
    pub total: String,
    pub per_night: String,
    pub scarcity: Option<String>,
    /// `scarcity` is the "only n left" form.
    pub urgent: bool,
    pub trust_line: String,
    pub select_label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferGroup {
    pub heading: String,
    pub cards: Vec<OfferCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffersView {
    pub property_name: String,
    pub summary: String,
    pub groups: Vec<OfferGroup>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutView {
    pub offer_title: String,
    pub total: String,
    /// Present while a promo is applied; `total` is then shown struck through.
    pub discounted_total: Option<String>,
    pub promo_message: Option<String>,
    pub promo_applied: bool,
    pub status: Option<String>,
    pub submit_label: String,
    pub submit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeConfirmedView {
    pub heading: String,
    pub badge: String,
    pub note: String,
    pub email_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentView {
    pub heading: String,
    pub badge: String,
    pub instruction: String,
    pub amount_due: String,
    pub pay_label: String,
    pub payment_link: String,
    pub secure_note: String,
    pub email_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRetryView {
    pub heading: String,
    pub badge: String,
    pub instruction: String,
    pub amount_due: String,
    pub retry_label: String,
    pub retry_enabled: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub message: String,
    pub help: String,
    pub retry_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowView {
    Search,
    Loading {
        skeleton_cards: usize,
    },
    Offers(OffersView),
    Checkout {
        offers: OffersView,
        checkout: CheckoutView,
    },
    FreeConfirmed(FreeConfirmedView),
    PaymentPending(PaymentView),
    PaymentRetry(PaymentRetryView),
    Error(ErrorView),
}

/// The whole widget: the search bar stays on screen above every flow
/// view, so its field message is rendered whatever state the flow is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub search_error: Option<FieldMessage>,
    pub body: FlowView,
}

pub fn render(
    state: &BookingState,
    field_error: Option<&FieldError>,
    l10n: &dyn Localizer,
) -> WidgetView {
    WidgetView {
        search_error: field_error.map(|e| FieldMessage {
            field: e.field,
            message: l10n.translate(e.key, &[]),
        }),
        body: flow_view(state, l10n),
    }
}

fn flow_view(state: &BookingState, l10n: &dyn Localizer) -> FlowView {
    match state {
        BookingState::Idle => FlowView::Search,
        BookingState::SearchSubmitted(_) | BookingState::OffersLoading(_) => FlowView::Loading {
            skeleton_cards: SKELETON_CARDS,
        },
        BookingState::OffersShown(offers) => FlowView::Offers(offers_view(offers, None, l10n)),
        BookingState::OfferSelected(selection) => FlowView::Checkout {
            offers: offers_view(&selection.offers, Some(selection.index), l10n),
            checkout: checkout_view(selection, false, l10n),
        },
        BookingState::Submitting(selection) => FlowView::Checkout {
            offers: offers_view(&selection.offers, Some(selection.index), l10n),
            checkout: checkout_view(selection, true, l10n),
        },
        BookingState::FreeConfirmed(confirmation) => {
            FlowView::FreeConfirmed(free_confirmed_view(confirmation, l10n))
        }
        BookingState::PaymentPending {
            confirmation,
            payment_link,
        } => FlowView::PaymentPending(payment_view(confirmation, payment_link, l10n)),
        BookingState::PaymentRetryable {
            confirmation,
            retrying,
            error,
        } => FlowView::PaymentRetry(PaymentRetryView {
            heading: l10n.translate(
                "booking.payment_confirmed_id",
                &[("id", confirmation.confirmation_id.as_str())],
            ),
            badge: l10n.translate("booking.payment_pending", &[]),
            instruction: l10n.translate("booking.payment_instruction", &[]),
            amount_due: confirmation.amount_due.display(),
            retry_label: if *retrying {
                l10n.translate("booking.processing", &[])
            } else {
                l10n.translate("booking.retry_payment", &[])
            },
            retry_enabled: !retrying,
            error: error.as_ref().map(|n| n.render(l10n)),
        }),
        BookingState::Error { failure, .. } => FlowView::Error(ErrorView {
            message: match failure {
                SearchFailure::ColdStart => l10n.translate("booking.server_waking", &[]),
                SearchFailure::Unavailable(_) => l10n.translate("booking.unable_to_check", &[]),
            },
            help: l10n.translate("booking.error_help", &[]),
            retry_label: l10n.translate("booking.try_again", &[]),
        }),
    }
}

/// `CHF 123.40`, or the currency and a dash when the amount is missing or zero.
fn money_text(money: Option<&Money>, currency: &str) -> String {
    match money.filter(|m| m.amount != 0.0) {
        Some(money) => format!("{} {:.2}", currency, money.amount),
        None => format!("{} \u{2014}", currency),
    }
}

fn plural(l10n: &dyn Localizer, count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        l10n.translate(singular, &[])
    } else {
        l10n.translate(plural, &[])
    }
}

pub fn offers_view(offers: &OfferSet, selected: Option<usize>, l10n: &dyn Localizer) -> OffersView {
    let query = &offers.query;
    let summary = format!(
        "{} \u{2192} {} \u{b7} {} {} \u{b7} {} {}",
        query.arrival.format("%Y-%m-%d"),
        query.departure.format("%Y-%m-%d"),
        offers.nights,
        plural(l10n, offers.nights, "booking.night", "booking.nights"),
        query.adults,
        plural(
            l10n,
            i64::from(query.adults),
            "booking.guest_singular",
            "booking.guests_plural"
        ),
    );

    let best_price = offers.best_price_count();
    let mut groups = Vec::new();
    if best_price > 0 {
        groups.push(OfferGroup {
            heading: l10n.translate("booking.best_price_label", &[]),
            cards: offers.offers[..best_price]
                .iter()
                .enumerate()
                .map(|(i, offer)| offer_card(offer, i, selected == Some(i), l10n))
                .collect(),
        });
    }
    if best_price < offers.len() {
        groups.push(OfferGroup {
            heading: l10n.translate("booking.flexible_label", &[]),
            cards: offers.offers[best_price..]
                .iter()
                .enumerate()
                .map(|(i, offer)| {
                    let index = best_price + i;
                    offer_card(offer, index, selected == Some(index), l10n)
                })
                .collect(),
        });
    }

    OffersView {
        property_name: offers.property_name.clone(),
        summary,
        empty_message: offers
            .is_empty()
            .then(|| l10n.translate("booking.no_offers", &[])),
        groups,
    }
}

pub fn offer_card(offer: &Offer, index: usize, selected: bool, l10n: &dyn Localizer) -> OfferCard {
    let best_price = offer.category == RateCategory::NonRefundable;
    let currency = offer.currency();
    let units = offer.available_units;
    let count = units.to_string();

    let (scarcity, urgent) = match units {
        0 => (None, false),
        n if n <= SCARCITY_THRESHOLD => (
            Some(l10n.translate("booking.only_left", &[("n", count.as_str())])),
            true,
        ),
        _ => (
            Some(l10n.translate("booking.available", &[("n", count.as_str())])),
            false,
        ),
    };

    let unit_name = if offer.unit_group_name.is_empty() {
        l10n.translate("booking.apartment", &[])
    } else {
        offer.unit_group_name.clone()
    };

    OfferCard {
        index,
        category: offer.category.label(),
        best_price_tag: best_price.then(|| l10n.translate("booking.best_price_tag", &[])),
        unit_name,
        rate_name: offer.rate_plan_name.clone(),
        total: format!(
            "{} {}",
            money_text(offer.total_gross_amount.as_ref(), currency),
            l10n.translate("booking.total", &[])
        ),
        per_night: format!(
            "{} {}",
            money_text(offer.average_per_night.as_ref(), currency),
            l10n.translate("booking.per_night", &[])
        ),
        scarcity,
        urgent,
        trust_line: if best_price {
            l10n.translate("booking.best_rate_guaranteed", &[])
        } else {
            l10n.translate("booking.free_cancellation", &[])
        },
        select_label: l10n.translate("booking.select", &[]),
        selected,
    }
}

pub fn checkout_view(selection: &Selection, submitting: bool, l10n: &dyn Localizer) -> CheckoutView {
    let offer = selection.offer();
    let unit_name = if offer.unit_group_name.is_empty() {
        l10n.translate("booking.apartment", &[])
    } else {
        offer.unit_group_name.clone()
    };

    CheckoutView {
        offer_title: format!("{} \u{b7} {}", unit_name, offer.rate_plan_name),
        total: selection.original_total().display(),
        discounted_total: selection.promo.as_ref().map(|_| selection.total().display()),
        promo_message: selection.promo_notice.as_ref().map(|n| n.render(l10n)),
        promo_applied: selection.promo.is_some(),
        status: selection.status.as_ref().map(|n| n.render(l10n)),
        submit_label: if submitting {
            l10n.translate("booking.processing", &[])
        } else {
            l10n.translate("booking.confirm_reservation", &[])
        },
        submit_enabled: !submitting,
    }
}

fn free_confirmed_view(confirmation: &Confirmation, l10n: &dyn Localizer) -> FreeConfirmedView {
    FreeConfirmedView {
        heading: l10n.translate(
            "booking.free_confirmed_id",
            &[("id", confirmation.confirmation_id.as_str())],
        ),
        badge: l10n.translate("booking.no_payment_required", &[]),
        note: l10n.translate("booking.free_confirmed_note", &[]),
        email_note: l10n.translate(
            "booking.confirmation_email_note",
            &[("email", confirmation.booker.email.as_str())],
        ),
    }
}

fn payment_view(confirmation: &Confirmation, payment_link: &str, l10n: &dyn Localizer) -> PaymentView {
    PaymentView {
        heading: l10n.translate(
            "booking.payment_confirmed_id",
            &[("id", confirmation.confirmation_id.as_str())],
        ),
        badge: l10n.translate("booking.payment_pending", &[]),
        instruction: l10n.translate("booking.payment_instruction", &[]),
        amount_due: confirmation.amount_due.display(),
        pay_label: l10n.translate("booking.pay_now", &[]),
        payment_link: payment_link.to_string(),
        secure_note: l10n.translate("booking.payment_secure_note", &[]),
        email_note: l10n.translate(
            "booking.payment_email_note",
            &[("email", confirmation.booker.email.as_str())],
        ),
    }
}
