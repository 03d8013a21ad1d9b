//! Booking funnel events.
//!
//! Events are emitted as `tracing` events under the `funnel` target so a
//! subscriber can route them to whatever analytics sink is configured.

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum FunnelEvent<'a> {
    SearchAvailability {
        property_id: &'a str,
        nights: i64,
        adults: u32,
    },
    ViewOffers {
        property_id: &'a str,
        count: usize,
    },
    SelectOffer {
        rate_plan_id: &'a str,
        category: &'a str,
        value: f64,
        currency: &'a str,
    },
    BeginCheckout {
        value: f64,
        currency: &'a str,
    },
    PromoApplied {
        code: &'a str,
        discount: f64,
    },
    SubmitBooking {
        value: f64,
        currency: &'a str,
        promo: Option<&'a str>,
    },
    BookingConfirmed {
        confirmation_id: &'a str,
        value: f64,
        currency: &'a str,
        payment_required: bool,
    },
    PaymentInitiated {
        confirmation_id: &'a str,
        value: f64,
        currency: &'a str,
    },
    BookingError {
        step: &'a str,
        message: &'a str,
    },
}

impl FunnelEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            FunnelEvent::SearchAvailability { .. } => "search_availability",
            FunnelEvent::ViewOffers { .. } => "view_offers",
            FunnelEvent::SelectOffer { .. } => "select_offer",
            FunnelEvent::BeginCheckout { .. } => "begin_checkout",
            FunnelEvent::PromoApplied { .. } => "promo_applied",
            FunnelEvent::SubmitBooking { .. } => "submit_booking",
            FunnelEvent::BookingConfirmed { .. } => "booking_confirmed",
            FunnelEvent::PaymentInitiated { .. } => "payment_initiated",
            FunnelEvent::BookingError { .. } => "booking_error",
        }
    }
}

pub fn track(event: &FunnelEvent<'_>) {
    let name = event.name();
    match event {
        FunnelEvent::SearchAvailability {
            property_id,
            nights,
            adults,
        } => info!(target: "funnel", event = name, property_id, nights, adults),
        FunnelEvent::ViewOffers { property_id, count } => {
            info!(target: "funnel", event = name, property_id, count)
        }
        FunnelEvent::SelectOffer {
            rate_plan_id,
            category,
            value,
            currency,
        } => info!(target: "funnel", event = name, rate_plan_id, category, value, currency),
        FunnelEvent::BeginCheckout { value, currency } => {
            info!(target: "funnel", event = name, value, currency)
        }
        FunnelEvent::PromoApplied { code, discount } => {
            info!(target: "funnel", event = name, code, discount)
        }
        FunnelEvent::SubmitBooking {
            value,
            currency,
            promo,
        } => info!(target: "funnel", event = name, value, currency, promo = promo.unwrap_or("")),
        FunnelEvent::BookingConfirmed {
            confirmation_id,
            value,
            currency,
            payment_required,
        } => info!(
            target: "funnel",
            event = name,
            confirmation_id,
            value,
            currency,
            payment_required
        ),
        FunnelEvent::PaymentInitiated {
            confirmation_id,
            value,
            currency,
        } => info!(target: "funnel", event = name, confirmation_id, value, currency),
        FunnelEvent::BookingError { step, message } => {
            info!(target: "funnel", event = name, step, message)
        }
    }
}
