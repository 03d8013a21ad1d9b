//! Booking Flow Controller: search, offer selection, promo codes, guest
//! details and payment, as a rendering-agnostic state machine.
//!
//! - `validation`: search and guest form checks
//! - `promo`: static promo code table and discount arithmetic
//! - `state`: `BookingState` and the data each state carries
//! - `controller`: `BookingFlow`, the transitions
//! - `view`: view models built from state and a `Localizer`
//! - `notice`: user-facing messages kept as keys until rendered

mod controller;
mod notice;
mod promo;
mod state;
mod validation;
mod view;

pub use controller::{BookingFlow, BookingTicket, PaymentTicket, SearchTicket};
pub use notice::Notice;
pub use promo::{discounted_total, AppliedPromo, PromoCode, PromoOutcome, PromoTable};
pub use state::{partition_offers, BookingState, Confirmation, OfferSet, SearchFailure, Selection};
pub use validation::{
    is_valid_email, validate_guest, validate_guest_field, validate_search, GuestForm, SearchForm,
};
pub use view::{
    checkout_view, offer_card, offers_view, render, CheckoutView, ErrorView, FieldMessage,
    FlowView, FreeConfirmedView, OfferCard, OfferGroup, OffersView, PaymentRetryView, PaymentView,
    WidgetView,
};
