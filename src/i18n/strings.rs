//! Built-in English strings for the booking flow and chat.
//!
//! These are the texts the widgets fall back to when no dictionary has been
//! loaded at all, so the booking flow stays usable in English on its own.
//! Templates use the same `{name}` placeholders as the JSON dictionaries.

use crate::i18n::dictionary::substitute;
use crate::i18n::Localizer;

pub const ENGLISH_STRINGS: &[(&str, &str)] = &[
    // ==================== Offers ====================
    ("booking.apartment", "Apartment"),
    ("booking.available", "{n} available"),
    ("booking.only_left", "Only {n} left!"),
    ("booking.best_price_label", "Best Price — Non-Refundable"),
    ("booking.flexible_label", "Flexible — Refundable"),
    ("booking.best_price_tag", "Best Price"),
    ("booking.best_rate_guaranteed", "Best rate guaranteed"),
    ("booking.free_cancellation", "Free cancellation"),
    ("booking.select", "Select"),
    ("booking.total", "total"),
    ("booking.per_night", "/ night"),
    ("booking.night", "night"),
    ("booking.nights", "nights"),
    ("booking.guest_singular", "guest"),
    ("booking.guests_plural", "guests"),
    (
        "booking.no_offers",
        "No availability found for the selected dates. Please try different dates or another location.",
    ),
    // ==================== Errors ====================
    ("booking.unable_to_check", "Unable to check availability right now."),
    (
        "booking.server_waking",
        "Our booking server is waking up (this takes ~30 seconds on first load). Please click \"Check Prices\" again in a moment.",
    ),
    (
        "booking.error_help",
        "Please try again or contact us at info@amanthosliving.com",
    ),
    ("booking.try_again", "Try Again"),
    (
        "booking.error_booking_failed",
        "Booking failed. Please try again or contact us at info@amanthosliving.com.",
    ),
    (
        "booking.error_connection",
        "Connection error. Please try again or contact us at info@amanthosliving.com.",
    ),
    // ==================== Validation ====================
    ("booking.validation_select_location", "Please select a location."),
    ("booking.validation_select_checkin", "Please select a check-in date."),
    ("booking.validation_select_checkout", "Please select a check-out date."),
    ("booking.validation_checkout_after", "Check-out must be after check-in."),
    ("booking.validation_guests", "Please select the number of guests."),
    ("booking.validation_required", "This field is required."),
    (
        "booking.validation_fill_required",
        "Please fill in all required fields (First Name, Last Name, Email).",
    ),
    ("booking.validation_valid_email", "Please enter a valid email address."),
    // ==================== Promo codes ====================
    ("booking.promo_enter", "Please enter a promo code."),
    ("booking.promo_applied", "Promo code applied! -{label}"),
    ("booking.promo_invalid", "Invalid promo code."),
    // ==================== Submission & payment ====================
    ("booking.processing", "Processing..."),
    ("booking.confirm_reservation", "Confirm Reservation"),
    ("booking.free_confirmed_id", "Booking Confirmed — Reference: {id}"),
    ("booking.no_payment_required", "NO PAYMENT REQUIRED"),
    (
        "booking.free_confirmed_note",
        "Your promo code covers the full amount. Your reservation is confirmed!",
    ),
    (
        "booking.confirmation_email_note",
        "A confirmation email will be sent to {email}.",
    ),
    ("booking.payment_confirmed_id", "Reservation created — Reference: {id}"),
    ("booking.payment_pending", "PAYMENT REQUIRED"),
    (
        "booking.payment_instruction",
        "Payment is required to confirm your reservation. Without payment, your booking will be automatically cancelled.",
    ),
    ("booking.pay_now", "Pay Now — Secure Payment"),
    (
        "booking.payment_email_note",
        "A confirmation email will be sent to {email} after payment.",
    ),
    (
        "booking.payment_secure_note",
        "You will be redirected to a secure payment page powered by Adyen.",
    ),
    (
        "booking.payment_link_expired",
        "Payment link could not be generated. Please retry.",
    ),
    ("booking.retry_payment", "Retry Payment Link"),
    // ==================== Chat ====================
    ("chat.error_generic", "Sorry, I encountered an issue. Please try again."),
    ("chat.error_connection", "Connection error. Please try again in a moment."),
    (
        "chat.error_waking",
        "I'm waking up — please try again in about 30 seconds. Our server may need a moment to start.",
    ),
];

pub fn english(key: &str) -> Option<&'static str> {
    ENGLISH_STRINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Localizer over the built-in English table; unknown keys come back verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEnglish;

impl Localizer for BuiltinEnglish {
    fn translate(&self, key: &str, substitutions: &[(&str, &str)]) -> String {
        match english(key) {
            Some(template) => substitute(template, substitutions),
            None => key.to_string(),
        }
    }
}
