use crate::error::{Field, FieldError};
use crate::models::{Booker, SearchQuery};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Raw values of the search bar, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub location: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: String,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            location: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            guests: "2".to_string(),
        }
    }
}

impl SearchForm {
    pub fn new(location: &str, check_in: &str, check_out: &str, guests: &str) -> Self {
        Self {
            location: location.to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            guests: guests.to_string(),
        }
    }
}

/// Raw values of the guest details form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl GuestForm {
    pub fn new(first_name: &str, last_name: &str, email: &str, phone: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Check the search form in field order and freeze it into a query.
/// The first failing field wins.
pub fn validate_search(form: &SearchForm) -> Result<SearchQuery, FieldError> {
    let location = form.location.trim();
    if location.is_empty() {
        return Err(FieldError::new(
            Field::Location,
            "booking.validation_select_location",
        ));
    }

    let arrival = parse_date(&form.check_in).ok_or(FieldError::new(
        Field::CheckIn,
        "booking.validation_select_checkin",
    ))?;

    let departure = parse_date(&form.check_out).ok_or(FieldError::new(
        Field::CheckOut,
        "booking.validation_select_checkout",
    ))?;

    if departure <= arrival {
        return Err(FieldError::new(
            Field::CheckOut,
            "booking.validation_checkout_after",
        ));
    }

    let adults = form
        .guests
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(FieldError::new(Field::Guests, "booking.validation_guests"))?;

    Ok(SearchQuery {
        property_id: location.to_string(),
        arrival,
        departure,
        adults,
    })
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// `local@domain.tld`, no whitespace, exactly one `@` before the domain.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"))
        .is_match(email)
}

/// Check the guest form before submission. Missing required fields are
/// reported together under one message, attributed to the first empty field.
pub fn validate_guest(form: &GuestForm) -> Result<Booker, FieldError> {
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    let email = form.email.trim();

    let missing = [
        (Field::FirstName, first_name),
        (Field::LastName, last_name),
        (Field::Email, email),
    ]
    .into_iter()
    .find(|(_, value)| value.is_empty());

    if let Some((field, _)) = missing {
        return Err(FieldError::new(field, "booking.validation_fill_required"));
    }

    if !is_valid_email(email) {
        return Err(FieldError::new(Field::Email, "booking.validation_valid_email"));
    }

    Ok(Booker {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: form.phone.trim().to_string(),
    })
}

/// Per-field check run when a guest field loses focus.
pub fn validate_guest_field(field: Field, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::new(field, "booking.validation_required"));
    }
    if field == Field::Email && !is_valid_email(value) {
        return Err(FieldError::new(field, "booking.validation_valid_email"));
    }
    Ok(())
}
