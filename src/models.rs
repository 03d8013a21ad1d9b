use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Properties ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub id: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
}

pub const PROPERTIES: &[Property] = &[
    Property {
        id: "GBAL",
        name: "Zurich Airport",
        short_name: "Zurich",
    },
    Property {
        id: "GNBE",
        name: "Solothurn / Grenchen",
        short_name: "Solothurn",
    },
    Property {
        id: "NYAL",
        name: "Nyon / Duillier",
        short_name: "Nyon",
    },
];

pub fn find_property(id: &str) -> Option<&'static Property> {
    PROPERTIES.iter().find(|p| p.id == id)
}

/// Display name for a property id, falling back to the id itself.
pub fn property_name(id: &str) -> &str {
    find_property(id).map(|p| p.name).unwrap_or(id)
}

// ==================== Search ====================

/// Frozen snapshot of a submitted search form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub property_id: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub adults: u32,
}

impl SearchQuery {
    pub fn nights(&self) -> i64 {
        (self.departure - self.arrival).num_days()
    }

    /// Query string pairs for `GET /api/offers`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("propertyId", self.property_id.clone()),
            ("arrival", self.arrival.format("%Y-%m-%d").to_string()),
            ("departure", self.departure.format("%Y-%m-%d").to_string()),
            ("adults", self.adults.to_string()),
        ]
    }
}

// ==================== Offers ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

pub const DEFAULT_CURRENCY: &str = "CHF";

impl Money {
    pub fn new(amount: f64, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }

    /// `CHF 123.40`
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency, self.amount)
    }
}

/// Round to the currency's minor unit (two decimals).
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateCategory {
    Refundable,
    #[serde(rename = "Non-Refundable")]
    NonRefundable,
    #[serde(other)]
    Other,
}

impl RateCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RateCategory::Refundable => "Refundable",
            RateCategory::NonRefundable => "Non-Refundable",
            RateCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub rate_plan_id: String,
    #[serde(default)]
    pub rate_plan_name: String,
    pub category: RateCategory,
    #[serde(default)]
    pub unit_group_name: String,
    #[serde(default)]
    pub total_gross_amount: Option<Money>,
    #[serde(default)]
    pub average_per_night: Option<Money>,
    #[serde(default, alias = "availableUnitCount")]
    pub available_units: u32,
}

impl Offer {
    pub fn currency(&self) -> &str {
        self.total_gross_amount
            .as_ref()
            .map(|m| m.currency.as_str())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn total_amount(&self) -> f64 {
        self.total_gross_amount
            .as_ref()
            .map(|m| m.amount)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersResponse {
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub nights: Option<i64>,
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub arrival: String,
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub adults: Option<u32>,
}

// ==================== Bookings ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booker {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub property_id: String,
    pub rate_plan_id: String,
    pub arrival: String,
    pub departure: String,
    pub adults: u32,
    pub total_amount: f64,
    pub currency: String,
    pub booker: Booker,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub confirmation_id: Option<String>,
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub payment_required: Option<bool>,
    #[serde(default)]
    pub payment_link: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkRequest {
    pub booking_id: String,
    pub reservation_id: String,
    pub property_id: String,
    pub email: String,
    pub total_amount: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkResponse {
    #[serde(default)]
    pub payment_link: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ==================== Chat ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
