use crate::booking::notice::Notice;
use crate::booking::promo::{discounted_total, AppliedPromo};
use crate::models::{property_name, Booker, Money, Offer, OffersResponse, RateCategory, SearchQuery};

/// Order offers for display: non-refundable rates first, then refundable,
/// each group in server order. Other categories are not displayed.
pub fn partition_offers(offers: Vec<Offer>) -> Vec<Offer> {
    let (best_price, rest): (Vec<Offer>, Vec<Offer>) = offers
        .into_iter()
        .partition(|o| o.category == RateCategory::NonRefundable);
    best_price
        .into_iter()
        .chain(rest.into_iter().filter(|o| o.category == RateCategory::Refundable))
        .collect()
}

/// Offers returned for one search, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSet {
    pub query: SearchQuery,
    pub property_name: String,
    pub nights: i64,
    pub offers: Vec<Offer>,
}

impl OfferSet {
    pub fn new(query: SearchQuery, response: OffersResponse) -> Self {
        let nights = response.nights.unwrap_or_else(|| query.nights());
        let property_name = response
            .property_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| property_name(&query.property_id).to_string());
        Self {
            offers: partition_offers(response.offers),
            query,
            property_name,
            nights,
        }
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Number of offers in the leading "Best Price" group.
    pub fn best_price_count(&self) -> usize {
        self.offers
            .iter()
            .take_while(|o| o.category == RateCategory::NonRefundable)
            .count()
    }
}

/// The guest-details step: one chosen offer plus its promo sub-state.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub offers: OfferSet,
    pub index: usize,
    pub promo: Option<AppliedPromo>,
    pub promo_notice: Option<Notice>,
    /// Inline message under the submit control.
    pub status: Option<Notice>,
}

impl Selection {
    pub fn new(offers: OfferSet, index: usize) -> Self {
        Self {
            offers,
            index,
            promo: None,
            promo_notice: None,
            status: None,
        }
    }

    pub fn offer(&self) -> &Offer {
        &self.offers.offers[self.index]
    }

    pub fn query(&self) -> &SearchQuery {
        &self.offers.query
    }

    pub fn original_total(&self) -> Money {
        let offer = self.offer();
        Money::new(offer.total_amount(), offer.currency())
    }

    /// Total after the applied promo, rounded to two decimals.
    pub fn total(&self) -> Money {
        discounted_total(&self.original_total(), self.promo.as_ref())
    }
}

/// A booking the server has created.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub confirmation_id: String,
    pub reservation_id: String,
    pub property_id: String,
    pub booker: Booker,
    pub amount_due: Money,
}

/// Why an offers fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The backend could not be reached at all.
    ColdStart,
    /// The backend answered with an error or an unreadable body.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingState {
    Idle,
    SearchSubmitted(SearchQuery),
    OffersLoading(SearchQuery),
    OffersShown(OfferSet),
    OfferSelected(Selection),
    Submitting(Selection),
    FreeConfirmed(Confirmation),
    PaymentPending {
        confirmation: Confirmation,
        payment_link: String,
    },
    PaymentRetryable {
        confirmation: Confirmation,
        retrying: bool,
        error: Option<Notice>,
    },
    Error {
        query: SearchQuery,
        failure: SearchFailure,
    },
}

impl BookingState {
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::Idle => "Idle",
            BookingState::SearchSubmitted(_) => "SearchSubmitted",
            BookingState::OffersLoading(_) => "OffersLoading",
            BookingState::OffersShown(_) => "OffersShown",
            BookingState::OfferSelected(_) => "OfferSelected",
            BookingState::Submitting(_) => "Submitting",
            BookingState::FreeConfirmed(_) => "FreeConfirmed",
            BookingState::PaymentPending { .. } => "PaymentPending",
            BookingState::PaymentRetryable { .. } => "PaymentRetryable",
            BookingState::Error { .. } => "Error",
        }
    }

    /// A request started by this state is still outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            BookingState::OffersLoading(_)
                | BookingState::Submitting(_)
                | BookingState::PaymentRetryable { retrying: true, .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingState::FreeConfirmed(_)
                | BookingState::PaymentPending { .. }
                | BookingState::PaymentRetryable { .. }
        )
    }
}
