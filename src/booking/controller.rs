use crate::analytics::{track, FunnelEvent};
use crate::api::BookingApi;
use crate::booking::notice::Notice;
use crate::booking::promo::{AppliedPromo, PromoOutcome, PromoTable};
use crate::booking::state::{BookingState, Confirmation, OfferSet, SearchFailure, Selection};
use crate::booking::validation::{validate_guest, validate_search, GuestForm, SearchForm};
use crate::booking::view::{render, WidgetView};
use crate::error::{ApiError, FieldError, FlowError};
use crate::i18n::Localizer;
use crate::models::{
    Booker, BookingRequest, BookingResult, Money, OffersResponse, PaymentLinkRequest,
    PaymentLinkResponse, SearchQuery,
};
use std::mem;
use tracing::{debug, info, warn};

/// An offers request started by `begin_offers_fetch`.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    generation: u64,
    query: SearchQuery,
}

impl SearchTicket {
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

/// A booking submission started by `begin_booking`.
#[derive(Debug, Clone)]
pub struct BookingTicket {
    generation: u64,
    request: BookingRequest,
}

impl BookingTicket {
    pub fn request(&self) -> &BookingRequest {
        &self.request
    }
}

/// A payment-link request started by `begin_payment_retry`.
#[derive(Debug, Clone)]
pub struct PaymentTicket {
    generation: u64,
    request: PaymentLinkRequest,
}

impl PaymentTicket {
    pub fn request(&self) -> &PaymentLinkRequest {
        &self.request
    }
}

/// The booking widget's state machine.
///
/// Every request is split into `begin_*`, which validates, moves the flow
/// into its busy state and hands out a ticket, and `finish_*`, which applies
/// the outcome. A ticket is only honoured while its generation is current:
/// `reset()` and every new request bump the generation, so a late response
/// for an abandoned request is dropped instead of overwriting newer state.
///
/// `search`, `confirm_booking` and `retry_payment` run both halves against
/// the flow's own `BookingApi`.
pub struct BookingFlow<A> {
    api: A,
    promos: PromoTable,
    origin: String,
    state: BookingState,
    generation: u64,
    field_error: Option<FieldError>,
}

impl<A: BookingApi> BookingFlow<A> {
    pub fn new(api: A, origin: &str) -> Self {
        Self {
            api,
            promos: PromoTable::builtin(),
            origin: origin.to_string(),
            state: BookingState::Idle,
            generation: 0,
            field_error: None,
        }
    }

    pub fn with_promos(mut self, promos: PromoTable) -> Self {
        self.promos = promos;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    /// The last search validation failure, cleared by the next valid search.
    pub fn field_error(&self) -> Option<&FieldError> {
        self.field_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self, l10n: &dyn Localizer) -> WidgetView {
        render(&self.state, self.field_error.as_ref(), l10n)
    }

    /// Abandon whatever is in progress and return to `Idle`.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = BookingState::Idle;
        self.field_error = None;
    }

    fn invalid(&self, operation: &'static str) -> FlowError {
        if self.state.is_busy() {
            FlowError::Busy
        } else {
            FlowError::InvalidState {
                operation,
                state: self.state.name(),
            }
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Discarding response for generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        true
    }

    // ==================== Search ====================

    /// Validate the search form and freeze it into a query. On failure the
    /// state is left as it was and the field error is recorded.
    pub fn submit_search(&mut self, form: &SearchForm) -> Result<(), FlowError> {
        if self.state.is_busy() {
            return Err(FlowError::Busy);
        }
        match validate_search(form) {
            Ok(query) => {
                self.set_search(query);
                Ok(())
            }
            Err(err) => {
                debug!("Search rejected: {}", err);
                self.field_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    /// Start a search from an already-validated query, as other widgets do
    /// when they hand over a location and dates. Ignored while busy.
    pub fn set_search(&mut self, query: SearchQuery) -> bool {
        if self.state.is_busy() {
            return false;
        }
        track(&FunnelEvent::SearchAvailability {
            property_id: &query.property_id,
            nights: query.nights(),
            adults: query.adults,
        });
        self.field_error = None;
        self.state = BookingState::SearchSubmitted(query);
        true
    }

    /// Re-enter the search from the top after a failed fetch.
    pub fn resubmit_search(&mut self) -> Result<(), FlowError> {
        match &self.state {
            BookingState::Error { query, .. } => {
                let query = query.clone();
                self.state = BookingState::SearchSubmitted(query);
                Ok(())
            }
            _ => Err(self.invalid("resubmit_search")),
        }
    }

    pub fn begin_offers_fetch(&mut self) -> Result<SearchTicket, FlowError> {
        let query = match &self.state {
            BookingState::SearchSubmitted(query) => query.clone(),
            _ => return Err(self.invalid("begin_offers_fetch")),
        };
        self.state = BookingState::OffersLoading(query.clone());
        Ok(SearchTicket {
            generation: self.next_generation(),
            query,
        })
    }

    /// Apply an offers response. Returns `false` when the ticket is stale.
    pub fn finish_offers_fetch(
        &mut self,
        ticket: SearchTicket,
        result: Result<OffersResponse, ApiError>,
    ) -> bool {
        if !self.is_current(ticket.generation)
            || !matches!(self.state, BookingState::OffersLoading(_))
        {
            return false;
        }

        let query = ticket.query;
        self.state = match result {
            Ok(response) => {
                let offers = OfferSet::new(query, response);
                info!(
                    "Found {} offers for {} ({} nights)",
                    offers.len(),
                    offers.query.property_id,
                    offers.nights
                );
                track(&FunnelEvent::ViewOffers {
                    property_id: &offers.query.property_id,
                    count: offers.len(),
                });
                BookingState::OffersShown(offers)
            }
            Err(err) => {
                warn!("Failed to fetch offers: {}", err);
                let message = err.to_string();
                track(&FunnelEvent::BookingError {
                    step: "fetch_offers",
                    message: &message,
                });
                let failure = if err.is_cold_start() {
                    SearchFailure::ColdStart
                } else {
                    SearchFailure::Unavailable(message)
                };
                BookingState::Error { query, failure }
            }
        };
        true
    }

    /// Fetch offers for the submitted query.
    pub async fn fetch_offers(&mut self) -> Result<(), FlowError> {
        let ticket = self.begin_offers_fetch()?;
        let result = self.api.search_offers(&ticket.query).await;
        self.finish_offers_fetch(ticket, result);
        Ok(())
    }

    pub async fn search(&mut self, form: &SearchForm) -> Result<(), FlowError> {
        self.submit_search(form)?;
        self.fetch_offers().await
    }

    /// "Try again" after a failed fetch.
    pub async fn retry_search(&mut self) -> Result<(), FlowError> {
        self.resubmit_search()?;
        self.fetch_offers().await
    }

    // ==================== Selection ====================

    /// Choose an offer by its position in display order. Any applied promo
    /// is cleared.
    pub fn select_offer(&mut self, index: usize) -> Result<(), FlowError> {
        let offers = match &self.state {
            BookingState::OffersShown(offers) => offers.clone(),
            BookingState::OfferSelected(selection) => selection.offers.clone(),
            _ => return Err(self.invalid("select_offer")),
        };
        if index >= offers.len() {
            return Err(FlowError::NoSuchOffer(index));
        }

        let selection = Selection::new(offers, index);
        let offer = selection.offer();
        let total = selection.total();
        debug!("Selected offer {} ({})", offer.rate_plan_id, offer.category.label());
        track(&FunnelEvent::SelectOffer {
            rate_plan_id: &offer.rate_plan_id,
            category: offer.category.label(),
            value: total.amount,
            currency: &total.currency,
        });
        track(&FunnelEvent::BeginCheckout {
            value: total.amount,
            currency: &total.currency,
        });
        self.state = BookingState::OfferSelected(selection);
        Ok(())
    }

    /// Close the guest form and go back to the offer list.
    pub fn cancel_selection(&mut self) -> Result<(), FlowError> {
        match mem::replace(&mut self.state, BookingState::Idle) {
            BookingState::OfferSelected(selection) => {
                self.state = BookingState::OffersShown(selection.offers);
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("cancel_selection"))
            }
        }
    }

    pub fn apply_promo(&mut self, input: &str) -> Result<PromoOutcome, FlowError> {
        let selection = match &mut self.state {
            BookingState::OfferSelected(selection) => selection,
            _ => return Err(self.invalid("apply_promo")),
        };

        if input.trim().is_empty() {
            selection.promo_notice = Some(Notice::key("booking.promo_enter"));
            return Ok(PromoOutcome::Empty);
        }

        match self.promos.lookup(input) {
            Some(code) => {
                let applied = AppliedPromo::from(code);
                selection.promo = Some(applied.clone());
                selection.promo_notice =
                    Some(Notice::with("booking.promo_applied", "label", &applied.label));
                info!("Applied promo code {} ({} off)", applied.code, applied.label);
                track(&FunnelEvent::PromoApplied {
                    code: &applied.code,
                    discount: applied.discount,
                });
                Ok(PromoOutcome::Applied(applied))
            }
            None => {
                selection.promo = None;
                selection.promo_notice = Some(Notice::key("booking.promo_invalid"));
                Ok(PromoOutcome::Invalid)
            }
        }
    }

    // ==================== Booking ====================

    /// Validate guest details and build the booking request. A validation
    /// failure keeps the flow in `OfferSelected` with an inline message.
    pub fn begin_booking(&mut self, guest: &GuestForm) -> Result<BookingTicket, FlowError> {
        let selection = match &mut self.state {
            BookingState::OfferSelected(selection) => selection,
            _ => return Err(self.invalid("begin_booking")),
        };

        let booker = match validate_guest(guest) {
            Ok(booker) => booker,
            Err(err) => {
                selection.status = Some(Notice::key(err.key));
                return Err(err.into());
            }
        };
        selection.status = None;
        let request = booking_request(selection, booker, &self.origin);

        if let BookingState::OfferSelected(selection) =
            mem::replace(&mut self.state, BookingState::Idle)
        {
            self.state = BookingState::Submitting(selection);
        }

        info!(
            "Submitting booking for {} ({} {:.2})",
            request.rate_plan_id, request.currency, request.total_amount
        );
        track(&FunnelEvent::SubmitBooking {
            value: request.total_amount,
            currency: &request.currency,
            promo: promo_code(&self.state),
        });

        Ok(BookingTicket {
            generation: self.next_generation(),
            request,
        })
    }

    /// Apply the booking response. Returns `false` when the ticket is stale.
    pub fn finish_booking(
        &mut self,
        ticket: BookingTicket,
        result: Result<BookingResult, ApiError>,
    ) -> bool {
        if !self.is_current(ticket.generation) {
            return false;
        }
        let mut selection = match mem::replace(&mut self.state, BookingState::Idle) {
            BookingState::Submitting(selection) => selection,
            other => {
                self.state = other;
                return false;
            }
        };

        self.state = match result {
            Ok(result) if result.success => confirmed(ticket.request, result),
            Ok(result) => {
                warn!("Booking rejected: {:?}", result.error);
                track(&FunnelEvent::BookingError {
                    step: "create_booking",
                    message: result.error.as_deref().unwrap_or(""),
                });
                selection.status = Some(Notice::server_or(
                    result.error.as_deref(),
                    "booking.error_booking_failed",
                ));
                BookingState::OfferSelected(selection)
            }
            Err(err) => {
                warn!("Booking request failed: {}", err);
                track(&FunnelEvent::BookingError {
                    step: "create_booking",
                    message: &err.to_string(),
                });
                selection.status = Some(Notice::key("booking.error_connection"));
                BookingState::OfferSelected(selection)
            }
        };
        true
    }

    pub async fn confirm_booking(&mut self, guest: &GuestForm) -> Result<(), FlowError> {
        let ticket = self.begin_booking(guest)?;
        let result = self.api.create_booking(&ticket.request).await;
        self.finish_booking(ticket, result);
        Ok(())
    }

    // ==================== Payment retry ====================

    pub fn begin_payment_retry(&mut self) -> Result<PaymentTicket, FlowError> {
        let request = match &mut self.state {
            BookingState::PaymentRetryable {
                confirmation,
                retrying,
                error,
            } if !*retrying => {
                *retrying = true;
                *error = None;
                payment_link_request(confirmation)
            }
            _ => return Err(self.invalid("begin_payment_retry")),
        };
        debug!("Requesting a new payment link for {}", request.booking_id);
        Ok(PaymentTicket {
            generation: self.next_generation(),
            request,
        })
    }

    /// Apply a payment-link response. Returns `false` when the ticket is stale.
    pub fn finish_payment_retry(
        &mut self,
        ticket: PaymentTicket,
        result: Result<PaymentLinkResponse, ApiError>,
    ) -> bool {
        if !self.is_current(ticket.generation) {
            return false;
        }
        let confirmation = match mem::replace(&mut self.state, BookingState::Idle) {
            BookingState::PaymentRetryable {
                confirmation,
                retrying: true,
                ..
            } => confirmation,
            other => {
                self.state = other;
                return false;
            }
        };

        self.state = match result {
            Ok(PaymentLinkResponse {
                payment_link: Some(link),
                ..
            }) if !link.is_empty() => payment_pending(confirmation, link),
            Ok(response) => {
                warn!("Payment link retry failed: {:?}", response.error);
                BookingState::PaymentRetryable {
                    confirmation,
                    retrying: false,
                    error: Some(Notice::server_or(
                        response.error.as_deref(),
                        "booking.payment_link_expired",
                    )),
                }
            }
            Err(err) => {
                warn!("Payment link request failed: {}", err);
                BookingState::PaymentRetryable {
                    confirmation,
                    retrying: false,
                    error: Some(Notice::key("booking.error_connection")),
                }
            }
        };
        true
    }

    pub async fn retry_payment(&mut self) -> Result<(), FlowError> {
        let ticket = self.begin_payment_retry()?;
        let result = self.api.request_payment_link(&ticket.request).await;
        self.finish_payment_retry(ticket, result);
        Ok(())
    }
}

fn promo_code(state: &BookingState) -> Option<&str> {
    match state {
        BookingState::Submitting(selection) => selection.promo.as_ref().map(|p| p.code.as_str()),
        _ => None,
    }
}

fn booking_request(selection: &Selection, booker: Booker, origin: &str) -> BookingRequest {
    let query = selection.query();
    let total = selection.total();

    let mut comment = format!("Booked via {}", origin);
    if let Some(promo) = &selection.promo {
        comment.push_str(&format!(" | Promo: {} ({} off)", promo.code, promo.label));
    }

    BookingRequest {
        property_id: query.property_id.clone(),
        rate_plan_id: selection.offer().rate_plan_id.clone(),
        arrival: query.arrival.format("%Y-%m-%d").to_string(),
        departure: query.departure.format("%Y-%m-%d").to_string(),
        adults: query.adults,
        total_amount: total.amount,
        currency: total.currency,
        booker,
        comment,
    }
}

fn confirmed(request: BookingRequest, result: BookingResult) -> BookingState {
    let confirmation = Confirmation {
        confirmation_id: result.confirmation_id.unwrap_or_default(),
        reservation_id: result.reservation_id.unwrap_or_default(),
        property_id: result
            .property_id
            .filter(|id| !id.is_empty())
            .unwrap_or(request.property_id),
        booker: request.booker,
        amount_due: Money::new(request.total_amount, &request.currency),
    };
    let payment_required = result.payment_required != Some(false);

    info!("Booking confirmed: {}", confirmation.confirmation_id);
    track(&FunnelEvent::BookingConfirmed {
        confirmation_id: &confirmation.confirmation_id,
        value: confirmation.amount_due.amount,
        currency: &confirmation.amount_due.currency,
        payment_required,
    });

    if !payment_required {
        return BookingState::FreeConfirmed(confirmation);
    }
    match result.payment_link.filter(|link| !link.is_empty()) {
        Some(link) => payment_pending(confirmation, link),
        None => {
            warn!(
                "Booking {} created without a payment link",
                confirmation.confirmation_id
            );
            BookingState::PaymentRetryable {
                confirmation,
                retrying: false,
                error: None,
            }
        }
    }
}

fn payment_pending(confirmation: Confirmation, payment_link: String) -> BookingState {
    track(&FunnelEvent::PaymentInitiated {
        confirmation_id: &confirmation.confirmation_id,
        value: confirmation.amount_due.amount,
        currency: &confirmation.amount_due.currency,
    });
    BookingState::PaymentPending {
        confirmation,
        payment_link,
    }
}

fn payment_link_request(confirmation: &Confirmation) -> PaymentLinkRequest {
    PaymentLinkRequest {
        booking_id: confirmation.confirmation_id.clone(),
        reservation_id: confirmation.reservation_id.clone(),
        property_id: confirmation.property_id.clone(),
        email: confirmation.booker.email.clone(),
        total_amount: confirmation.amount_due.amount,
        currency: confirmation.amount_due.currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::promo::PromoCode;
    use crate::error::Field;
    use crate::models::{Offer, RateCategory};
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        offers: Mutex<VecDeque<Result<OffersResponse, ApiError>>>,
        bookings: Mutex<VecDeque<Result<BookingResult, ApiError>>>,
        links: Mutex<VecDeque<Result<PaymentLinkResponse, ApiError>>>,
        queries: Mutex<Vec<SearchQuery>>,
        booking_requests: Mutex<Vec<BookingRequest>>,
        link_requests: Mutex<Vec<PaymentLinkRequest>>,
    }

    impl FakeApi {
        fn with_offers(offers: Vec<Offer>) -> Self {
            let api = Self::default();
            api.push_offers(Ok(OffersResponse {
                offers,
                nights: Some(4),
                property: "GBAL".to_string(),
                property_name: None,
                arrival: "2025-06-01".to_string(),
                departure: "2025-06-05".to_string(),
                adults: Some(2),
            }));
            api
        }

        fn push_offers(&self, result: Result<OffersResponse, ApiError>) {
            self.offers.lock().unwrap().push_back(result);
        }

        fn push_booking(&self, result: Result<BookingResult, ApiError>) {
            self.bookings.lock().unwrap().push_back(result);
        }

        fn push_link(&self, result: Result<PaymentLinkResponse, ApiError>) {
            self.links.lock().unwrap().push_back(result);
        }
    }

    fn exhausted() -> ApiError {
        ApiError::Decode("no scripted response".to_string())
    }

    impl BookingApi for FakeApi {
        async fn health(&self) -> Result<(), ApiError> {
            Ok(())
        }

        async fn search_offers(&self, query: &SearchQuery) -> Result<OffersResponse, ApiError> {
            self.queries.lock().unwrap().push(query.clone());
            self.offers.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }

        async fn create_booking(&self, request: &BookingRequest) -> Result<BookingResult, ApiError> {
            self.booking_requests.lock().unwrap().push(request.clone());
            self.bookings.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }

        async fn request_payment_link(
            &self,
            request: &PaymentLinkRequest,
        ) -> Result<PaymentLinkResponse, ApiError> {
            self.link_requests.lock().unwrap().push(request.clone());
            self.links.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
        }
    }

    fn offer(id: &str, category: RateCategory, total: f64) -> Offer {
        Offer {
            rate_plan_id: id.to_string(),
            rate_plan_name: format!("{} rate", id),
            category,
            unit_group_name: "Studio".to_string(),
            total_gross_amount: Some(Money::new(total, "CHF")),
            average_per_night: Some(Money::new(total / 4.0, "CHF")),
            available_units: 3,
        }
    }

    fn two_offers() -> Vec<Offer> {
        vec![
            offer("FLEX", RateCategory::Refundable, 480.0),
            offer("SAVER", RateCategory::NonRefundable, 400.0),
        ]
    }

    fn search_form() -> SearchForm {
        SearchForm::new("GBAL", "2025-06-01", "2025-06-05", "2")
    }

    fn guest() -> GuestForm {
        GuestForm::new("Anna", "Muster", "anna@example.ch", "+41 79 000 00 00")
    }

    async fn selected_flow(api: FakeApi) -> BookingFlow<FakeApi> {
        let mut flow = BookingFlow::new(api, "amanthosliving.com").with_promos(PromoTable::new(vec![
            PromoCode::new("SUMMER10", 0.10, "10%"),
            PromoCode::new("FREE100", 1.0, "100%"),
        ]));
        flow.search(&search_form()).await.unwrap();
        flow.select_offer(0).unwrap();
        flow
    }

    fn selection(flow: &BookingFlow<FakeApi>) -> &Selection {
        match flow.state() {
            BookingState::OfferSelected(selection) | BookingState::Submitting(selection) => selection,
            other => panic!("unexpected state {}", other.name()),
        }
    }

    // ==================== Search ====================

    #[tokio::test]
    async fn test_search_shows_best_price_first() {
        let mut flow = BookingFlow::new(FakeApi::with_offers(two_offers()), "test");
        flow.search(&search_form()).await.unwrap();

        let BookingState::OffersShown(offers) = flow.state() else {
            panic!("expected offers, got {}", flow.state().name());
        };
        let ids: Vec<_> = offers.offers.iter().map(|o| o.rate_plan_id.as_str()).collect();
        assert_eq!(ids, vec!["SAVER", "FLEX"]);
        assert_eq!(offers.best_price_count(), 1);
        assert_eq!(flow.api().queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_search_issues_no_request() {
        let mut flow = BookingFlow::new(FakeApi::default(), "test");
        let form = SearchForm::new("GBAL", "2025-06-05", "2025-06-05", "2");

        let err = flow.search(&form).await.unwrap_err();

        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(flow.state(), &BookingState::Idle);
        assert_eq!(flow.field_error().map(|e| e.field), Some(Field::CheckOut));
        assert!(flow.api().queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_offer_list_is_not_an_error() {
        let mut flow = BookingFlow::new(FakeApi::with_offers(vec![]), "test");
        flow.search(&search_form()).await.unwrap();
        assert!(matches!(flow.state(), BookingState::OffersShown(o) if o.is_empty()));
    }

    #[tokio::test]
    async fn test_server_error_then_retry() {
        let api = FakeApi::default();
        api.push_offers(Err(ApiError::Status {
            status: 502,
            message: "Could not retrieve offers".to_string(),
        }));
        let mut flow = BookingFlow::new(api, "test");
        flow.search(&search_form()).await.unwrap();

        match flow.state() {
            BookingState::Error { failure, query } => {
                assert_eq!(failure, &SearchFailure::Unavailable("Could not retrieve offers".to_string()));
                assert_eq!(query.property_id, "GBAL");
            }
            other => panic!("expected error, got {}", other.name()),
        }

        flow.api().push_offers(Ok(serde_json::from_str(r#"{"offers": []}"#).unwrap()));
        flow.retry_search().await.unwrap();
        assert!(matches!(flow.state(), BookingState::OffersShown(_)));
        assert_eq!(flow.api().queries.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_search_while_loading_is_busy() {
        let mut flow = BookingFlow::new(FakeApi::default(), "test");
        flow.submit_search(&search_form()).unwrap();
        let _ticket = flow.begin_offers_fetch().unwrap();

        assert_eq!(flow.submit_search(&search_form()), Err(FlowError::Busy));
        assert_eq!(flow.begin_offers_fetch().unwrap_err(), FlowError::Busy);
    }

    #[test]
    fn test_reset_discards_late_offers() {
        let mut flow = BookingFlow::new(FakeApi::default(), "test");
        flow.submit_search(&search_form()).unwrap();
        let ticket = flow.begin_offers_fetch().unwrap();

        flow.reset();
        let applied = flow.finish_offers_fetch(ticket, Ok(serde_json::from_str(r#"{"offers": []}"#).unwrap()));

        assert!(!applied);
        assert_eq!(flow.state(), &BookingState::Idle);
    }

    #[test]
    fn test_newer_search_wins_over_older_response() {
        let mut flow = BookingFlow::new(FakeApi::default(), "test");
        flow.submit_search(&search_form()).unwrap();
        let old = flow.begin_offers_fetch().unwrap();
        flow.reset();
        flow.submit_search(&SearchForm::new("NYAL", "2025-07-01", "2025-07-03", "1")).unwrap();
        let new = flow.begin_offers_fetch().unwrap();

        assert!(!flow.finish_offers_fetch(old, Err(exhausted())));
        assert!(flow.finish_offers_fetch(new, Ok(serde_json::from_str(r#"{"offers": []}"#).unwrap())));
        assert!(matches!(flow.state(), BookingState::OffersShown(o) if o.query.property_id == "NYAL"));
    }

    // ==================== Selection & promo ====================

    #[tokio::test]
    async fn test_select_uses_display_order() {
        let flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        let selection = selection(&flow);
        assert_eq!(selection.offer().rate_plan_id, "SAVER");
        assert!(selection.promo.is_none());
    }

    #[tokio::test]
    async fn test_select_out_of_range() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        assert_eq!(flow.select_offer(2), Err(FlowError::NoSuchOffer(2)));
        assert!(matches!(flow.state(), BookingState::OfferSelected(_)));
    }

    #[test]
    fn test_select_before_search_is_invalid() {
        let mut flow = BookingFlow::new(FakeApi::default(), "test");
        assert_eq!(
            flow.select_offer(0),
            Err(FlowError::InvalidState {
                operation: "select_offer",
                state: "Idle"
            })
        );
    }

    #[tokio::test]
    async fn test_promo_applies_and_reselect_clears_it() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;

        let outcome = flow.apply_promo(" summer10 ").unwrap();
        assert!(matches!(outcome, PromoOutcome::Applied(ref p) if p.label == "10%"));
        assert_eq!(selection(&flow).total(), Money::new(360.0, "CHF"));

        flow.select_offer(1).unwrap();
        let selection = selection(&flow);
        assert!(selection.promo.is_none());
        assert!(selection.promo_notice.is_none());
        assert_eq!(selection.total(), Money::new(480.0, "CHF"));
    }

    #[tokio::test]
    async fn test_invalid_promo_clears_previous() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        flow.apply_promo("SUMMER10").unwrap();

        assert_eq!(flow.apply_promo("WINTER").unwrap(), PromoOutcome::Invalid);
        assert!(selection(&flow).promo.is_none());
        assert_eq!(selection(&flow).total(), Money::new(400.0, "CHF"));
        assert_eq!(selection(&flow).promo_notice, Some(Notice::key("booking.promo_invalid")));
    }

    #[tokio::test]
    async fn test_empty_promo_changes_nothing() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        flow.apply_promo("SUMMER10").unwrap();

        assert_eq!(flow.apply_promo("   ").unwrap(), PromoOutcome::Empty);
        assert!(selection(&flow).promo.is_some());
    }

    #[tokio::test]
    async fn test_cancel_selection_returns_to_offers() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        flow.cancel_selection().unwrap();
        assert!(matches!(flow.state(), BookingState::OffersShown(o) if o.len() == 2));
        assert!(flow.cancel_selection().is_err());
    }

    // ==================== Booking ====================

    #[tokio::test]
    async fn test_invalid_guest_issues_no_request() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        let form = GuestForm::new("Anna", "Muster", "not-an-email", "");

        let err = flow.confirm_booking(&form).await.unwrap_err();

        assert!(matches!(err, FlowError::Validation(e) if e.field == Field::Email));
        assert!(flow.api().booking_requests.lock().unwrap().is_empty());
        assert_eq!(
            selection(&flow).status,
            Some(Notice::key("booking.validation_valid_email"))
        );
    }

    #[tokio::test]
    async fn test_booking_payload_carries_discounted_total_and_promo_comment() {
        let api = FakeApi::with_offers(two_offers());
        api.push_booking(Ok(BookingResult {
            success: true,
            confirmation_id: Some("C200".to_string()),
            payment_required: Some(true),
            payment_link: Some("https://pay.example/abc".to_string()),
            ..BookingResult::default()
        }));
        let mut flow = selected_flow(api).await;
        flow.apply_promo("summer10").unwrap();

        flow.confirm_booking(&guest()).await.unwrap();

        let requests = flow.api().booking_requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.property_id, "GBAL");
        assert_eq!(request.rate_plan_id, "SAVER");
        assert_eq!(request.arrival, "2025-06-01");
        assert_eq!(request.adults, 2);
        assert_eq!(request.total_amount, 360.0);
        assert_eq!(request.comment, "Booked via amanthosliving.com | Promo: SUMMER10 (10% off)");
        drop(requests);

        match flow.state() {
            BookingState::PaymentPending {
                confirmation,
                payment_link,
            } => {
                assert_eq!(confirmation.confirmation_id, "C200");
                assert_eq!(confirmation.amount_due, Money::new(360.0, "CHF"));
                assert_eq!(payment_link, "https://pay.example/abc");
            }
            other => panic!("expected payment pending, got {}", other.name()),
        }
    }

    #[tokio::test]
    async fn test_comment_without_promo() {
        let api = FakeApi::with_offers(two_offers());
        api.push_booking(Ok(BookingResult {
            success: true,
            confirmation_id: Some("C1".to_string()),
            payment_required: Some(false),
            ..BookingResult::default()
        }));
        let mut flow = selected_flow(api).await;
        flow.confirm_booking(&guest()).await.unwrap();

        assert_eq!(
            flow.api().booking_requests.lock().unwrap()[0].comment,
            "Booked via amanthosliving.com"
        );
        assert!(matches!(flow.state(), BookingState::FreeConfirmed(c) if c.confirmation_id == "C1"));
    }

    #[tokio::test]
    async fn test_rejected_booking_returns_to_selection_with_server_message() {
        let api = FakeApi::with_offers(two_offers());
        api.push_booking(Ok(BookingResult {
            success: false,
            error: Some("Rate no longer available".to_string()),
            ..BookingResult::default()
        }));
        let mut flow = selected_flow(api).await;
        flow.confirm_booking(&guest()).await.unwrap();

        assert_eq!(
            selection(&flow).status,
            Some(Notice::Server("Rate no longer available".to_string()))
        );
        assert!(matches!(flow.state(), BookingState::OfferSelected(_)));
    }

    #[tokio::test]
    async fn test_network_failure_returns_to_selection() {
        let api = FakeApi::with_offers(two_offers());
        api.push_booking(Err(ApiError::Decode("eof".to_string())));
        let mut flow = selected_flow(api).await;
        flow.apply_promo("SUMMER10").unwrap();
        flow.confirm_booking(&guest()).await.unwrap();

        let selection = selection(&flow);
        assert_eq!(selection.status, Some(Notice::key("booking.error_connection")));
        assert!(selection.promo.is_some());
    }

    #[tokio::test]
    async fn test_double_submit_is_busy() {
        let mut flow = selected_flow(FakeApi::with_offers(two_offers())).await;
        let _ticket = flow.begin_booking(&guest()).unwrap();

        assert_eq!(flow.begin_booking(&guest()).unwrap_err(), FlowError::Busy);
        assert_eq!(flow.apply_promo("SUMMER10").unwrap_err(), FlowError::Busy);
        assert_eq!(flow.select_offer(1).unwrap_err(), FlowError::Busy);
    }

    // ==================== Payment retry ====================

    async fn retryable_flow() -> BookingFlow<FakeApi> {
        let api = FakeApi::with_offers(two_offers());
        api.push_booking(Ok(BookingResult {
            success: true,
            confirmation_id: Some("C124".to_string()),
            reservation_id: Some("R-9".to_string()),
            payment_required: Some(true),
            payment_link: None,
            ..BookingResult::default()
        }));
        let mut flow = selected_flow(api).await;
        flow.confirm_booking(&guest()).await.unwrap();
        flow
    }

    #[tokio::test]
    async fn test_missing_link_is_retryable_and_retry_succeeds() {
        let mut flow = retryable_flow().await;
        assert!(matches!(
            flow.state(),
            BookingState::PaymentRetryable { retrying: false, error: None, .. }
        ));

        flow.api().push_link(Ok(PaymentLinkResponse {
            payment_link: Some("https://pay.example/retry".to_string()),
            ..PaymentLinkResponse::default()
        }));
        flow.retry_payment().await.unwrap();

        let requests = flow.api().link_requests.lock().unwrap();
        assert_eq!(requests[0].booking_id, "C124");
        assert_eq!(requests[0].reservation_id, "R-9");
        assert_eq!(requests[0].property_id, "GBAL");
        assert_eq!(requests[0].email, "anna@example.ch");
        assert_eq!(requests[0].total_amount, 400.0);
        drop(requests);
        assert!(matches!(flow.state(), BookingState::PaymentPending { payment_link, .. } if payment_link == "https://pay.example/retry"));
    }

    #[tokio::test]
    async fn test_failed_retry_stays_retryable() {
        let mut flow = retryable_flow().await;
        flow.api().push_link(Ok(PaymentLinkResponse {
            error: Some("Adyen unavailable".to_string()),
            ..PaymentLinkResponse::default()
        }));
        flow.retry_payment().await.unwrap();

        match flow.state() {
            BookingState::PaymentRetryable {
                retrying, error, ..
            } => {
                assert!(!retrying);
                assert_eq!(error, &Some(Notice::Server("Adyen unavailable".to_string())));
            }
            other => panic!("expected retryable, got {}", other.name()),
        }

        flow.api().push_link(Err(exhausted()));
        flow.retry_payment().await.unwrap();
        assert!(matches!(
            flow.state(),
            BookingState::PaymentRetryable { retrying: false, error: Some(Notice::Key { key: "booking.error_connection", .. }), .. }
        ));
    }

    #[tokio::test]
    async fn test_retry_while_retrying_is_busy() {
        let mut flow = retryable_flow().await;
        let _ticket = flow.begin_payment_retry().unwrap();
        assert_eq!(flow.begin_payment_retry().unwrap_err(), FlowError::Busy);
    }

    proptest! {
        #[test]
        fn prop_valid_search_issues_one_matching_request(
            day in 1u32..28,
            nights in 1i64..30,
            adults in 1u32..9,
            property in prop_oneof![Just("GBAL"), Just("GNBE"), Just("NYAL")],
        ) {
            let arrival = chrono::NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            let departure = arrival + chrono::Duration::days(nights);
            let form = SearchForm::new(
                property,
                &arrival.to_string(),
                &departure.to_string(),
                &adults.to_string(),
            );
            let mut flow = BookingFlow::new(FakeApi::with_offers(vec![]), "test");

            tokio_test::block_on(flow.search(&form)).unwrap();

            let queries = flow.api().queries.lock().unwrap();
            prop_assert_eq!(queries.len(), 1);
            prop_assert_eq!(&queries[0].property_id, property);
            prop_assert_eq!(queries[0].arrival, arrival);
            prop_assert_eq!(queries[0].departure, departure);
            prop_assert_eq!(queries[0].adults, adults);
        }
    }
}
