use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    BookingRequest, BookingResult, ChatRequest, ChatResponse, OffersResponse, PaymentLinkRequest,
    PaymentLinkResponse, SearchQuery,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Reservation backend operations used by the booking flow.
///
/// Each call is a single attempt; retries are always triggered by the user.
pub trait BookingApi {
    fn health(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn search_offers(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<OffersResponse, ApiError>> + Send;

    fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> impl Future<Output = Result<BookingResult, ApiError>> + Send;

    fn request_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> impl Future<Output = Result<PaymentLinkResponse, ApiError>> + Send;
}

pub trait ChatApi {
    fn send_chat(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ApiError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the reservation API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), &config.api_base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read a JSON body regardless of status. Booking and payment-link
    /// endpoints report application errors inside the body.
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = response.text().await.map_err(ApiError::unreachable)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Turn a non-success response into `ApiError::Status`, preferring the
    /// server's own `{error}` message.
    async fn status_error(response: reqwest::Response, fallback: &str) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("{} (HTTP {})", fallback, status));
        ApiError::Status { status, message }
    }
}

impl BookingApi for ApiClient {
    async fn health(&self) -> Result<(), ApiError> {
        self.client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(ApiError::unreachable)?;
        Ok(())
    }

    async fn search_offers(&self, query: &SearchQuery) -> Result<OffersResponse, ApiError> {
        debug!("Requesting offers for {:?}", query);
        let response = self
            .client
            .get(self.url("/api/offers"))
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(ApiError::unreachable)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, "Failed to fetch offers").await);
        }

        Self::read_json(response).await
    }

    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingResult, ApiError> {
        debug!(
            "Creating booking for {} / {}",
            request.property_id, request.rate_plan_id
        );
        let response = self
            .client
            .post(self.url("/api/bookings"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::unreachable)?;

        Self::read_json(response).await
    }

    async fn request_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, ApiError> {
        debug!("Requesting payment link for booking {}", request.booking_id);
        let response = self
            .client
            .post(self.url("/api/payment-link"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::unreachable)?;

        Self::read_json(response).await
    }
}

impl ChatApi for ApiClient {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::unreachable)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, "Server error").await);
        }

        Self::read_json(response).await
    }
}
