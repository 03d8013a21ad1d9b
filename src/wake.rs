use crate::api::BookingApi;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Ping the backend once after `delay` so a dormant instance starts
/// spinning up before the visitor searches. The outcome is ignored.
pub fn spawn_wake_ping<A>(api: A, delay: Duration) -> JoinHandle<()>
where
    A: BookingApi + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match api.health().await {
            Ok(()) => debug!("Backend wake ping answered"),
            Err(e) => debug!("Backend wake ping failed: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ping_hits_health_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::with_client(reqwest::Client::new(), &server.uri());
        spawn_wake_ping(api, Duration::from_millis(10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_ping_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = ApiClient::with_client(reqwest::Client::new(), &server.uri());
        assert!(spawn_wake_ping(api, Duration::ZERO).await.is_ok());
    }
}
