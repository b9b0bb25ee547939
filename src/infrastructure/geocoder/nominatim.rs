//! Nominatim (OpenStreetMap) geocoder client

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::geo::Coordinates;
use crate::domain::geocoding::ExternalGeocoder;
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClient, HttpClientTrait};
use crate::infrastructure::observability::record_external_request;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "PolisAPI/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const PROVIDER: &str = "nominatim";

/// Configuration for the Nominatim client
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NominatimConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

/// Sweden-biased free-text search against a Nominatim instance
#[derive(Debug)]
pub struct NominatimClient<C: HttpClientTrait = HttpClient> {
    config: NominatimConfig,
    http_client: Arc<C>,
}

impl NominatimClient<HttpClient> {
    /// Client over reqwest, enforcing the configured timeout
    pub fn new(config: NominatimConfig) -> Result<Self, DomainError> {
        let http_client = HttpClient::with_timeout(config.timeout)?;
        Ok(Self::with_client(config, Arc::new(http_client)))
    }
}

impl<C: HttpClientTrait> NominatimClient<C> {
    pub fn with_client(config: NominatimConfig, http_client: Arc<C>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    async fn search(&self, name: &str) -> Result<Option<Coordinates>, DomainError> {
        let query = format!("{}, Sweden", name);
        let params = [
            ("q", query.as_str()),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", "se"),
            ("accept-language", "sv"),
        ];
        let headers = [
            ("User-Agent", self.config.user_agent.as_str()),
            ("Accept-Language", "sv,en"),
        ];

        let body = self
            .http_client
            .get_json(&self.config.search_url(), &params, &headers)
            .await?;

        parse_first_result(&body)
    }
}

/// Extracts coordinates from element 0 of a search response.
///
/// `lat`/`lon` arrive as strings; plain numbers are accepted as well.
fn parse_first_result(body: &Value) -> Result<Option<Coordinates>, DomainError> {
    let results = body
        .as_array()
        .ok_or_else(|| DomainError::provider(PROVIDER, "Expected a JSON array"))?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = coordinate_field(first, "lat")?;
    let lon = coordinate_field(first, "lon")?;

    Ok(Some(Coordinates::new(lat, lon)).filter(Coordinates::is_valid))
}

fn coordinate_field(result: &Value, field: &str) -> Result<f64, DomainError> {
    let value = match result.get(field) {
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    value.ok_or_else(|| DomainError::provider(PROVIDER, format!("Missing or invalid '{}'", field)))
}

#[async_trait]
impl<C: HttpClientTrait> ExternalGeocoder for NominatimClient<C> {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn geocode(&self, name: &str) -> Option<Coordinates> {
        let started = Instant::now();
        let outcome = self.search(name).await;
        let elapsed = started.elapsed();

        match outcome {
            Ok(Some(coordinates)) => {
                debug!(name, %coordinates, "Nominatim hit");
                record_external_request(PROVIDER, "hit", elapsed);
                Some(coordinates)
            }
            Ok(None) => {
                debug!(name, "Nominatim returned no results");
                record_external_request(PROVIDER, "empty", elapsed);
                None
            }
            Err(e) => {
                warn!(name, error = %e, "Nominatim lookup failed");
                record_external_request(PROVIDER, "error", elapsed);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

    fn client_with(mock: MockHttpClient) -> (NominatimClient<MockHttpClient>, Arc<MockHttpClient>) {
        let http = Arc::new(mock);
        (
            NominatimClient::with_client(NominatimConfig::default(), http.clone()),
            http,
        )
    }

    #[tokio::test]
    async fn test_geocode_parses_first_result() {
        let (client, _) = client_with(MockHttpClient::new().with_response(
            SEARCH_URL,
            json!([
                {"lat": "67.8557", "lon": "20.2253", "display_name": "Kiruna"},
                {"lat": "0", "lon": "0"}
            ]),
        ));

        let result = client.geocode("kiruna").await;
        assert_eq!(result, Some(Coordinates::new(67.8557, 20.2253)));
    }

    #[tokio::test]
    async fn test_geocode_sends_sweden_biased_query() {
        let (client, http) = client_with(MockHttpClient::new().with_response(SEARCH_URL, json!([])));

        client.geocode("abisko").await;

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, SEARCH_URL);
        assert_eq!(request.query_param("q"), Some("abisko, Sweden"));
        assert_eq!(request.query_param("format"), Some("json"));
        assert_eq!(request.query_param("limit"), Some("1"));
        assert_eq!(request.query_param("countrycodes"), Some("se"));
        assert_eq!(request.query_param("accept-language"), Some("sv"));
        assert_eq!(request.header("user-agent"), Some("PolisAPI/1.0"));
        assert_eq!(request.header("accept-language"), Some("sv,en"));
    }

    #[tokio::test]
    async fn test_empty_result_is_none() {
        let (client, _) = client_with(MockHttpClient::new().with_response(SEARCH_URL, json!([])));
        assert_eq!(client.geocode("nowhere").await, None);
    }

    #[tokio::test]
    async fn test_transport_error_is_none() {
        let (client, _) =
            client_with(MockHttpClient::new().with_error(SEARCH_URL, "connection refused"));
        assert_eq!(client.geocode("kiruna").await, None);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_none() {
        let (client, _) = client_with(
            MockHttpClient::new().with_response(SEARCH_URL, json!({"error": "bad"})),
        );
        assert_eq!(client.geocode("kiruna").await, None);

        let (client, _) = client_with(
            MockHttpClient::new().with_response(SEARCH_URL, json!([{"lat": "north", "lon": "1"}])),
        );
        assert_eq!(client.geocode("kiruna").await, None);
    }

    #[test]
    fn test_numeric_fields_accepted() {
        let parsed = parse_first_result(&json!([{"lat": 55.6, "lon": 13.0}])).unwrap();
        assert_eq!(parsed, Some(Coordinates::new(55.6, 13.0)));
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        let config = NominatimConfig::default().with_base_url("http://localhost:8080/");
        assert_eq!(config.search_url(), "http://localhost:8080/search");
    }

    #[tokio::test]
    async fn test_against_http_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Luleå, Sweden"))
            .and(query_param("countrycodes", "se"))
            .and(header("User-Agent", "polis-test/0.1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"lat": "65.5848", "lon": "22.1547"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = NominatimConfig::default()
            .with_base_url(server.uri())
            .with_user_agent("polis-test/0.1");
        let client = NominatimClient::new(config).unwrap();

        assert_eq!(
            client.geocode("Luleå").await,
            Some(Coordinates::new(65.5848, 22.1547))
        );
    }

    #[tokio::test]
    async fn test_server_error_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client =
            NominatimClient::new(NominatimConfig::default().with_base_url(server.uri())).unwrap();

        assert_eq!(client.geocode("kiruna").await, None);
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"lat": "1", "lon": "2"}]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = NominatimConfig::default()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50));
        let client = NominatimClient::new(config).unwrap();

        assert_eq!(client.geocode("kiruna").await, None);
    }
}
