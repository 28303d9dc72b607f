//! Integration tests for `NominatimClient` using wiremock HTTP mocks.

use serde_json::json;
use uamap_core::Coordinates;
use uamap_geocoder::{GeocodeError, NominatimClient, Resolution, Resolver};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NominatimClient {
    NominatimClient::new(base_url, "uamap-test/0.1", 5, "Ukraine")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn resolve_returns_first_hit() {
    let server = MockServer::start().await;

    let body = json!([
        { "lat": "50.4500336", "lon": "30.5241361", "display_name": "Київ, Україна" },
        { "lat": "1.0", "lon": "2.0", "display_name": "somewhere else" }
    ]);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Київ, Київська, Ukraine"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resolution = client
        .resolve("Київ", "Київська")
        .await
        .expect("lookup should succeed");

    assert_eq!(
        resolution,
        Resolution::Found(Coordinates::new(50.450_033_6, 30.524_136_1))
    );
}

#[tokio::test]
async fn resolve_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "uamap-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.resolve("Ужгород", "Закарпатська").await.unwrap();
}

#[tokio::test]
async fn empty_hit_list_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resolution = client.resolve("Нідесело", "Нікуди").await.unwrap();
    assert_eq!(resolution, Resolution::NotFound);
}

#[tokio::test]
async fn server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Полтава", "Полтавська").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::UnexpectedStatus { status: 503, .. }),
        "expected UnexpectedStatus(503), got: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn too_many_requests_is_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Суми", "Сумська").await.unwrap_err();
    assert!(
        matches!(
            err,
            GeocodeError::RateLimited {
                retry_after_secs: 30
            }
        ),
        "expected RateLimited(30), got: {err:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Рівне", "Рівненська").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
    assert!(!err.is_transient());
}

#[tokio::test]
async fn non_numeric_coordinate_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "lat": "north", "lon": "30.1" }])),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve("Черкаси", "Черкаська").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::InvalidCoordinate { ref value } if value == "north"),
        "expected InvalidCoordinate, got: {err:?}"
    );
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    // Nothing listens on port 1; the connection is refused.
    let client = test_client("http://127.0.0.1:1");
    let err = client.resolve("Херсон", "Херсонська").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::Http(_)),
        "expected Http, got: {err:?}"
    );
    assert!(err.is_transient());
}
