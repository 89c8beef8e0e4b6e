//! Integration tests for OpenWeatherProvider against a wiremock server.

mod common;

use common::{API_KEY, current_json, forecast_json, mount_success};
use reqwest::StatusCode;
use weather_news_core::{
    Coordinates, Endpoint, FetchError, OpenWeatherProvider, UnitSystem, WeatherProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(API_KEY.to_string()).with_base_url(server.uri())
}

fn berlin() -> Coordinates {
    Coordinates::new(52.52, 13.405)
}

#[tokio::test]
async fn test_fetch_success_returns_both_parts() {
    let server = MockServer::start().await;
    mount_success(&server, 12.6).await;

    let snapshot = provider(&server)
        .fetch_weather(&berlin(), UnitSystem::Metric)
        .await
        .expect("fetch should succeed");

    assert_eq!(snapshot.units, UnitSystem::Metric);
    assert_eq!(snapshot.current.location_name, "Berlin");
    assert_eq!(snapshot.current.temperature, 12.6);
    assert_eq!(snapshot.forecast.entries.len(), 40);
    assert_eq!(snapshot.forecast.city.as_deref(), Some("Berlin"));
}

#[tokio::test]
async fn test_fetch_sends_coordinates_units_and_key() {
    let server = MockServer::start().await;

    for endpoint in ["/weather", "/forecast"] {
        let body = if endpoint == "/weather" {
            current_json("Springfield", 71.0)
        } else {
            forecast_json(40)
        };

        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("lat", "39.8"))
            .and(query_param("lon", "-89.65"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let snapshot = provider(&server)
        .fetch_weather(&Coordinates::new(39.8, -89.65), UnitSystem::Imperial)
        .await
        .expect("fetch should succeed");

    assert_eq!(snapshot.units, UnitSystem::Imperial);
    assert_eq!(snapshot.current.location_name, "Springfield");
}

#[tokio::test]
async fn test_current_status_error_skips_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(40)))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    match err {
        FetchError::Status { endpoint, status, ref body } => {
            assert_eq!(endpoint, Endpoint::Current);
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "Invalid API key");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forecast_status_error_fails_whole_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Berlin", 10.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert_eq!(err.endpoint(), Endpoint::Forecast);
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.user_message(), "Failed to fetch weather or forecast data");
}

#[tokio::test]
async fn test_status_is_checked_before_body_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_current_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { endpoint: Endpoint::Current, .. }), "got {err:?}");
    assert_eq!(err.user_message(), "Failed to fetch weather data");
}

#[tokio::test]
async fn test_malformed_forecast_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Berlin", 10.0)))
        .mount(&server)
        .await;

    // Valid JSON, wrong shape.
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cod": "200"})))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { endpoint: Endpoint::Forecast, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_forecast_timestamp_out_of_range_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Berlin", 10.0)))
        .mount(&server)
        .await;

    let mut forecast = forecast_json(40);
    forecast["list"][3]["dt"] = serde_json::json!(i64::MAX);
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { endpoint: Endpoint::Forecast, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 1.
    let provider = OpenWeatherProvider::new(API_KEY.to_string()).with_base_url("http://127.0.0.1:1");

    let err = provider.fetch_weather(&berlin(), UnitSystem::Metric).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { endpoint: Endpoint::Current, .. }), "got {err:?}");
    assert_eq!(err.status(), None);
}
