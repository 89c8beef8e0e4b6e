//! Shared OpenWeather fixtures for the integration tests.
#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const API_KEY: &str = "test-key";

/// Helper to create a current-conditions payload
pub fn current_json(name: &str, temp: f64) -> Value {
    json!({
        "name": name,
        "dt": 1_709_510_400,
        "main": {"temp": temp, "feels_like": temp - 1.0, "humidity": 70, "pressure": 1012},
        "wind": {"speed": 3.6},
        "visibility": 10000,
        "weather": [{"icon": "04d", "description": "broken clouds", "main": "Clouds"}],
        "sys": {"country": "DE"}
    })
}

/// Helper to create a forecast payload with `n` 3-hour entries
pub fn forecast_json(n: usize) -> Value {
    let list: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "dt": 1_709_510_400 + 10_800 * i as i64,
                "main": {"temp": i as f64, "feels_like": i as f64, "humidity": 60, "pressure": 1010},
                "weather": [{"icon": "01n", "description": "clear sky", "main": "Clear"}],
                "wind": {"speed": 2.0}
            })
        })
        .collect();

    json!({"city": {"name": "Berlin", "country": "DE"}, "list": list})
}

/// Mount successful responses for both endpoints.
pub async fn mount_success(server: &MockServer, temp: f64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_json("Berlin", temp)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_json(40)))
        .mount(server)
        .await;
}
