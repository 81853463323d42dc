//! In-process stand-in for the current-weather endpoint.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use tempscope_core::config::WeatherConfig;

pub const GOOD_KEY: &str = "mock-key-0123456789";
pub const BAD_KEY: &str = "rejected-key-0000";
pub const MISSING_CITY: &str = "Atlantis";
pub const GARBLED_CITY: &str = "Garbled";
pub const TEMPERATURE: f64 = 17.5;

const PATH: &str = "/data/2.5/weather";

async fn weather(Query(params): Query<HashMap<String, String>>) -> Response {
    let key = params.get("appid").map(String::as_str).unwrap_or_default();
    let city = params.get("q").cloned().unwrap_or_default();

    if key != GOOD_KEY {
        let body = json!({"cod": 401, "message": "Invalid API key."});
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }
    if city == MISSING_CITY {
        let body = json!({"cod": "404", "message": "city not found"});
        return (StatusCode::NOT_FOUND, Json(body)).into_response();
    }
    if city == GARBLED_CITY {
        return (StatusCode::OK, "{\"name\": ").into_response();
    }

    let echo = format!(
        "units={} lang={}",
        params.get("units").map(String::as_str).unwrap_or_default(),
        params.get("lang").map(String::as_str).unwrap_or_default()
    );
    Json(json!({
        "name": city,
        "main": {"temp": TEMPERATURE, "feels_like": 16.0, "humidity": 55, "pressure": 1013},
        "weather": [{"description": echo}],
        "wind": {"speed": 2.5},
        "clouds": {"all": 20},
        "cod": 200
    }))
    .into_response()
}

/// Start the mock on its own thread and runtime; returns the endpoint URL.
///
/// The listener is bound before returning, so requests issued right away
/// queue until the server starts accepting.
pub fn spawn() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock listener");
    let addr = listener.local_addr().expect("mock listener address");
    listener.set_nonblocking(true).expect("nonblocking mock listener");

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let app = Router::new().route(PATH, get(weather));
            axum::serve(listener, app).await.ok();
        });
    });

    format!("http://{addr}{PATH}")
}

/// URL of a port nothing listens on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}{PATH}")
}

pub fn config(base_url: &str) -> WeatherConfig {
    WeatherConfig {
        api_key: Some(GOOD_KEY.to_string()),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..WeatherConfig::default()
    }
}
