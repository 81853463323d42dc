//! Current-weather payload decoding.

use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// One current-weather observation for a city. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// °C with `units=metric`.
    pub temperature: f64,
    pub feels_like: f64,
    /// Percent.
    pub humidity: f64,
    /// hPa.
    pub pressure: f64,
    pub description: String,
    pub wind_speed: f64,
    /// Cloud cover, percent.
    pub clouds: f64,
    /// Status code reported inside the payload.
    pub status: u16,
}

#[derive(Deserialize)]
struct RawResponse {
    name: String,
    main: RawMain,
    #[serde(default)]
    weather: Vec<RawCondition>,
    wind: RawWind,
    clouds: RawClouds,
    cod: RawCode,
}

#[derive(Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct RawCondition {
    description: String,
}

#[derive(Deserialize)]
struct RawWind {
    speed: f64,
}

#[derive(Deserialize)]
struct RawClouds {
    all: f64,
}

/// The service reports `cod` as a number on success and a string on errors.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u16),
    Text(String),
}

impl RawCode {
    fn as_u16(&self) -> Option<u16> {
        match self {
            RawCode::Number(n) => Some(*n),
            RawCode::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct RawErrorBody {
    message: Option<String>,
}

impl TryFrom<RawResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        let status = raw
            .cod
            .as_u16()
            .ok_or_else(|| WeatherError::Decode("unparseable cod field".into()))?;
        let description = raw
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();

        Ok(Self {
            city: raw.name,
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            description,
            wind_speed: raw.wind.speed,
            clouds: raw.clouds.all,
            status,
        })
    }
}

/// Map an HTTP status and body to a snapshot or a classified error.
///
/// Shared by the blocking and concurrent clients so both forms classify
/// failures identically.
pub(crate) fn interpret(status: u16, body: &str) -> Result<WeatherSnapshot, WeatherError> {
    if status == 401 {
        return Err(WeatherError::InvalidApiKey);
    }
    if status != 200 {
        let message = serde_json::from_str::<RawErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(WeatherError::Api { status, message });
    }

    let raw: RawResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    WeatherSnapshot::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "name": "Berlin",
        "main": {"temp": 12.3, "feels_like": 10.9, "humidity": 71, "pressure": 1014},
        "weather": [{"description": "небольшой дождь"}],
        "wind": {"speed": 4.1},
        "clouds": {"all": 90},
        "cod": 200
    }"#;

    #[test]
    fn decodes_success_payload() {
        let snap = interpret(200, OK_BODY).unwrap();
        assert_eq!(snap.city, "Berlin");
        assert_eq!(snap.temperature, 12.3);
        assert_eq!(snap.humidity, 71.0);
        assert_eq!(snap.description, "небольшой дождь");
        assert_eq!(snap.clouds, 90.0);
        assert_eq!(snap.status, 200);
    }

    #[test]
    fn unauthorized_wins_over_body() {
        let err = interpret(401, r#"{"cod":401,"message":"whatever"}"#).unwrap_err();
        assert_eq!(err, WeatherError::InvalidApiKey);
    }

    #[test]
    fn other_statuses_carry_service_message() {
        let err = interpret(404, r#"{"cod":"404","message":"city not found"}"#).unwrap_err();
        assert_eq!(
            err,
            WeatherError::Api { status: 404, message: "city not found".into() }
        );

        let err = interpret(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(
            err,
            WeatherError::Api { status: 502, message: "Unknown error".into() }
        );
    }

    #[test]
    fn string_cod_and_missing_conditions() {
        let body = r#"{"name":"X","main":{"temp":1,"feels_like":0,"humidity":1,"pressure":1},
                      "wind":{"speed":0},"clouds":{"all":0},"cod":"200"}"#;
        let snap = interpret(200, body).unwrap();
        assert_eq!(snap.status, 200);
        assert_eq!(snap.description, "");
    }

    #[test]
    fn malformed_success_body_is_decode_error() {
        assert!(matches!(interpret(200, "not json"), Err(WeatherError::Decode(_))));
    }
}
