//! Data models and insight rules for the weather analysis service.

use serde::{Deserialize, Serialize};
use serde_json::Number;

// ---

pub const WARM_INSIGHT: &str = "It's a warm day. Stay hydrated!";
pub const COLD_INSIGHT: &str = "It's quite cold. Wear warm clothing.";
pub const RAIN_INSIGHT: &str = "Carry an umbrella; it might rain.";
pub const WIND_INSIGHT: &str = "It's windy. Be cautious outdoors.";

const WARM_ABOVE: f64 = 25.0;
const COLD_BELOW: f64 = 10.0;
const WINDY_ABOVE: f64 = 20.0;

/// Inbound `/analyze` payload.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    // ---
    pub city: Option<String>,
}

/// Current conditions as reported by the Weather Fetching Service.
///
/// Numbers keep the upstream representation so they are echoed back
/// unchanged (`30` stays `30`, not `30.0`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherReading {
    // ---
    pub temperature: Number,
    pub weather: String,
    pub wind_speed: Number,
}

/// Reading plus derived advisories, returned by `POST /analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    // ---
    pub temperature: Number,
    pub weather: String,
    pub wind_speed: Number,
    pub insights: Vec<&'static str>,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    // ---
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            error: None,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy",
            error: Some("Cannot reach Weather Fetching Service"),
        }
    }
}

impl WeatherReading {
    // ---
    /// Apply the threshold rules, in fixed order: temperature, rain, wind.
    pub fn derive_insights(&self) -> Vec<&'static str> {
        // ---
        let mut insights = Vec::new();
        let temperature = as_f64(&self.temperature);

        if temperature > WARM_ABOVE {
            insights.push(WARM_INSIGHT);
        } else if temperature < COLD_BELOW {
            insights.push(COLD_INSIGHT);
        }

        if self.weather.to_lowercase().contains("rain") {
            insights.push(RAIN_INSIGHT);
        }

        if as_f64(&self.wind_speed) > WINDY_ABOVE {
            insights.push(WIND_INSIGHT);
        }

        insights
    }

    pub fn into_analysis(self) -> AnalysisResult {
        // ---
        let insights = self.derive_insights();

        AnalysisResult {
            temperature: self.temperature,
            weather: self.weather,
            wind_speed: self.wind_speed,
            insights,
        }
    }
}

// Without `arbitrary_precision` every JSON number has an f64 view.
fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_reading(temperature: f64, weather: &str, wind_speed: f64) -> WeatherReading {
        // ---
        WeatherReading {
            temperature: Number::from_f64(temperature).unwrap(),
            weather: weather.to_string(),
            wind_speed: Number::from_f64(wind_speed).unwrap(),
        }
    }

    #[test]
    fn test_warm_day() {
        // ---
        let insights = create_test_reading(30.0, "clear", 5.0).derive_insights();
        assert_eq!(insights, vec![WARM_INSIGHT]);
        assert!(!insights.contains(&COLD_INSIGHT));
    }

    #[test]
    fn test_cold_day() {
        // ---
        let insights = create_test_reading(-3.5, "overcast", 2.0).derive_insights();
        assert_eq!(insights, vec![COLD_INSIGHT]);
        assert!(!insights.contains(&WARM_INSIGHT));
    }

    #[test]
    fn test_mild_range_has_no_temperature_insight() {
        // ---
        for temp in [10.0, 10.5, 17.0, 24.9, 25.0] {
            let insights = create_test_reading(temp, "clear", 0.0).derive_insights();
            assert!(insights.is_empty(), "{temp} should yield no insight, got {insights:?}");
        }

        // Edge cases just outside the band
        assert_eq!(create_test_reading(25.01, "clear", 0.0).derive_insights(), vec![WARM_INSIGHT]);
        assert_eq!(create_test_reading(9.99, "clear", 0.0).derive_insights(), vec![COLD_INSIGHT]);
    }

    #[test]
    fn test_rain_is_case_insensitive() {
        // ---
        for weather in ["rain", "Rain", "RAIN", "light rain", "Freezing RAIN showers", "drain"] {
            let insights = create_test_reading(15.0, weather, 0.0).derive_insights();
            assert_eq!(insights, vec![RAIN_INSIGHT], "weather = {weather:?}");
        }

        assert!(create_test_reading(15.0, "sunny", 0.0).derive_insights().is_empty());
    }

    #[test]
    fn test_wind_threshold() {
        // ---
        assert!(create_test_reading(15.0, "clear", 20.0).derive_insights().is_empty());
        assert_eq!(
            create_test_reading(15.0, "clear", 20.5).derive_insights(),
            vec![WIND_INSIGHT]
        );
    }

    #[test]
    fn test_all_rules_keep_fixed_order() {
        // ---
        let reading = create_test_reading(5.0, "light rain", 25.0);
        assert_eq!(
            reading.derive_insights(),
            vec![COLD_INSIGHT, RAIN_INSIGHT, WIND_INSIGHT]
        );
        // Same input, same output
        assert_eq!(reading.derive_insights(), reading.derive_insights());
    }

    #[test]
    fn test_integer_numbers_pass_through() {
        // ---
        let reading: WeatherReading =
            serde_json::from_str(r#"{"temperature": 30, "weather": "clear", "wind_speed": 5}"#)
                .unwrap();

        let body = serde_json::to_string(&reading.into_analysis()).unwrap();
        assert_eq!(
            body,
            r#"{"temperature":30,"weather":"clear","wind_speed":5,"insights":["It's a warm day. Stay hydrated!"]}"#
        );
    }

    #[test]
    fn test_null_fields_are_rejected() {
        // ---
        let missing = serde_json::from_str::<WeatherReading>(r#"{"temperature": 30, "wind_speed": 5}"#);
        assert!(missing.is_err());

        let null_weather = serde_json::from_str::<WeatherReading>(
            r#"{"temperature": 30, "weather": null, "wind_speed": 5}"#,
        );
        assert!(null_weather.is_err());

        let text_temperature = serde_json::from_str::<WeatherReading>(
            r#"{"temperature": "hot", "weather": "clear", "wind_speed": 5}"#,
        );
        assert!(text_temperature.is_err());
    }

    #[test]
    fn test_health_status_shape() {
        // ---
        assert_eq!(
            serde_json::to_string(&HealthStatus::healthy()).unwrap(),
            r#"{"status":"healthy"}"#
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::unhealthy()).unwrap(),
            r#"{"status":"unhealthy","error":"Cannot reach Weather Fetching Service"}"#
        );
    }
}
