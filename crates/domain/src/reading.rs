//! Reading — one temperature / humidity sample from the room sensor.

use serde::{Deserialize, Deserializer, Serialize};

/// Temperature band (°C) produced by the device's simulation mode.
pub const SIMULATED_TEMPERATURE_RANGE: (f64, f64) = (25.0, 30.0);

/// Humidity band (%) produced by the device's simulation mode.
pub const SIMULATED_HUMIDITY_RANGE: (f64, f64) = (60.0, 80.0);

/// A sample of the monitored environment.
///
/// No range is enforced on either value. A temperature of `0.0` is what
/// callers substitute when the device did not report one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Degrees Celsius.
    #[serde(deserialize_with = "nan_if_null")]
    pub temperature: f64,
    /// Relative humidity in percent.
    #[serde(deserialize_with = "nan_if_null")]
    pub humidity: f64,
    /// Whether the upstream sensor was active when sampled.
    pub sensor_enabled: bool,
    /// Whether this reading is synthetic rather than device-sourced.
    pub is_dummy: bool,
}

/// JSON has no non-finite numbers: `serde_json` writes them as `null`.
/// Read such a value back as NaN so the record survives a reload.
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Reading {
    #[must_use]
    pub fn new(temperature: f64, humidity: f64, sensor_enabled: bool, is_dummy: bool) -> Self {
        Self {
            temperature,
            humidity,
            sensor_enabled,
            is_dummy,
        }
    }
}

/// Body exchanged with the sensor endpoint (`GET`/`POST /api/data`).
///
/// The device may omit values (it reports `null` until its first
/// measurement), so every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorPayload {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dummy: Option<bool>,
}

impl SensorPayload {
    /// Convert into a [`Reading`], substituting defaults for missing values.
    ///
    /// Missing numbers become `0.0` and a missing enabled flag counts as
    /// enabled. `fallback_dummy` is used only when the payload carries no
    /// explicit `isDummy` flag.
    #[must_use]
    pub fn into_reading(self, fallback_dummy: bool) -> Reading {
        Reading {
            temperature: self.temperature.unwrap_or_default(),
            humidity: self.humidity.unwrap_or_default(),
            sensor_enabled: self.sensor_enabled.unwrap_or(true),
            is_dummy: self.is_dummy.unwrap_or(fallback_dummy),
        }
    }
}

/// Guess whether a reading came from the device's simulation mode.
///
/// The firmware emits values inside a fixed band when no real sensor is
/// attached. Prefer an explicit `isDummy` flag from the source whenever one
/// is available; this heuristic misclassifies a genuinely warm, humid room.
#[must_use]
pub fn looks_simulated(temperature: f64, humidity: f64) -> bool {
    let (t_lo, t_hi) = SIMULATED_TEMPERATURE_RANGE;
    let (h_lo, h_hi) = SIMULATED_HUMIDITY_RANGE;
    (t_lo..=t_hi).contains(&temperature) && (h_lo..=h_hi).contains(&humidity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_reading_with_camel_case_fields() {
        let reading = Reading::new(26.0, 65.0, true, false);
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "temperature": 26.0,
                "humidity": 65.0,
                "sensorEnabled": true,
                "isDummy": false,
            })
        );
    }

    #[test]
    fn should_read_null_value_back_as_nan() {
        let reading = Reading::new(f64::NAN, 45.0, true, false);
        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"temperature\":null"));

        let parsed: Reading = serde_json::from_str(&json).unwrap();

        assert!(parsed.temperature.is_nan());
        assert!((parsed.humidity - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_still_require_temperature_and_humidity() {
        let result = serde_json::from_str::<Reading>(
            r#"{"humidity": 45.0, "sensorEnabled": true, "isDummy": false}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn should_substitute_zero_for_missing_values() {
        let payload: SensorPayload =
            serde_json::from_str(r#"{"temperature": null, "humidity": null}"#).unwrap();
        let reading = payload.into_reading(false);
        assert_eq!(reading, Reading::new(0.0, 0.0, true, false));
    }

    #[test]
    fn should_prefer_explicit_dummy_flag_over_fallback() {
        let payload = SensorPayload {
            temperature: Some(27.0),
            humidity: Some(70.0),
            sensor_enabled: Some(false),
            is_dummy: Some(false),
        };
        let reading = payload.into_reading(true);
        assert!(!reading.is_dummy);
        assert!(!reading.sensor_enabled);
    }

    #[test]
    fn should_use_fallback_when_dummy_flag_absent() {
        let payload: SensorPayload = serde_json::from_str(
            r#"{"temperature": 27.5, "humidity": 70.0, "sensorEnabled": true}"#,
        )
        .unwrap();
        assert!(payload.into_reading(true).is_dummy);
    }

    #[test]
    fn should_omit_absent_flags_when_serializing_payload() {
        let payload = SensorPayload::default();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temperature": null, "humidity": null})
        );
    }

    #[test]
    fn should_flag_values_inside_simulation_band() {
        assert!(looks_simulated(25.0, 60.0));
        assert!(looks_simulated(30.0, 80.0));
        assert!(looks_simulated(27.3, 71.2));
    }

    #[test]
    fn should_not_flag_values_outside_simulation_band() {
        assert!(!looks_simulated(24.9, 70.0));
        assert!(!looks_simulated(27.0, 80.1));
        assert!(!looks_simulated(0.0, 0.0));
    }
}
