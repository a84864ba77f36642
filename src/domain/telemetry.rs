//! Telemetry payloads and the enrichment merge.
//!
//! A telemetry message is any JSON object; the relay enforces no schema.
//! Before fan-out the verdict fields and two simulated auxiliary readings
//! are merged on top of the device's own fields (later keys win).

use rand::Rng;
use serde_json::{Map, Value};

use super::Verdict;
use crate::error::RelayError;

/// A device telemetry message: field name → JSON value.
pub type Telemetry = Map<String, Value>;

/// Field carrying the simulated auxiliary temperature reading.
pub const SIMULATED_TEMPERATURE_FIELD: &str = "simulated_temperature";

/// Field carrying the simulated auxiliary voltage reading.
pub const SIMULATED_VOLTAGE_FIELD: &str = "simulated_voltage";

/// Inclusive bounds of the simulated temperature reading.
pub const SIMULATED_TEMPERATURE_RANGE: (f64, f64) = (20.0, 30.0);

/// Inclusive bounds of the simulated voltage reading.
pub const SIMULATED_VOLTAGE_RANGE: (f64, f64) = (210.0, 230.0);

/// Parses a device frame as a telemetry object.
///
/// # Errors
///
/// Returns [`RelayError::InvalidTelemetry`] if the text is not JSON or is
/// JSON but not an object.
pub fn parse_telemetry(text: &str) -> Result<Telemetry, RelayError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(RelayError::InvalidTelemetry(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(err) => Err(RelayError::InvalidTelemetry(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Readings for sensors the hardware does not have.
///
/// The dashboard shows temperature and mains-voltage cards that no device
/// feeds, so the relay fills them with random values inside plausible
/// ranges. Field names carry a `simulated_` prefix so they are never
/// mistaken for measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticReadings {
    /// Simulated temperature, °C.
    pub temperature: f64,
    /// Simulated voltage, V.
    pub voltage: f64,
}

impl SyntheticReadings {
    /// Samples fresh readings from the thread-local RNG.
    #[must_use]
    pub fn sample() -> Self {
        Self::sample_with(&mut rand::rng())
    }

    /// Samples readings from `rng`, rounded to one decimal place.
    #[must_use]
    pub fn sample_with<R: Rng>(rng: &mut R) -> Self {
        let (t_lo, t_hi) = SIMULATED_TEMPERATURE_RANGE;
        let (v_lo, v_hi) = SIMULATED_VOLTAGE_RANGE;
        Self {
            temperature: round_tenth(rng.random_range(t_lo..t_hi)),
            voltage: round_tenth(rng.random_range(v_lo..v_hi)),
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Merges the verdict and the simulated readings into `telemetry`.
///
/// Precedence is telemetry < verdict < simulated readings.
#[must_use]
pub fn enrich(mut telemetry: Telemetry, verdict: Verdict, synthetic: SyntheticReadings) -> Telemetry {
    telemetry.extend(verdict.into_fields());
    telemetry.insert(
        SIMULATED_TEMPERATURE_FIELD.to_string(),
        Value::from(synthetic.temperature),
    );
    telemetry.insert(
        SIMULATED_VOLTAGE_FIELD.to_string(),
        Value::from(synthetic.voltage),
    );
    telemetry
}
