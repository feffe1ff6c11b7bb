//! ---
//! smartbin_section: "02-core-pipeline"
//! smartbin_subsection: "module"
//! smartbin_type: "source"
//! smartbin_scope: "code"
//! smartbin_description: "Raw telemetry record and field normalisation."
//! smartbin_version: "v0.1.0"
//! smartbin_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PipelineError;
use crate::status::DeviceState;

/// Key under which wrapped telemetry leaves expose their scalar.
pub const VALUE_KEY: &str = "Value";
/// Decimal places kept for live coordinates.
pub const COORDINATE_DECIMALS: i32 = 5;
pub const DEFAULT_STATE_LABEL: &str = "UNKNOWN";
pub const DEFAULT_FILL: f64 = 0.0;

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Coordinate used when the bin has not acquired a GPS fix yet.
    pub const FALLBACK: Self = Self {
        lat: 5.35888,
        lon: 100.30099,
    };

    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Shape of a single telemetry leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// The scalar itself.
    Raw(&'a Value),
    /// `{ "Value": x }`; `None` when the inner value is missing or null.
    Wrapped(Option<&'a Value>),
}

impl<'a> FieldValue<'a> {
    /// Classify a leaf. `null` counts as absent.
    pub fn classify(node: &'a Value) -> Option<Self> {
        match node {
            Value::Null => None,
            Value::Object(map) => Some(FieldValue::Wrapped(
                map.get(VALUE_KEY).filter(|inner| !inner.is_null()),
            )),
            other => Some(FieldValue::Raw(other)),
        }
    }

    pub fn inner(&self) -> Option<&'a Value> {
        match *self {
            FieldValue::Raw(value) => Some(value),
            FieldValue::Wrapped(inner) => inner,
        }
    }
}

/// Scalars that a telemetry leaf can be coerced into.
pub trait Scalar: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl Scalar for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }?;
        number.is_finite().then_some(number)
    }
}

impl Scalar for String {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Resolve a possibly-wrapped leaf to its scalar, falling back to `default`
/// when the leaf is absent, wraps nothing, or cannot be coerced.
pub fn extract_value<T: Scalar>(node: Option<&Value>, default: T) -> T {
    node.and_then(FieldValue::classify)
        .and_then(|field| field.inner())
        .and_then(T::from_json)
        .unwrap_or(default)
}

pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS);
    (value * factor).round() / factor
}

/// Resolve one coordinate axis. Exact zero after rounding means "no GPS fix"
/// and, like values beyond `bound`, yields `fallback`.
pub fn resolve_coordinate(node: Option<&Value>, fallback: f64, bound: f64) -> f64 {
    let rounded = round_coordinate(extract_value(node, fallback));
    if rounded == 0.0 || rounded.abs() > bound {
        fallback
    } else {
        rounded
    }
}

/// Raw node fetched from the telemetry store.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    fields: Map<String, Value>,
}

impl TelemetryRecord {
    /// Accept a fetch result. Empty results and non-object payloads end the cycle.
    pub fn from_fetch(value: Value, path: &str) -> Result<Self, PipelineError> {
        if is_empty_payload(&value) {
            return Err(PipelineError::EmptyTelemetry {
                path: path.to_owned(),
            });
        }
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(PipelineError::MalformedTelemetry {
                path: path.to_owned(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }

    pub fn lat(&self) -> Option<&Value> {
        self.fields.get("location").and_then(|loc| loc.get("lat"))
    }

    pub fn lng(&self) -> Option<&Value> {
        self.fields.get("location").and_then(|loc| loc.get("lng"))
    }

    pub fn state(&self) -> Option<&Value> {
        self.fields.get("state")
    }

    pub fn fill_percentage(&self) -> Option<&Value> {
        self.fields.get("fillPercentage")
    }
}

/// Telemetry with every field resolved to a usable scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTelemetry {
    pub position: Coordinates,
    pub state: DeviceState,
    pub fill: f64,
}

pub fn normalize(record: &TelemetryRecord, fallback: Coordinates) -> NormalizedTelemetry {
    let position = Coordinates {
        lat: resolve_coordinate(record.lat(), fallback.lat, 90.0),
        lon: resolve_coordinate(record.lng(), fallback.lon, 180.0),
    };
    let label: String = extract_value(record.state(), DEFAULT_STATE_LABEL.to_owned());
    let fill = extract_value(record.fill_percentage(), DEFAULT_FILL).clamp(0.0, 100.0);
    NormalizedTelemetry {
        position,
        state: DeviceState::from_label(&label),
        fill,
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
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
