use crate::error::FloodError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A monitoring station as returned by a lookup or a name search.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationRef {
    pub id: String,
    pub name: String,
}

impl StationRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The measurement types the service publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureParameter {
    Level,
    Flow,
    Wind,
    Temperature,
}

impl MeasureParameter {
    pub const ALL: [MeasureParameter; 4] = [
        MeasureParameter::Level,
        MeasureParameter::Flow,
        MeasureParameter::Wind,
        MeasureParameter::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureParameter::Level => "level",
            MeasureParameter::Flow => "flow",
            MeasureParameter::Wind => "wind",
            MeasureParameter::Temperature => "temperature",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MeasureParameter::Level => {
                "Water level of a river, estuary or the sea, or groundwater level"
            }
            MeasureParameter::Flow => "Rate of flow of water in a river channel",
            MeasureParameter::Wind => "Wind speed and direction at the monitoring site",
            MeasureParameter::Temperature => "Air or water temperature at the monitoring site",
        }
    }
}

impl fmt::Display for MeasureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureParameter {
    type Err = FloodError;

    /// Exact, case-sensitive match against the published parameter names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasureParameter::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| FloodError::UnknownMeasure(s.to_string()))
    }
}

/// One active sensor at a station, keyed by its measure endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureDescriptor {
    pub parameter: String,
    pub endpoint: String,
    pub unit: String,
    pub qualifier: String,
}

/// Time filter for a readings query.
///
/// `end == None` is an open "since" query running up to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Since-query covering the `hours` before `now`.
    pub fn last_hours(now: DateTime<Utc>, hours: i64) -> Self {
        Self::since(crate::time::hours_before(now, hours))
    }
}

/// One timestamped observation of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Unit and qualifier carried next to a table column for labelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureInfo {
    pub parameter: String,
    pub qualifier: String,
    pub unit: String,
}

impl MeasureInfo {
    pub fn from_descriptor(d: &MeasureDescriptor) -> Self {
        Self {
            parameter: d.parameter.clone(),
            qualifier: d.qualifier.clone(),
            unit: d.unit.clone(),
        }
    }

    /// Axis label, e.g. `"level - Stage (mASD)"`.
    pub fn axis_label(&self) -> String {
        format!("{} - {} ({})", self.parameter, self.qualifier, self.unit)
    }
}

/// Column label -> unit/qualifier metadata.
pub type MeasurementInfo = BTreeMap<String, MeasureInfo>;

/// Raw station record from the `id/stations` collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationEntry {
    #[serde(rename = "@id", default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub station_reference: Option<String>,
    #[serde(default)]
    pub notation: Option<String>,
    /// Some records carry the label as an array of strings; keep the first.
    #[serde(default, deserialize_with = "de_opt_string_or_first")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_first")]
    pub river_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_first")]
    pub town: Option<String>,
}

impl StationEntry {
    /// `None` when the record has neither a station reference nor a notation.
    pub fn to_station_ref(&self) -> Option<StationRef> {
        let id = self
            .station_reference
            .as_deref()
            .or(self.notation.as_deref())
            .filter(|s| !s.is_empty())?;
        Some(StationRef::new(id, self.label.clone().unwrap_or_default()))
    }
}

/// Raw measure record from `id/stations/{id}/measures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureEntry {
    #[serde(rename = "@id", default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub latest_reading: Option<serde_json::Value>,
}

impl MeasureEntry {
    /// Measure endpoint of the latest reading, present only for active sensors.
    pub fn latest_measure_endpoint(&self) -> Option<&str> {
        match self.latest_reading.as_ref()? {
            serde_json::Value::Object(map) if !map.is_empty() => map
                .get("measure")?
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

/// Raw reading record from a `.../readings` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEntry {
    pub date_time: String,
    /// Usually a number; duplicated readings come back as an array and a few
    /// stations publish numeric strings.
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub value: Option<f64>,
}

/// Serde helper: accept `"text"`, `["text", ...]` or `null`.
fn de_opt_string_or_first<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    struct LabelVisitor;

    impl<'de> Visitor<'de> for LabelVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a string, an array of strings, or null")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(s.to_string()))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let first: Option<String> = seq.next_element()?;
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(first)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LabelVisitor)
}

/// Serde helper: parse `f64` from a number, a numeric string, the first
/// element of an array, or `null`.
fn de_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    struct ValueVisitor;

    impl<'de> Visitor<'de> for ValueVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a number, a numeric string, an array of numbers, or null")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(s.trim().parse::<f64>().ok())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut first = None;
            while let Some(v) = seq.next_element::<serde_json::Value>()? {
                if first.is_none() {
                    first = v.as_f64();
                }
            }
            Ok(first)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ValueVisitor)
}
