//! Measure catalog lookup: which sensors a station has, and validation of
//! measure names against the published parameter set.

use crate::api::{Client, Transport};
use crate::endpoint;
use crate::error::{FloodError, Result};
use crate::models::{MeasureDescriptor, MeasureEntry, MeasureParameter};
use log::debug;
use std::collections::HashSet;

/// Unit acronyms used by level measures.
pub const UNIT_ACRONYMS: [(&str, &str); 3] = [
    ("mAOD", "Metres relative to the Ordnance Survey datum"),
    ("mASD", "Metres relative to the local stage datum"),
    ("m", "Metres with an unspecified datum"),
];

/// Fails with [`FloodError::UnknownMeasure`] unless `name` is a published parameter.
pub fn check_valid_measure_name(name: &str) -> Result<MeasureParameter> {
    name.parse()
}

/// Distinct parameter names in first-seen order.
pub fn parameters(measures: &[MeasureDescriptor]) -> Vec<String> {
    let mut seen = HashSet::new();
    measures
        .iter()
        .filter(|m| seen.insert(m.parameter.as_str()))
        .map(|m| m.parameter.clone())
        .collect()
}

impl<T: Transport> Client<T> {
    /// Active measures of a station, one descriptor per measure endpoint.
    ///
    /// Entries without a `latestReading` are dormant sensors and skipped.
    pub fn get_station_measures(&self, station_id: &str) -> Result<Vec<MeasureDescriptor>> {
        let entries: Vec<MeasureEntry> =
            self.get_records(&endpoint::station_measures(station_id))?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for entry in &entries {
            let Some(ep) = entry.latest_measure_endpoint() else {
                debug!("Skipping dormant measure {:?} at {station_id}", entry.uri);
                continue;
            };
            if !seen.insert(ep.to_string()) {
                continue;
            }
            out.push(MeasureDescriptor {
                parameter: entry.parameter.clone().unwrap_or_default(),
                endpoint: ep.to_string(),
                unit: entry.unit_name.clone().unwrap_or_default(),
                qualifier: entry.qualifier.clone().unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Fails with [`FloodError::MeasureNotAtStation`] if the station has no
    /// active measure called `measure`; otherwise returns the matching sensors.
    pub fn check_station_has_measure(
        &self,
        station_id: &str,
        measure: &str,
    ) -> Result<Vec<MeasureDescriptor>> {
        let all = self.get_station_measures(station_id)?;
        select_measure(station_id, all, measure)
    }
}

pub(crate) fn select_measure(
    station_id: &str,
    all: Vec<MeasureDescriptor>,
    measure: &str,
) -> Result<Vec<MeasureDescriptor>> {
    let available = parameters(&all);
    let selected: Vec<MeasureDescriptor> =
        all.into_iter().filter(|m| m.parameter == measure).collect();
    if selected.is_empty() {
        return Err(FloodError::MeasureNotAtStation {
            station: station_id.to_string(),
            measure: measure.to_string(),
            available,
        });
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(parameter: &str, endpoint: &str) -> MeasureDescriptor {
        MeasureDescriptor {
            parameter: parameter.into(),
            endpoint: endpoint.into(),
            unit: "m".into(),
            qualifier: "Stage".into(),
        }
    }

    #[test]
    fn measure_names_are_validated() {
        assert_eq!(check_valid_measure_name("flow").unwrap(), MeasureParameter::Flow);
        assert!(matches!(
            check_valid_measure_name("rainfall"),
            Err(FloodError::UnknownMeasure(name)) if name == "rainfall"
        ));
    }

    #[test]
    fn parameters_are_distinct_in_order() {
        let all = vec![desc("level", "a"), desc("flow", "b"), desc("level", "c")];
        assert_eq!(parameters(&all), vec!["level", "flow"]);
    }

    #[test]
    fn select_keeps_every_sensor_of_the_parameter() {
        let all = vec![desc("level", "a"), desc("flow", "b"), desc("level", "c")];
        let picked = select_measure("X", all.clone(), "level").unwrap();
        assert_eq!(picked.len(), 2);
        let err = select_measure("X", all, "wind").unwrap_err();
        match err {
            FloodError::MeasureNotAtStation { available, .. } => {
                assert_eq!(available, vec!["level", "flow"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
