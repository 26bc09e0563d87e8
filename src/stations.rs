//! Station resolver: existence checks, name search, listing.

use crate::api::{Client, Transport};
use crate::endpoint;
use crate::error::{FloodError, Result};
use crate::models::{StationEntry, StationRef};
use log::debug;
use rand::Rng;
use serde_json::Value;
use std::collections::HashSet;

/// Outcome of resolving a user-typed station name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// One or more stations whose label equals the query (case-insensitive).
    Exact(Vec<StationRef>),
    /// Stations whose label only partially matches; the caller picks.
    Partial(Vec<StationRef>),
    NoMatch,
}

impl<T: Transport> Client<T> {
    /// Fails with [`FloodError::StationNotFound`] if no station has this reference.
    pub fn check_valid_station(&self, station_id: &str) -> Result<()> {
        self.lookup_station(station_id).map(|_| ())
    }

    /// Resolve an id to its reference and label.
    pub fn station_ref(&self, station_id: &str) -> Result<StationRef> {
        let entries = self.lookup_station(station_id)?;
        let label = entries
            .iter()
            .find_map(|e| e.label.clone())
            .unwrap_or_default();
        Ok(StationRef::new(station_id.trim(), label))
    }

    pub fn station_name(&self, station_id: &str) -> Result<String> {
        self.station_ref(station_id).map(|s| s.name)
    }

    fn lookup_station(&self, station_id: &str) -> Result<Vec<StationEntry>> {
        let entries: Vec<StationEntry> =
            self.get_records(&endpoint::station_lookup(station_id))?;
        if entries.is_empty() {
            return Err(FloodError::StationNotFound(station_id.to_string()));
        }
        Ok(entries)
    }

    /// Every station whose name (partially) matches `query`.
    ///
    /// Zero matches is a valid outcome and returns an empty vector.
    pub fn search_stations_by_name(&self, query: &str) -> Result<Vec<StationRef>> {
        let entries: Vec<StationEntry> = self.get_records(&endpoint::station_search(query))?;
        let matches: Vec<StationRef> = entries
            .iter()
            .filter_map(StationEntry::to_station_ref)
            .collect();
        debug!("Search '{query}' matched {} station(s)", matches.len());
        Ok(matches)
    }

    /// Search by name and classify the matches.
    pub fn resolve_station_name(&self, query: &str) -> Result<NameMatch> {
        let matches = self.search_stations_by_name(query)?;
        if matches.is_empty() {
            return Ok(NameMatch::NoMatch);
        }
        let wanted = query.trim().to_lowercase();
        let exact: Vec<StationRef> = matches
            .iter()
            .filter(|s| s.name.trim().to_lowercase() == wanted)
            .cloned()
            .collect();
        if exact.is_empty() {
            Ok(NameMatch::Partial(matches))
        } else {
            Ok(NameMatch::Exact(exact))
        }
    }

    /// Raw station records, for display.
    pub fn get_station_info(&self, station_id: &str) -> Result<Vec<Value>> {
        self.get_items(&endpoint::station_detail(station_id))
    }

    pub fn list_stations(&self) -> Result<Vec<StationRef>> {
        let entries: Vec<StationEntry> = self.get_records(&endpoint::station_list())?;
        Ok(entries
            .iter()
            .filter_map(StationEntry::to_station_ref)
            .collect())
    }

    /// Pick one station uniformly from the full listing.
    pub fn random_station<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<StationRef> {
        let mut stations = self.list_stations()?;
        if stations.is_empty() {
            return Err(FloodError::StationNotFound("<any>".into()));
        }
        let idx = rng.random_range(0..stations.len());
        Ok(stations.swap_remove(idx))
    }
}

/// Drop repeated stations (same id), keeping the first occurrence in order.
pub fn unique_stations(stations: Vec<StationRef>) -> Vec<StationRef> {
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect()
}

/// Capitalise every word of a station name except "at".
pub fn title_case_station(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            if word.eq_ignore_ascii_case("at") {
                word.to_string()
            } else {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
