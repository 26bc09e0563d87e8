mod common;

use chrono::{TimeZone, Utc};
use common::{FixtureTransport, client, measure_endpoint, readings, url, with_station};
use eaflood_rs::{DateWindow, FloodError, ReadingsRequest, StationRef};

fn window() -> DateWindow {
    DateWindow::between(
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap(),
    )
}

fn readings_path(id: &str, parameter: &str, qualifier: &str) -> String {
    format!(
        "{}/readings?startdate=2025-03-01&enddate=2025-03-03",
        measure_endpoint(id, parameter, qualifier)
    )
}

fn kings_mill(flow: &[(&str, f64)]) -> FixtureTransport {
    with_station(
        FixtureTransport::new(),
        "E2534",
        "KINGS MILL",
        &[("flow", "Stage", "m3/s"), ("level", "Stage", "mASD")],
    )
    .with(&readings_path("E2534", "flow", "Stage"), readings(flow))
    .with(
        &readings_path("E2534", "level", "Stage"),
        readings(&[("2025-03-01T00:00:00Z", 0.41)]),
    )
}

#[test]
fn single_measure_table_is_sorted_and_labelled() {
    let t = kings_mill(&[
        ("2025-03-01T00:15:00Z", 1.2),
        ("2025-03-01T00:00:00Z", 1.1),
    ]);
    let c = client(t);
    let got = c
        .get_station_readings("E2534", &window(), Some("flow"))
        .unwrap();

    assert_eq!(got.table.columns(), ["flow"]);
    assert_eq!(got.table.len(), 2);
    assert_eq!(got.table.rows()[0].values, vec![Some(1.1)]);
    assert_eq!(got.info["flow"].unit, "m3/s");
    assert_eq!(got.info["flow"].axis_label(), "flow - Stage (m3/s)");

    let requested = c.transport().requests();
    assert_eq!(requested.last().unwrap(), &url(&readings_path("E2534", "flow", "Stage")));
    assert!(!requested.iter().any(|u| u.contains("level-Stage")));
}

#[test]
fn reversed_input_gives_identical_table() {
    let points = [
        ("2025-03-01T00:00:00Z", 1.1),
        ("2025-03-01T00:15:00Z", 1.2),
        ("2025-03-01T00:30:00Z", 1.3),
    ];
    let mut reversed = points;
    reversed.reverse();

    let fwd = client(kings_mill(&points))
        .get_station_readings("E2534", &window(), Some("flow"))
        .unwrap();
    let rev = client(kings_mill(&reversed))
        .get_station_readings("E2534", &window(), Some("flow"))
        .unwrap();
    assert_eq!(fwd.table, rev.table);
}

#[test]
fn all_measures_are_outer_joined() {
    let c = client(kings_mill(&[("2025-03-01T00:15:00Z", 1.2)]));
    let got = c.get_station_readings("E2534", &window(), None).unwrap();
    assert_eq!(got.table.columns(), ["flow", "level"]);
    assert_eq!(got.table.len(), 2);
    assert_eq!(got.table.rows()[0].values, vec![None, Some(0.41)]);
    assert_eq!(got.table.rows()[1].values, vec![Some(1.2), None]);
}

#[test]
fn unknown_measure_fails_before_any_request() {
    let c = client(kings_mill(&[]));
    let err = c
        .get_station_readings("E2534", &window(), Some("rainfall"))
        .unwrap_err();
    assert!(matches!(err, FloodError::UnknownMeasure(_)));
    assert!(c.transport().requests().is_empty());
}

#[test]
fn empty_measure_is_reported() {
    let c = client(kings_mill(&[]));
    let err = c
        .get_station_readings("E2534", &window(), Some("flow"))
        .unwrap_err();
    assert!(matches!(
        err,
        FloodError::EmptyReadings { station, measure } if station == "E2534" && measure == "flow"
    ));
}

#[test]
fn batch_prefixes_columns_and_keeps_going_after_failures() {
    let t = kings_mill(&[("2025-03-01T00:00:00Z", 1.1)]);
    let t = with_station(t, "1029TH", "Bourton Dickler", &[("flow", "Stage", "m3/s")]).with(
        &readings_path("1029TH", "flow", "Stage"),
        readings(&[("2025-03-01T00:15:00Z", 2.5)]),
    );
    let c = client(t);
    let batch = c.fetch_readings(&ReadingsRequest {
        stations: vec![
            StationRef::new("E2534", "KINGS MILL"),
            StationRef::new("MISSING", "Nowhere"),
            StationRef::new("1029TH", "Bourton Dickler"),
        ],
        window: window(),
        measure: Some("flow".into()),
    });

    assert_eq!(
        batch.table.columns(),
        [
            "Kings Mill: Flow (Stage, m3/s)",
            "Bourton Dickler: Flow (Stage, m3/s)"
        ]
    );
    assert_eq!(batch.table.len(), 2);
    assert_eq!(batch.table.rows()[0].values, vec![Some(1.1), None]);
    assert_eq!(batch.table.rows()[1].values, vec![None, Some(2.5)]);
    assert_eq!(batch.info.len(), 2);

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].station.id, "MISSING");
    assert!(matches!(batch.failures[0].error, FloodError::HttpStatus { code: 404, .. }));
}

#[test]
fn empty_measure_among_several_is_listed_not_dropped() {
    let c = client(kings_mill(&[]));
    let got = c.get_station_readings("E2534", &window(), None).unwrap();
    assert_eq!(got.table.columns(), ["level"]);
    assert_eq!(got.empty, ["flow"]);
    assert!(!got.info.contains_key("flow"));
}

#[test]
fn batch_lists_empty_measures_once_per_station() {
    let c = client(kings_mill(&[]));
    let batch = c.fetch_readings(&ReadingsRequest {
        stations: vec![
            StationRef::new("E2534", "KINGS MILL"),
            StationRef::new("1029TH", "Bourton Dickler"),
            StationRef::new("E2534", "KINGS MILL"),
        ],
        window: window(),
        measure: None,
    });

    // The repeated station is fetched once, so no "(2)" column appears.
    assert_eq!(batch.table.columns(), ["Kings Mill: Level (Stage, mASD)"]);
    assert_eq!(batch.empty.len(), 1);
    assert_eq!(batch.empty[0].station.id, "E2534");
    assert_eq!(batch.empty[0].measure, "flow");
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].station.id, "1029TH");
}

#[test]
fn unreadable_api_timestamp_is_a_malformed_response() {
    let c = client(kings_mill(&[("yesterday", 1.0)]));
    let err = c
        .get_station_readings("E2534", &window(), Some("flow"))
        .unwrap_err();
    match err {
        FloodError::MalformedResponse { url: u, reason } => {
            assert_eq!(u, url(&readings_path("E2534", "flow", "Stage")));
            assert!(reason.contains("timestamp"), "{reason}");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[test]
fn two_sensors_for_one_parameter_keep_their_own_units() {
    let t = with_station(
        FixtureTransport::new(),
        "E2534",
        "KINGS MILL",
        &[("level", "Stage", "mASD"), ("level", "Downstream", "mAOD")],
    )
    .with(
        &readings_path("E2534", "level", "Stage"),
        readings(&[("2025-03-01T00:00:00Z", 0.41)]),
    )
    .with(
        &readings_path("E2534", "level", "Downstream"),
        readings(&[("2025-03-01T00:15:00Z", 12.7)]),
    );
    let c = client(t);
    let got = c.get_station_readings("E2534", &window(), None).unwrap();

    assert_eq!(got.table.columns(), ["level (Stage)", "level (Downstream)"]);
    assert_eq!(got.info["level (Stage)"].unit, "mASD");
    assert_eq!(got.info["level (Stage)"].qualifier, "Stage");
    assert_eq!(got.info["level (Downstream)"].unit, "mAOD");
    assert_eq!(got.info["level (Downstream)"].qualifier, "Downstream");
    assert_eq!(got.table.rows()[0].values, vec![Some(0.41), None]);
    assert_eq!(got.table.rows()[1].values, vec![None, Some(12.7)]);
}
