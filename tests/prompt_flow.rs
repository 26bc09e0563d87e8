mod common;

use chrono::{TimeZone, Utc};
use common::{FixtureTransport, client, envelope, measure_endpoint, readings, station, with_station};
use eaflood_rs::prompt::Session;
use serde_json::json;
use std::io::Cursor;

fn run(transport: FixtureTransport, input: &str) -> (String, Vec<String>) {
    let c = client(transport);
    let now = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();
    let mut session = Session::new(&c, Cursor::new(input.as_bytes()), Vec::new()).with_clock(now);
    session.run().unwrap();
    let out = String::from_utf8(session.into_output()).unwrap();
    (out, c.transport().requests())
}

fn kings_mill() -> FixtureTransport {
    with_station(
        FixtureTransport::new(),
        "E2534",
        "KINGS MILL",
        &[("flow", "Stage", "m3/s")],
    )
}

#[test]
fn static_commands_and_quit() {
    let (out, requests) = run(FixtureTransport::new(), "6\n7\nq\n");
    assert!(out.contains("Available commands:"));
    assert!(out.contains("mASD - Metres relative to the local stage datum"));
    assert!(out.contains("flow - "));
    assert!(out.trim_end().ends_with("Exiting..."));
    assert!(requests.is_empty());
}

#[test]
fn invalid_choice_then_end_of_input() {
    let (out, _) = run(FixtureTransport::new(), "9\n");
    assert!(out.contains("Invalid choice '9'"));
    assert!(out.contains("Exiting..."));
}

#[test]
fn readings_for_a_date_range_by_station_id() {
    let t = kings_mill().with(
        &format!(
            "{}/readings?startdate=2025-03-01&enddate=2025-03-03",
            measure_endpoint("E2534", "flow", "Stage")
        ),
        readings(&[("2025-03-01T00:00:00Z", 1.1), ("2025-03-01T00:15:00Z", 1.25)]),
    );
    let (out, _) = run(t, "3\n0\nE2534\n01-03-2025\n03-03-2025\nflow\n\nq\n");
    assert!(out.contains("Kings Mill: Flow (Stage, m3/s)"));
    assert!(out.contains("| 2025-03-01 00:15:00 |"));
    assert!(out.contains("1.250"));
    assert!(out.contains("unit m3/s, qualifier Stage"));
}

#[test]
fn last_24_hours_uses_since_query() {
    let since = format!(
        "{}/readings?since=2025-03-01T12:00:00Z",
        measure_endpoint("E2534", "flow", "Stage")
    );
    let t = kings_mill().with(&since, readings(&[("2025-03-02T06:00:00Z", 0.9)]));
    let (out, requests) = run(t, "2\n0\nE2534\n\nq\n");
    assert!(requests.contains(&since));
    assert!(out.contains("0.900"));
}

#[test]
fn bad_date_is_reported_and_menu_continues() {
    let (out, _) = run(kings_mill(), "3\n0\nE2534\n2025-03-01\n\n6\nq\n");
    assert!(out.contains("Error: "));
    assert!(out.contains("DD-MM-YYYY"));
    assert!(out.contains("Acronym Definitions:"));
}

#[test]
fn partial_name_match_lets_the_user_pick() {
    let t = FixtureTransport::new()
        .with(
            "id/stations?search=Mill",
            envelope(json!([station("E2534", "Kings Mill"), station("E9999", "Mill Lane")])),
        )
        .with("id/stations/E2534", envelope(station("E2534", "Kings Mill")));
    let (out, requests) = run(t, "5\n1\nMill\n1\nq\n");
    assert!(out.contains("0. All listed stations"));
    assert!(out.contains("2. Mill Lane (E9999)"));
    assert!(out.contains("Station (E2534) Information:"));
    assert!(out.contains("\tRivername - River Test"));
    assert!(!requests.iter().any(|u| u.ends_with("id/stations/E9999")));
}

#[test]
fn unmatched_name_can_stop_the_search() {
    let t = FixtureTransport::new().with("id/stations?search=Nowhere", envelope(json!([])));
    let (out, _) = run(t, "4\n1\nNowhere\nno\nq\n");
    assert!(out.contains("Could not find station Nowhere"));
    assert!(out.contains("Stopping station search."));
}

#[test]
fn station_measures_are_listed() {
    let (out, _) = run(kings_mill(), "4\n0\nE2534\nq\n");
    assert!(out.contains("Available Measures at Kings Mill:"));
    assert!(out.contains("\tflow (Qualifier: Stage, Unit: m3/s)"));
}

#[test]
fn empty_measure_is_named_and_repeated_ids_fetch_once() {
    let since = |p: &str| {
        format!(
            "{}/readings?since=2025-03-01T12:00:00Z",
            measure_endpoint("E2534", p, "Stage")
        )
    };
    let t = with_station(
        FixtureTransport::new(),
        "E2534",
        "KINGS MILL",
        &[("flow", "Stage", "m3/s"), ("level", "Stage", "mASD")],
    )
    .with(&since("flow"), readings(&[]))
    .with(&since("level"), readings(&[("2025-03-02T06:00:00Z", 0.41)]));
    let (out, requests) = run(t, "2\n0\nE2534;E2534\n\nq\n");
    assert!(out.contains("No readings found for flow at station KINGS MILL (E2534)"));
    assert!(out.contains("Kings Mill: Level (Stage, mASD)"));
    assert!(!out.contains("mASD) (2)"));
    assert_eq!(requests.iter().filter(|u| **u == since("level")).count(), 1);
}
