use chrono::{TimeZone, Utc};
use eaflood_rs::models::Reading;
use eaflood_rs::readings::ReadingTable;
use eaflood_rs::summary::column_summary;

fn series(label: &str, points: &[(u32, f64)]) -> ReadingTable {
    let readings: Vec<Reading> = points
        .iter()
        .map(|&(h, value)| Reading {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, h, 0, 0).unwrap(),
            value,
        })
        .collect();
    ReadingTable::from_readings(label, &readings)
}

#[test]
fn summary_handles_missing_and_median_even_odd() {
    // "flow" has four values, median (2+3)/2; "level" has three and one gap.
    let flow = series("flow", &[(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)]);
    let level = series("level", &[(0, 10.0), (2, 30.0), (3, 20.0)]);
    let table = flow.outer_join(level);

    let s = column_summary(&table);
    assert_eq!(s.len(), 2);

    assert_eq!(s[0].column, "flow");
    assert_eq!(s[0].count, 4);
    assert_eq!(s[0].missing, 0);
    assert_eq!(s[0].median, Some(2.5));
    assert_eq!(s[0].mean, Some(2.5));

    assert_eq!(s[1].column, "level");
    assert_eq!(s[1].count, 3);
    assert_eq!(s[1].missing, 1);
    assert_eq!(s[1].min, Some(10.0));
    assert_eq!(s[1].max, Some(30.0));
    assert_eq!(s[1].median, Some(20.0));
}

#[test]
fn empty_table_has_no_summaries() {
    assert!(column_summary(&ReadingTable::default()).is_empty());
}
