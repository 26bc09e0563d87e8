//! eaflood_rs
//!
//! A small Rust library for the Environment Agency real-time flood-monitoring
//! API. Pairs with the `eaflood` CLI.
//!
//! ### Features
//! - Resolve monitoring stations by id, by name, or at random
//! - List the measures a station records and validate measure names
//! - Fetch readings for a date window into a timestamp-indexed table,
//!   one column per measure, outer-joined across stations
//! - Save as CSV or JSON, print summary statistics
//! - Generate SVG/PNG line charts, stacked per measure or overlaid
//!
//! ### Example
//! ```no_run
//! use chrono::Utc;
//! use eaflood_rs::{Client, DateWindow, ReadingsRequest};
//!
//! let client: Client = Client::default();
//! let station = client.station_ref("E2534")?;
//! let batch = client.fetch_readings(&ReadingsRequest {
//!     stations: vec![station],
//!     window: DateWindow::last_hours(Utc::now(), 24),
//!     measure: Some("flow".into()),
//! });
//! eaflood_rs::storage::save_csv(&batch.table, "kings_mill.csv")?;
//! eaflood_rs::viz::plot_readings(&batch.table, &batch.info, "kings_mill.svg")?;
//! for s in eaflood_rs::summary::column_summary(&batch.table) {
//!     println!("{:?}", s);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod batch;
pub mod catalog;
pub mod endpoint;
pub mod error;
pub mod menu;
pub mod models;
pub mod prompt;
pub mod readings;
pub mod stations;
pub mod storage;
pub mod style;
pub mod summary;
pub mod table;
pub mod time;
pub mod viz;

pub use api::{BASE_URL, Client, ClientConfig, HttpTransport, Transport};
pub use batch::{BatchReadings, EmptyMeasure, ReadingsRequest, StationFailure};
pub use error::{FloodError, Result};
pub use models::{
    DateWindow, MeasureDescriptor, MeasureInfo, MeasureParameter, MeasurementInfo, Reading,
    StationRef,
};
pub use readings::{ReadingTable, StationReadings};
pub use stations::NameMatch;
