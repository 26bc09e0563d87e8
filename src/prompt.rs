//! Interactive prompt workflows behind the `interactive` subcommand.
//!
//! A [`Session`] reads answers from any `BufRead` and writes to any `Write`,
//! so the whole menu runs headlessly in tests. Every command reports its
//! own failures and returns to the menu; only I/O errors end the session.

use crate::api::{Client, Transport};
use crate::batch::ReadingsRequest;
use crate::catalog::UNIT_ACRONYMS;
use crate::menu::MenuCommand;
use crate::models::{DateWindow, MeasureParameter, StationRef};
use crate::stations::{NameMatch, title_case_station, unique_stations};
use crate::table::{MAX_PRINT_ROWS, render_readings, render_stations};
use crate::time::parse_user_date;
use crate::viz::{self, ChartOptions};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Split `"a; b,c"` into trimmed, non-empty parts.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

pub fn acronyms_text() -> String {
    let mut out = String::from("Acronym Definitions:\n");
    for (key, value) in UNIT_ACRONYMS {
        out.push_str(&format!("{key} - {value}\n"));
    }
    out
}

pub fn measure_types_text() -> String {
    let mut out = String::from("Measures:\n");
    for p in MeasureParameter::ALL {
        out.push_str(&format!("{} - {}\n", p, p.description()));
    }
    out
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "yes" | "y")
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct Session<'a, T: Transport, R: BufRead, W: Write> {
    client: &'a Client<T>,
    input: R,
    out: W,
    eof: bool,
    now: Option<DateTime<Utc>>,
    pub max_rows: usize,
    pub chart: ChartOptions,
}

impl<'a, T: Transport, R: BufRead, W: Write> Session<'a, T, R, W> {
    pub fn new(client: &'a Client<T>, input: R, out: W) -> Self {
        Self {
            client,
            input,
            out,
            eof: false,
            now: None,
            max_rows: MAX_PRINT_ROWS,
            chart: ChartOptions::default(),
        }
    }

    /// Pin "now" for the last-24-hours window instead of reading the clock.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Print `prompt` and read one trimmed line; end of input reads as "".
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
        }
        Ok(line.trim().to_string())
    }

    /// Menu loop until the user quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        while !self.eof {
            write!(self.out, "{}", MenuCommand::render_menu())?;
            let choice = self.ask("Enter your choice: ")?;
            if self.eof && choice.is_empty() {
                break;
            }
            match MenuCommand::from_key(&choice) {
                Some(MenuCommand::Quit) => break,
                Some(cmd) => self.dispatch(cmd)?,
                None => writeln!(self.out, "Invalid choice '{choice}', please try again.")?,
            }
        }
        writeln!(self.out, "Exiting...")?;
        Ok(())
    }

    pub fn dispatch(&mut self, cmd: MenuCommand) -> Result<()> {
        match cmd {
            MenuCommand::SearchStations => self.search_stations(),
            MenuCommand::ReadingsLast24Hours => self.readings(true, true),
            MenuCommand::Readings => self.readings(false, false),
            MenuCommand::StationMeasures => self.station_measures(),
            MenuCommand::StationInfo => self.station_info(),
            MenuCommand::Acronyms => {
                writeln!(self.out, "\n{}", acronyms_text())?;
                Ok(())
            }
            MenuCommand::MeasureTypes => {
                writeln!(self.out, "\n{}", measure_types_text())?;
                Ok(())
            }
            MenuCommand::Quit => Ok(()),
        }
    }

    fn search_stations(&mut self) -> Result<()> {
        let query = self.ask("Enter station name or keyword: ")?;
        match self.client.search_stations_by_name(&query) {
            Ok(found) if found.is_empty() => {
                writeln!(self.out, "No stations match '{query}'.")?
            }
            Ok(found) => writeln!(self.out, "\nMatching Stations:\n{}", render_stations(&found))?,
            Err(e) => writeln!(self.out, "Error: {e}")?,
        }
        Ok(())
    }

    fn random_station(&mut self) -> Result<Vec<StationRef>> {
        match self.client.random_station(&mut rand::rng()) {
            Ok(s) => {
                writeln!(
                    self.out,
                    "\tRandomly chosen station: {} (id: {})",
                    title_case_station(&s.name),
                    s.id
                )?;
                Ok(vec![s])
            }
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                Ok(Vec::new())
            }
        }
    }

    /// Ask for stations by id or by name; an empty answer picks one at random.
    fn choose_stations(&mut self) -> Result<Vec<StationRef>> {
        let mode = self.ask("\nPress 0 to use station id(s). Press 1 to use station name(s): ")?;
        match mode.as_str() {
            "0" => {
                let input = self.ask(
                    "\nEnter station ID (optional, press Enter for random station.\nUse ; to separate multiple station ids): ",
                )?;
                if input.is_empty() {
                    return self.random_station();
                }
                let mut stations = Vec::new();
                for id in parse_list(&input) {
                    match self.client.station_ref(&id) {
                        Ok(s) => stations.push(s),
                        Err(e) => writeln!(self.out, "Error: {e}")?,
                    }
                }
                Ok(unique_stations(stations))
            }
            "1" => {
                let input = self.ask(
                    "\nEnter station name (optional, press Enter for random station.\nUse ; to separate multiple station names): ",
                )?;
                if input.is_empty() {
                    return self.random_station();
                }
                self.stations_from_names(&parse_list(&input))
            }
            _ => {
                writeln!(self.out, "Invalid choice, please choose from 0 or 1 only!")?;
                Ok(Vec::new())
            }
        }
    }

    fn stations_from_names(&mut self, names: &[String]) -> Result<Vec<StationRef>> {
        let mut stations = Vec::new();
        for name in names {
            writeln!(self.out, "Searching station name '{name}'...")?;
            let resolved = match self.client.resolve_station_name(name) {
                Ok(r) => r,
                Err(e) => {
                    writeln!(self.out, "Error: {e}")?;
                    continue;
                }
            };
            match resolved {
                NameMatch::Exact(found) => stations.extend(found),
                NameMatch::NoMatch => {
                    let answer = self.ask(&format!(
                        "Could not find station {name}. Do you wish to continue (yes/no): "
                    ))?;
                    if !is_yes(&answer) {
                        writeln!(self.out, "Stopping station search.")?;
                        break;
                    }
                }
                NameMatch::Partial(found) => {
                    writeln!(
                        self.out,
                        "Could not find explicit match for station: '{name}'. Please select one of the following:"
                    )?;
                    writeln!(self.out, "\t0. All listed stations")?;
                    for (i, s) in found.iter().enumerate() {
                        writeln!(self.out, "\t{}. {} ({})", i + 1, s.name, s.id)?;
                    }
                    let picks =
                        self.ask("\nEnter your selection (use ; to select multiple indices): ")?;
                    for pick in parse_list(&picks) {
                        match pick.parse::<usize>() {
                            Ok(0) => stations.extend(found.iter().cloned()),
                            Ok(i) if i <= found.len() => stations.push(found[i - 1].clone()),
                            _ => writeln!(self.out, "Ignoring invalid selection '{pick}'")?,
                        }
                    }
                }
            }
        }
        Ok(unique_stations(stations))
    }

    fn ask_window(&mut self) -> Result<Option<DateWindow>> {
        let start = self.ask("Enter start date (DD-MM-YYYY) (optional, press Enter for previous 24 hours): ")?;
        let end = self.ask("Enter end date (DD-MM-YYYY) (optional, press Enter for current date-time): ")?;
        if start.is_empty() {
            return Ok(Some(DateWindow::last_hours(self.now(), 24)));
        }
        let parsed = parse_user_date(&start).and_then(|s| {
            if end.is_empty() {
                Ok(DateWindow::since(s))
            } else {
                parse_user_date(&end).map(|e| DateWindow::between(s, e))
            }
        });
        match parsed {
            Ok(w) => Ok(Some(w)),
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                Ok(None)
            }
        }
    }

    fn readings(&mut self, last_24_hours: bool, all_measures: bool) -> Result<()> {
        let stations = self.choose_stations()?;
        if stations.is_empty() {
            writeln!(self.out, "No stations selected.")?;
            return Ok(());
        }
        let window = if last_24_hours {
            DateWindow::last_hours(self.now(), 24)
        } else {
            match self.ask_window()? {
                Some(w) => w,
                None => return Ok(()),
            }
        };
        let measure = if all_measures {
            None
        } else {
            Some(self.ask("Enter measure type (optional, press Enter to fetch all): ")?)
                .filter(|m| !m.is_empty())
        };

        let batch = self.client.fetch_readings(&ReadingsRequest {
            stations,
            window,
            measure,
        });
        for f in &batch.failures {
            writeln!(
                self.out,
                "Error fetching station {} ({}) readings: {}",
                f.station.name, f.station.id, f.error
            )?;
        }
        for e in &batch.empty {
            writeln!(
                self.out,
                "No readings found for {} at station {} ({})",
                e.measure, e.station.name, e.station.id
            )?;
        }
        if batch.table.is_empty() {
            writeln!(self.out, "\nNo data available for the specified station(s).")?;
            return Ok(());
        }

        writeln!(self.out, "\n{}", render_readings(&batch.table, self.max_rows))?;
        if batch.table.len() > self.max_rows {
            writeln!(
                self.out,
                "({} of {} rows shown)",
                self.max_rows,
                batch.table.len()
            )?;
        }
        for (label, meta) in &batch.info {
            writeln!(self.out, "{label}: unit {}, qualifier {}", meta.unit, meta.qualifier)?;
        }

        let path = self.ask("Save a chart of the data? Enter a .png or .svg path (press Enter to skip): ")?;
        if !path.is_empty() {
            let path = PathBuf::from(path);
            match viz::plot_readings_with(&batch.table, &batch.info, &path, &self.chart) {
                Ok(()) => writeln!(self.out, "Wrote plot to {}", path.display())?,
                Err(e) => writeln!(self.out, "Error: {e}")?,
            }
        }
        Ok(())
    }

    fn station_measures(&mut self) -> Result<()> {
        for station in self.choose_stations()? {
            match self.client.get_station_measures(&station.id) {
                Ok(measures) => {
                    writeln!(self.out, "\nAvailable Measures at {}:", title_case_station(&station.name))?;
                    for m in measures {
                        writeln!(
                            self.out,
                            "\t{} (Qualifier: {}, Unit: {})",
                            m.parameter, m.qualifier, m.unit
                        )?;
                    }
                }
                Err(e) => writeln!(self.out, "Error fetching station measures: {e}")?,
            }
        }
        Ok(())
    }

    fn station_info(&mut self) -> Result<()> {
        for station in self.choose_stations()? {
            let text = match self.client.get_station_info(&station.id) {
                Ok(records) => station_info_text(&station.id, &records),
                Err(e) => format!("Error fetching station information: {e}\n"),
            };
            write!(self.out, "{text}")?;
        }
        Ok(())
    }
}

/// Human-readable dump of a station record, skipping `@id` and listing
/// measures by parameter.
pub fn station_info_text(station_id: &str, records: &[Value]) -> String {
    let rule = "-".repeat(30);
    let mut out = format!("\n{rule}\nStation ({station_id}) Information:\n");
    if let Some(Value::Object(map)) = records.first() {
        for (key, value) in map {
            if key == "@id" {
                continue;
            }
            if key == "measures" {
                let params: Vec<String> = match value {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|m| m.get("parameter").map(display_value))
                        .collect(),
                    Value::Object(_) => value.get("parameter").map(display_value).into_iter().collect(),
                    _ => Vec::new(),
                };
                out.push_str(&format!("\tMeasures: {}\n", params.join(", ")));
            } else {
                out.push_str(&format!("\t{} - {}\n", title_case_station(key), display_value(value)));
            }
        }
    }
    out.push_str(&rule);
    out.push('\n');
    out
}
