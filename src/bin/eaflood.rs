use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use eaflood_rs::prompt::{self, Session, parse_list};
use eaflood_rs::stations::{title_case_station, unique_stations};
use eaflood_rs::table::{MAX_PRINT_ROWS, render_readings, render_stations};
use eaflood_rs::time::parse_user_date;
use eaflood_rs::viz::{ChartOptions, PlotLayout};
use eaflood_rs::{
    BASE_URL, Client, ClientConfig, DateWindow, NameMatch, ReadingsRequest, StationRef,
};
use eaflood_rs::{storage, summary, viz};
use env_logger::Env;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "eaflood",
    version,
    about = "Query Environment Agency flood-monitoring stations, measures and readings"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// API root, for testing against a local server.
    #[arg(long, global = true, hide = true, default_value = BASE_URL)]
    base_url: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search stations by name or keyword.
    Search {
        /// Name or keyword, e.g. "Kings Mill"
        query: String,
    },
    /// Print station information.
    Info(StationArgs),
    /// List the measures recorded at a station.
    Measures(StationArgs),
    /// Fetch readings (and optionally save, plot, and print stats).
    Readings(ReadingsArgs),
    /// Print unit acronym definitions.
    Acronyms,
    /// Print measure type descriptions.
    MeasureTypes,
    /// Run the interactive menu.
    Interactive,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Layout {
    Stacked,
    Overlay,
}

impl From<Layout> for PlotLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Stacked => PlotLayout::Stacked,
            Layout::Overlay => PlotLayout::Overlay,
        }
    }
}

#[derive(Args, Debug)]
struct StationArgs {
    /// Station ids separated by comma or semicolon (e.g., E2534;1029TH)
    #[arg(short, long)]
    station: Option<String>,
    /// Station names separated by comma or semicolon
    #[arg(short, long)]
    name: Option<String>,
    /// Pick one station at random.
    #[arg(long, default_value_t = false)]
    random: bool,
}

#[derive(Args, Debug)]
struct ReadingsArgs {
    #[command(flatten)]
    stations: StationArgs,
    /// Start date (DD-MM-YYYY). Defaults to the previous 24 hours.
    #[arg(long)]
    start: Option<String>,
    /// End date (DD-MM-YYYY). Defaults to now.
    #[arg(long)]
    end: Option<String>,
    /// Measure type (level, flow, wind, temperature). Defaults to all.
    #[arg(short, long)]
    measure: Option<String>,
    /// Number of rows to print (default 30).
    #[arg(long, default_value_t = MAX_PRINT_ROWS)]
    rows: usize,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (0 sizes stacked charts per panel).
    #[arg(long, default_value_t = 0)]
    height: u32,
    #[arg(long, value_enum, default_value = "stacked")]
    layout: Layout,
    /// TrueType font for chart text.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Print per-column statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Up to 4 decimals without trailing zeros.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default_filter = format!("eaflood_rs={level},eaflood={level}");
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let client = Client::from_config(&ClientConfig {
        base_url: cli.base_url.clone(),
        ..ClientConfig::default()
    })
    .context("build HTTP client")?;
    match cli.cmd {
        Command::Search { query } => cmd_search(&client, &query),
        Command::Info(args) => cmd_info(&client, &args),
        Command::Measures(args) => cmd_measures(&client, &args),
        Command::Readings(args) => cmd_readings(&client, &args),
        Command::Acronyms => {
            print!("{}", prompt::acronyms_text());
            Ok(())
        }
        Command::MeasureTypes => {
            print!("{}", prompt::measure_types_text());
            Ok(())
        }
        Command::Interactive => {
            let stdin = io::stdin();
            Session::new(&client, stdin.lock(), io::stdout()).run()
        }
    }
}

fn resolve_stations(client: &Client, args: &StationArgs) -> Result<Vec<StationRef>> {
    let mut stations = Vec::new();
    if let Some(ids) = &args.station {
        for id in parse_list(ids) {
            match client.station_ref(&id) {
                Ok(s) => stations.push(s),
                Err(e) => eprintln!("Error: {e}, skipping"),
            }
        }
    }
    if let Some(names) = &args.name {
        for name in parse_list(names) {
            match client.resolve_station_name(&name) {
                Ok(NameMatch::Exact(found)) => stations.extend(found),
                Ok(NameMatch::Partial(found)) if found.len() == 1 => stations.extend(found),
                Ok(NameMatch::Partial(found)) => {
                    eprintln!("Station name '{name}' is ambiguous; candidates:");
                    eprintln!("{}", render_stations(&found));
                    bail!("refine --name or pass --station with one of the ids above");
                }
                Ok(NameMatch::NoMatch) => eprintln!("Could not find station {name}, skipping"),
                Err(e) => eprintln!("Error looking up station {name}: {e}, skipping"),
            }
        }
    }
    if args.random {
        match client.random_station(&mut rand::rng()) {
            Ok(s) => {
                eprintln!(
                    "Randomly chosen station: {} (id: {})",
                    title_case_station(&s.name),
                    s.id
                );
                stations.push(s);
            }
            Err(e) => eprintln!("Error picking a random station: {e}"),
        }
    }
    let stations = unique_stations(stations);
    if stations.is_empty() {
        bail!("no stations selected; use --station, --name or --random");
    }
    Ok(stations)
}

fn cmd_search(client: &Client, query: &str) -> Result<()> {
    let found = client.search_stations_by_name(query)?;
    if found.is_empty() {
        println!("No stations match '{query}'.");
    } else {
        println!("{}", render_stations(&found));
    }
    Ok(())
}

/// Run `show` for each station, reporting failures and carrying on.
fn for_each_station<F>(client: &Client, args: &StationArgs, what: &str, mut show: F) -> Result<()>
where
    F: FnMut(&StationRef) -> eaflood_rs::Result<()>,
{
    let stations = resolve_stations(client, args)?;
    let mut failed = 0;
    for station in &stations {
        if let Err(e) = show(station) {
            eprintln!("Error fetching station {} ({}) {what}: {e}", station.name, station.id);
            failed += 1;
        }
    }
    if failed == stations.len() {
        bail!("no {what} available for the specified station(s)");
    }
    Ok(())
}

fn cmd_info(client: &Client, args: &StationArgs) -> Result<()> {
    for_each_station(client, args, "info", |station| {
        let records = client.get_station_info(&station.id)?;
        print!("{}", prompt::station_info_text(&station.id, &records));
        Ok(())
    })
}

fn cmd_measures(client: &Client, args: &StationArgs) -> Result<()> {
    for_each_station(client, args, "measures", |station| {
        let measures = client.get_station_measures(&station.id)?;
        println!(
            "Available Measures at {} ({}):",
            title_case_station(&station.name),
            station.id
        );
        for m in measures {
            println!("\t{} (Qualifier: {}, Unit: {})", m.parameter, m.qualifier, m.unit);
        }
        Ok(())
    })
}

fn parse_window(start: Option<&str>, end: Option<&str>) -> Result<DateWindow> {
    Ok(match (start, end) {
        (None, None) => DateWindow::last_hours(Utc::now(), 24),
        (None, Some(_)) => bail!("--end requires --start"),
        (Some(s), None) => DateWindow::since(parse_user_date(s)?),
        (Some(s), Some(e)) => DateWindow::between(parse_user_date(s)?, parse_user_date(e)?),
    })
}

fn cmd_readings(client: &Client, args: &ReadingsArgs) -> Result<()> {
    let window = parse_window(args.start.as_deref(), args.end.as_deref())?;
    let stations = resolve_stations(client, &args.stations)?;
    let batch = client.fetch_readings(&ReadingsRequest {
        stations,
        window,
        measure: args.measure.clone(),
    });
    for f in &batch.failures {
        eprintln!(
            "Error fetching station {} ({}) readings: {}",
            f.station.name, f.station.id, f.error
        );
    }
    for e in &batch.empty {
        eprintln!(
            "No readings found for {} at station {} ({})",
            e.measure, e.station.name, e.station.id
        );
    }
    if batch.table.is_empty() {
        bail!("no data available for the specified station(s)");
    }

    println!("{}", render_readings(&batch.table, args.rows));
    for (label, meta) in &batch.info {
        println!("{label}: unit {}, qualifier {}", meta.unit, meta.qualifier);
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&batch.table, path)?,
            "json" => storage::save_json(&batch.table, &batch.info, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", batch.table.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let opts = ChartOptions {
            width: args.width,
            height: args.height,
            layout: args.layout.into(),
            title: None,
            font: args.font.clone(),
        };
        viz::plot_readings_with(&batch.table, &batch.info, plot_path, &opts)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        for s in summary::column_summary(&batch.table) {
            println!(
                "{}  count={} missing={}  min={} max={} mean={} median={}",
                s.column,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}
