//! diamond — end-to-end demo of the rq routing crates.
//!
//! Builds a small two-way street network from an embedded edge list,
//! applies a traffic feed, then runs a single-pair route, a multi-stop
//! route, and a transport allocation.  Results are printed as JSON and
//! written to CSV under `output/diamond`.
//!
//! ```text
//! diamond [config.json] [output-dir]
//! ```
//!
//! Set `RUST_LOG=debug` to follow training.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use rq_logistics::{AllocatorConfig, LogisticsDestination, LogisticsRequest, TransportOptimizer};
use rq_network::{TrafficClassifier, load_network_reader, load_readings_reader};
use rq_output::{CsvWriter, ResultRecorder};
use rq_planner::{PlanError, PlannerConfig, RouteResult, RoutePlanner};

// ── Embedded data ─────────────────────────────────────────────────────────────

// Diamond A-B-D / A-C-D with a tail D-E, every street two-way.
const NETWORK_CSV: &str = "\
edge_id,from,to,name,speed,length\n\
ab,A,B,AB,10,100\n\
ab,B,A,AB,10,100\n\
ac,A,C,AC,10,120\n\
ac,C,A,AC,10,120\n\
bd,B,D,BD,10,100\n\
bd,D,B,BD,10,100\n\
cd,C,D,CD,10,80\n\
cd,D,C,CD,10,80\n\
de,D,E,DE,,150\n\
de,E,D,DE,,150\n\
";

// AB is congested; CD has only partial data.
const TRAFFIC_CSV: &str = "\
edge_id,mean_speed,occupancy,vehicle_count\n\
ab,2.5,70,40\n\
cd,,20,\n\
";

const DEFAULT_OUTPUT_DIR: &str = "output/diamond";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoConfig {
    planner:   PlannerConfig,
    allocator: AllocatorConfig,
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Print a street-not-found hint from the network's street index.
fn report_missing(planner: &RoutePlanner, err: &PlanError) {
    if let Some(street) = err.missing_street() {
        let hints = planner.network().streets().suggest(street, 5);
        if !hints.is_empty() {
            eprintln!("  did you mean: {}", hints.join(", "));
        }
    }
}

fn print_route(title: &str, planner: &RoutePlanner, route: &RouteResult) -> Result<()> {
    println!("── {title} ──");
    println!("  nodes   : {}", route.labels(planner.network()).join(" → "));
    println!("  streets : {}", route.street_path.join(" → "));
    println!("  {:.0} m in {:.1} s", route.total_distance, route.total_time);
    println!("{}", serde_json::to_string_pretty(route)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_dir = args.next().map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);
    let config = load_config(config_path.as_deref())?;

    // 1. Network and traffic.
    let network = load_network_reader(Cursor::new(NETWORK_CSV))?;
    let readings = load_readings_reader(Cursor::new(TRAFFIC_CSV))?;
    let mut planner = RoutePlanner::new(network, config.planner)?;
    let changed = planner.apply_readings(&readings, &TrafficClassifier::default());
    info!(
        nodes = planner.network().node_count(),
        edges = planner.network().edge_count(),
        changed,
        "network ready"
    );

    std::fs::create_dir_all(&output_dir).with_context(|| format!("creating {}", output_dir.display()))?;
    let mut recorder = ResultRecorder::new(CsvWriter::new(&output_dir)?);

    // 2. Single pair.
    let t0 = Instant::now();
    match planner.find_route("AB", "DE") {
        Ok(route) => {
            print_route("AB → DE", &planner, &route)?;
            recorder.record_route(planner.network(), &route);
        }
        Err(e) => {
            eprintln!("AB → DE failed: {e}");
            report_missing(&planner, &e);
        }
    }

    // A misspelt street shows the suggestion path.
    if let Err(e) = planner.find_route("ab", "DE") {
        eprintln!("ab → DE failed: {e}");
        report_missing(&planner, &e);
    }

    // 3. Multi-stop.
    match planner.find_multi_stop_route("AB", &["CD", "DE"]) {
        Ok(route) => {
            print_route("AB → {CD, DE}", &planner, &route)?;
            recorder.record_route(planner.network(), &route);
        }
        Err(e) => eprintln!("multi-stop failed: {e}"),
    }

    // 4. Allocation priced by the planner.
    let sources = [LogisticsRequest::new("AB", 100.0)];
    let destinations = [LogisticsDestination::new("CD", 40.0), LogisticsDestination::new("DE", 80.0)];
    let mut optimizer = TransportOptimizer::new(&mut planner, config.allocator)?;
    let allocations = optimizer.optimize_allocation(&sources, &destinations)?;
    println!("── allocation ──");
    for a in &allocations {
        println!("  {} → {}: {}", a.source_street, a.dest_street, a.quantity);
    }
    println!("{}", serde_json::to_string_pretty(&allocations)?);
    recorder.record_allocations(&allocations);

    recorder.finish();
    if let Some(e) = recorder.take_error() {
        eprintln!("output error: {e}");
    }
    println!();
    println!(
        "{} routes written to {} in {:.2} s",
        recorder.routes_recorded(),
        output_dir.display(),
        t0.elapsed().as_secs_f64()
    );
    Ok(())
}
