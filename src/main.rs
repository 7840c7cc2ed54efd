//! Clinic appointments dashboard
//!
//! Usage:
//!   clinic_dashboard [--csv PATH | --data-url URL] <COMMAND>
//!
//! Commands:
//!   serve      Serve the JSON API (default port 8080)
//!   analysis   Print metrics for a window against its prior period
//!   compare    Print a side-by-side comparison of two windows
//!   table      Print every record with overall statistics

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clinic_dashboard::{
    api::{create_rest_router, DashboardService},
    dashboard::{AnalysisQuery, ComparisonQuery},
    filter::UnitSelection,
    report,
    source::{DataSource, FileSource, HttpSource, Source, DEFAULT_DATA_URL},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "clinic_dashboard")]
#[command(about = "Appointment metrics with date/unit filters and period comparison")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// URL of the appointments CSV
    #[arg(long, global = true, env = "DASHBOARD_DATA_URL", default_value = DEFAULT_DATA_URL)]
    data_url: String,

    /// Read a local CSV instead of the URL
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Seconds a loaded dataset stays valid
    #[arg(long, global = true, env = "DASHBOARD_CACHE_TTL_SECS", default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Give up on the HTTP fetch after this many seconds
    #[arg(long, global = true, default_value_t = 10)]
    fetch_timeout_secs: u64,
}

#[derive(Args, Debug)]
struct UnitArgs {
    /// Comma-separated units; omit for all units
    #[arg(long, value_delimiter = ',')]
    units: Vec<String>,
}

impl UnitArgs {
    fn selection(&self) -> UnitSelection {
        self.units.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the REST API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Metrics for one window compared with the preceding window of equal length
    Analysis {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        units: UnitArgs,
    },
    /// Side-by-side metrics for two windows
    Compare {
        #[arg(long)]
        a_start: Option<NaiveDate>,
        #[arg(long)]
        a_end: Option<NaiveDate>,
        #[arg(long)]
        b_start: Option<NaiveDate>,
        #[arg(long)]
        b_end: Option<NaiveDate>,
        #[command(flatten)]
        units: UnitArgs,
    },
    /// Every record, newest first, with overall statistics
    Table {
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn build_source(args: &SourceArgs) -> Result<Source> {
    Ok(match &args.csv {
        Some(path) => Source::File(FileSource::new(path.clone())),
        None => Source::Http(HttpSource::new(
            &args.data_url,
            Duration::from_secs(args.fetch_timeout_secs),
        )?),
    })
}

fn print_banner(port: u16, source: &str) {
    println!("============================================================");
    println!("         CLINIC APPOINTMENTS DASHBOARD API");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  Data:     {}", source);
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/options             Units and date bounds");
    println!("  GET /api/v1/analysis            Window vs prior period");
    println!("  GET /api/v1/comparison          Period A vs period B");
    println!("  GET /api/v1/records             All records");
    println!("  GET /api/v1/summary             Overall statistics");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let cli = Cli::parse();
    let source = build_source(&cli.source)?;
    let source_label = source.describe();
    let service = Arc::new(DashboardService::new(
        source,
        Duration::from_secs(cli.source.cache_ttl_secs),
    ));

    match cli.command {
        Commands::Serve { port } => {
            print_banner(port, &source_label);
            let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
            let app = create_rest_router(service);
            info!("Starting REST server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
        Commands::Analysis { start, end, units } => {
            let query = AnalysisQuery {
                start,
                end,
                units: units.selection(),
            };
            let view = service.get_analysis(&query).await?;
            print!("{}", report::render_analysis(&view));
        }
        Commands::Compare {
            a_start,
            a_end,
            b_start,
            b_end,
            units,
        } => {
            let query = ComparisonQuery {
                a_start,
                a_end,
                b_start,
                b_end,
                units: units.selection(),
            };
            let view = service.get_comparison(&query).await?;
            print!("{}", report::render_comparison(&view));
        }
        Commands::Table { limit } => {
            let records = service.get_records(limit).await?;
            let summary = service.get_summary().await?;
            print!("{}", report::render_table(&records, &summary));
        }
    }

    Ok(())
}
