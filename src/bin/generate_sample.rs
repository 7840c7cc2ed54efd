//! Sample data generator for the clinic dashboard
//!
//! Writes a CSV with the same columns as the published appointments file, so the
//! dashboard can run offline with `--csv`.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --start <DATE>        First appointment date (default: 2024-01-01)
//!   --days <N>            Number of days to cover (default: 30)
//!   --per-day <N>         Max appointments per day (default: 12)
//!   --null-rate <F>       Probability of an empty return cell (default: 0.1)
//!   --seed <N>            Random seed for reproducibility (optional)
//!   --output <PATH>       Output CSV path (default: data/consultas.csv)

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use clinic_dashboard::models::{Appointment, CsvRecord};
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

/// Synthetic appointment generator
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate synthetic clinic appointment data")]
struct Args {
    /// First appointment date
    #[arg(long, default_value = "2024-01-01")]
    start: NaiveDate,

    /// Number of days to cover
    #[arg(long, default_value = "30")]
    days: i64,

    /// Maximum appointments per day
    #[arg(long, default_value = "12")]
    per_day: usize,

    /// Probability of leaving the return column empty (0.0 - 1.0)
    #[arg(long, default_value = "0.1")]
    null_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/consultas.csv")]
    output: PathBuf,
}

const UNITS: &[&str] = &[
    "Unidade Centro",
    "Unidade Norte",
    "Unidade Sul",
    "Unidade Leste",
];

/// Specialty with its typical fee and return interval in days
const SPECIALTIES: &[(&str, f64, f64)] = &[
    ("Clínico Geral", 150.0, 30.0),
    ("Cardiologia", 320.0, 60.0),
    ("Pediatria", 200.0, 30.0),
    ("Dermatologia", 260.0, 45.0),
    ("Ortopedia", 280.0, 21.0),
];

fn generate(args: &Args, rng: &mut StdRng) -> Vec<Appointment> {
    let mut appointments = Vec::new();
    for offset in 0..args.days.max(0) {
        let date = args.start + Duration::days(offset);
        let count = rng.gen_range(0..=args.per_day);
        for _ in 0..count {
            let unit = UNITS.choose(rng).copied().unwrap_or(UNITS[0]);
            let (specialty, fee, interval) =
                SPECIALTIES.choose(rng).copied().unwrap_or(SPECIALTIES[0]);

            let amount = (fee * rng.gen_range(0.8..1.2) * 100.0).round() / 100.0;
            let return_days = if rng.gen_bool(args.null_rate.clamp(0.0, 1.0)) {
                None
            } else {
                Some((interval * rng.gen_range(0.5..1.5)).round())
            };

            appointments.push(Appointment {
                date,
                unit: unit.to_string(),
                specialty: specialty.to_string(),
                amount,
                return_days,
            });
        }
    }
    appointments
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let appointments = generate(&args, &mut rng);
    info!(
        "Generated {} appointments over {} days",
        appointments.len(),
        args.days
    );

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)
        .with_context(|| format!("failed to open {}", args.output.display()))?;
    for appointment in &appointments {
        writer.serialize(CsvRecord::from(appointment))?;
    }
    writer.flush()?;

    info!("Wrote {:?}", args.output);
    Ok(())
}
