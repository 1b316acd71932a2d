//! stop-assign: run the assignment engine against a JSON dataset.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stop_assign::assigner::AutoAssignRequest;
use stop_assign::config::EngineConfig;
use stop_assign::dataset::Dataset;
use stop_assign::model::{StopId, TechnicianId};
use stop_assign::traits::TechnicianDirectory;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = EngineConfig::from_env()?;
    let dataset = Dataset::load(&cli.data)?;
    let template = Dataset {
        technicians: Vec::new(),
        stops: Vec::new(),
        config: dataset.config.clone(),
        aliases: dataset.aliases.clone(),
    };
    let engine = dataset.into_engine(config)?;
    info!(path = %cli.data.display(), "Dataset loaded");

    let mutated = match cli.command {
        Command::Workload { technician } => {
            let id = TechnicianId::new(technician);
            let metrics = engine
                .workload(&id)
                .with_context(|| format!("technician {} not found", id))?;
            print_json(&metrics)?;
            false
        }
        Command::Balance { technician } => {
            let id = TechnicianId::new(technician);
            let tech = engine
                .directory()
                .technician(&id)
                .with_context(|| format!("technician {} not found", id))?;
            let result = engine.balance(&id, &tech.coverage_zones, &tech.coverage_counties);
            print_json(&result)?;
            false
        }
        Command::Clusters { technician } => {
            let previews = engine.preview_clusters(&AutoAssignRequest::new(technician))?;
            print_json(&previews)?;
            false
        }
        Command::AutoAssign {
            technician,
            max,
            zones,
            counties,
        } => {
            let mut request = AutoAssignRequest::new(technician);
            if !zones.is_empty() {
                request = request.zones(zones);
            }
            if !counties.is_empty() {
                request = request.counties(counties);
            }
            if let Some(max) = max {
                request = request.max_assignments(max);
            }
            let report = engine.auto_assign(&request)?;
            print_json(&report)?;
            report.assigned > 0
        }
        Command::Reassign { from, to, stops } => {
            let stop_ids: Vec<StopId> = stops.into_iter().map(StopId::new).collect();
            let report = engine.reassign_stops(
                &TechnicianId::new(from),
                &TechnicianId::new(to),
                &stop_ids,
            )?;
            print_json(&report)?;
            !report.reassigned.is_empty()
        }
        Command::Available { technician } => {
            let available = engine.list_available_technicians(&TechnicianId::new(technician))?;
            print_json(&available)?;
            false
        }
    };

    if mutated && cli.write {
        Dataset::from_engine(&engine, &template).save(&cli.data)?;
        info!(path = %cli.data.display(), "Dataset written");
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stop_assign=debug"));

    // Logs go to stderr so stdout stays parseable JSON.
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
