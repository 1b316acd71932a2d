//! CLI argument parsing for the stop-assign binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stop-assign", about = "Cluster-aware stop assignment for field technicians")]
pub struct Cli {
    /// Dataset file holding technicians and stops
    #[arg(long, short)]
    pub data: PathBuf,

    /// Persist changes made by mutating commands back to the dataset
    #[arg(long)]
    pub write: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a technician's current workload
    Workload { technician: String },
    /// Show the balanced target for a technician
    Balance { technician: String },
    /// Preview the clusters auto-assignment would walk
    Clusters { technician: String },
    /// Assign nearby unassigned stops to a technician
    AutoAssign {
        technician: String,
        /// Cap on stops assigned in this run
        #[arg(long)]
        max: Option<usize>,
        /// Override the technician's zones
        #[arg(long = "zone")]
        zones: Vec<String>,
        /// Override the technician's counties
        #[arg(long = "county")]
        counties: Vec<String>,
    },
    /// Move specific stops between technicians
    Reassign {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(required = true)]
        stops: Vec<String>,
    },
    /// List peers of a technician by spare capacity
    Available { technician: String },
}
