//! Naming candidate inspection.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lifecycle_core::error::AppError;
use lifecycle_hooks::naming;

use crate::output::{self, OutputFormat};

/// Arguments for `candidates`
#[derive(Debug, Args)]
pub struct CandidatesArgs {
    /// Lifecycle point names
    #[arg(required = true)]
    pub points: Vec<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct CandidateRow {
    point: String,
    /// Probe order, starting at 1.
    rank: usize,
    candidate: String,
}

pub fn execute(args: &CandidatesArgs, format: OutputFormat) -> Result<(), AppError> {
    let rows: Vec<CandidateRow> = args
        .points
        .iter()
        .flat_map(|point| {
            naming::candidates(point)
                .into_iter()
                .enumerate()
                .map(move |(i, candidate)| CandidateRow {
                    point: point.clone(),
                    rank: i + 1,
                    candidate,
                })
        })
        .collect();

    output::print_rows(&rows, format)
}
