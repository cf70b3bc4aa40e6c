//! Binary replaying captured response messages through `gremwire`.
//!
//! Parses CLI arguments, feeds each message file to a fresh pipeline and
//! prints the aggregated state of every correlation id as JSON.

mod cli;

use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use gremwire::{Disposition, EntryState, PipelineConfig, ResponsePipeline, StatusCode};
use log::warn;
use serde_json::{Value, json};

use crate::cli::{Cli, Command};

fn main() -> Result<(), Box<dyn Error>> {
    // stdout carries the JSON summary.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay {
            files,
            partial_codes,
            drain,
        } => {
            let summary = replay(&files, &partial_codes, drain)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn replay(
    files: &[PathBuf],
    partial_codes: &[i64],
    drain: bool,
) -> Result<Value, Box<dyn Error>> {
    let config = partial_codes
        .iter()
        .fold(PipelineConfig::default(), |config, &code| {
            config.with_status(StatusCode::new(code), Disposition::Partial)
        });
    let pipeline = ResponsePipeline::new(config);

    for path in files {
        let raw = fs::read(path)?;
        if let Err(e) = pipeline.handle_response(&raw) {
            warn!("skipping message: path={}, error={e}", path.display());
        }
    }
    if drain {
        pipeline.drain_all_as_failed("replay finished");
    }

    let aggregator = pipeline.aggregator();
    let mut ids = aggregator.ids();
    ids.sort();
    let entries = ids
        .iter()
        .map(|id| {
            let state = match aggregator.state(id) {
                EntryState::Absent => "absent",
                EntryState::Pending => "pending",
                EntryState::Complete => "complete",
            };
            json!({
                "requestId": id.as_str(),
                "state": state,
                "error": aggregator.last_error(id).map(|e| e.to_string()),
                "data": aggregator.retrieve_response(id),
            })
        })
        .collect();
    Ok(Value::Array(entries))
}
