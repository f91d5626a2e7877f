// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: detect lane lines in road images and save overlays
//!
//! Usage:
//!   lane-detect <image>... [--config FILE] [--output FILE | --output-dir DIR] [--report FILE]

use anyhow::{bail, Context};
use lane_lite_vision::{load_config, write_json_file, LanePipeline, LaneReport, PipelineConfig};
use rayon::prelude::*;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Default)]
struct Args {
    inputs: Vec<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn parse_args(raw: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();

    let mut i = 0;
    while i < raw.len() {
        let flag = raw[i].as_str();
        let mut value = || -> anyhow::Result<PathBuf> {
            i += 1;
            raw.get(i)
                .map(PathBuf::from)
                .with_context(|| format!("Missing value for {flag}"))
        };
        match flag {
            "--help" | "-h" => return Ok(None),
            "--config" => args.config = Some(value()?),
            "--output" => args.output = Some(value()?),
            "--output-dir" => args.output_dir = Some(value()?),
            "--report" => args.report = Some(value()?),
            other if other.starts_with("--") => bail!("Unknown option: {other}"),
            path => args.inputs.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if args.inputs.is_empty() {
        bail!("No input images given");
    }
    if args.output.is_some() && args.output_dir.is_some() {
        bail!("--output and --output-dir are mutually exclusive");
    }
    if args.output.is_some() && args.inputs.len() > 1 {
        bail!("--output takes a single input; use --output-dir for several");
    }

    Ok(Some(args))
}

fn print_usage() {
    println!("Usage: lane-detect <image>... [options]");
    println!();
    println!("Options:");
    println!("  --config <FILE>      JSON pipeline configuration");
    println!("  --output <FILE>      Overlay path (single input only)");
    println!("  --output-dir <DIR>   Write <stem>_lanes.png per input");
    println!("  --report <FILE>      Write a JSON report of all detections");
    println!();
    println!("Logging is controlled with RUST_LOG (default: info,lane_lite_vision=debug).");
}

/// Where the overlay for `input` goes, if anywhere
fn output_path(args: &Args, input: &Path) -> Option<PathBuf> {
    if let Some(out) = &args.output {
        return Some(out.clone());
    }
    let dir = args.output_dir.as_ref()?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".into());
    Some(dir.join(format!("{stem}_lanes.png")))
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = LanePipeline::new(&config).context("Invalid pipeline configuration")?;

    tracing::info!(images = args.inputs.len(), "Starting lane detection");

    let results: Vec<Option<LaneReport>> = args
        .inputs
        .par_iter()
        .map(|input| {
            let output = output_path(&args, input);
            match pipeline.process_route(input, output.as_deref()) {
                Ok(route) => {
                    let report = route.report();
                    tracing::info!(
                        input = %input.display(),
                        left = ?report.left.map(|l| l.as_tuple()),
                        right = ?report.right.map(|l| l.as_tuple()),
                        "Processed image"
                    );
                    Some(report)
                }
                Err(err) => {
                    tracing::warn!(input = %input.display(), error = %err, "Skipping image");
                    None
                }
            }
        })
        .collect();

    let reports: Vec<LaneReport> = results.into_iter().flatten().collect();

    if let Some(path) = &args.report {
        write_json_file(path, &reports)?;
        tracing::info!(path = %path.display(), "Report written");
    }

    tracing::info!(
        succeeded = reports.len(),
        failed = args.inputs.len() - reports.len(),
        "Processing complete"
    );

    if reports.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info,lane_lite_vision=debug".into()))
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Lane detection failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_inputs_and_options() {
        let args = parse_args(&strings(&["a.jpg", "b.jpg", "--output-dir", "out", "--report", "r.json"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.report, Some(PathBuf::from("r.json")));

        assert_eq!(
            output_path(&args, Path::new("dir/road.jpeg")),
            Some(PathBuf::from("out/road_lanes.png"))
        );
    }

    #[test]
    fn test_parse_rejects_bad_combinations() {
        assert!(parse_args(&strings(&[])).is_err());
        assert!(parse_args(&strings(&["a.jpg", "--output"])).is_err());
        assert!(parse_args(&strings(&["a.jpg", "b.jpg", "--output", "x.png"])).is_err());
        assert!(parse_args(&strings(&["a.jpg", "--output", "x.png", "--output-dir", "d"])).is_err());
        assert!(parse_args(&strings(&["a.jpg", "--frobnicate"])).is_err());
        assert!(parse_args(&strings(&["--help"])).unwrap().is_none());
    }
}
