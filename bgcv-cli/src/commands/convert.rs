//! Convert command implementation - antiSMASH record to viewer data JSON

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use bgcv_core::antismash::{self, AntismashDocument, ConvertedRecord, PfamColorMap};

use super::{read_input, region_id};
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// antiSMASH JSON output
    #[arg(long)]
    pub record: PathBuf,

    /// Record to convert (first record if omitted)
    #[arg(long)]
    pub record_id: Option<String>,

    /// Region number or id to restrict to (whole record if omitted)
    #[arg(long)]
    pub region: Option<String>,

    /// JSON map of PFAM accession to fill color
    #[arg(long)]
    pub pfam_colors: Option<PathBuf>,

    /// Output file for the TrackViewerData JSON
    #[arg(short, long)]
    pub out: PathBuf,
}

pub fn load_document(path: &Path) -> Result<AntismashDocument> {
    let json = read_input(path)?;
    AntismashDocument::from_json(&json)
        .map_err(|e| CliError::parse(path.display().to_string(), e.to_string()).into())
}

pub fn load_pfam_colors(path: Option<&Path>) -> Result<PfamColorMap> {
    match path {
        Some(path) => {
            let json = read_input(path)?;
            antismash::parse_pfam_colors(&json)
                .map_err(|e| CliError::parse(path.display().to_string(), e.to_string()).into())
        }
        None => Ok(PfamColorMap::default()),
    }
}

/// Load a record (optionally one region of it) as viewer data.
pub fn load_converted(
    record: &Path,
    record_id: Option<&str>,
    region: Option<&str>,
    pfam_colors: Option<&Path>,
) -> Result<ConvertedRecord> {
    let document = load_document(record)?;
    let colors = load_pfam_colors(pfam_colors)?;
    let record = document.record(record_id).map_err(|e| CliError::record(e.to_string()))?;
    let region = region.map(region_id);
    antismash::record_to_track_data(record, region.as_deref(), &colors).map_err(|e| CliError::record(e.to_string()).into())
}

pub fn execute(args: ConvertArgs) -> Result<()> {
    log::info!("Converting {}", args.record.display());
    let converted = load_converted(
        &args.record,
        args.record_id.as_deref(),
        args.region.as_deref(),
        args.pfam_colors.as_deref(),
    )?;

    log::info!(
        "{} tracks, {} annotations over {}..{}",
        converted.data.tracks.len(),
        converted.data.annotations.len(),
        converted.domain[0],
        converted.domain[1]
    );

    let json = serde_json::to_string_pretty(&converted.data).context("Failed to serialize viewer data")?;
    std::fs::write(&args.out, json).with_context(|| format!("Failed to write {}", args.out.display()))?;
    log::info!("Viewer data written to {}", args.out.display());
    Ok(())
}
