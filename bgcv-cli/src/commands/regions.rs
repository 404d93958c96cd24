//! Regions command implementation - list the regions of an antiSMASH record

use anyhow::Result;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;

use bgcv_core::antismash::RegionInfo;

use super::convert::load_document;
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct RegionsArgs {
    /// antiSMASH JSON output
    #[arg(long)]
    pub record: PathBuf,

    /// Record to inspect (first record if omitted)
    #[arg(long)]
    pub record_id: Option<String>,

    /// Print regions as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn format_regions(regions: &[RegionInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:>10} {:>10}  product", "id", "start", "end");
    for region in regions {
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10}  {}",
            region.id,
            region.start,
            region.end,
            region.product.join(", ")
        );
    }
    out
}

pub fn execute(args: RegionsArgs) -> Result<()> {
    let document = load_document(&args.record)?;
    let record = document.record(args.record_id.as_deref()).map_err(|e| CliError::record(e.to_string()))?;
    let regions = record.regions();
    log::info!("Record {} has {} regions", record.id, regions.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&regions)?);
    } else {
        print!("{}", format_regions(&regions));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::convert::tests::record_file;

    #[test]
    fn test_regions_are_listed_in_order() {
        let record = record_file();
        let document = load_document(record.path()).unwrap();
        let regions = document.record(None).unwrap().regions();
        let table = format_regions(&regions);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("region_1"));
        assert!(lines[2].starts_with("region_2"));
        assert!(lines[2].ends_with("T1PKS, NRPS"));
    }
}
