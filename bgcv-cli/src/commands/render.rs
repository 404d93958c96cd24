//! Render command implementation - draw viewer data headlessly and export SVG/PNG

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use bgcv_core::zoom::ZOOM_TRANSITION;
use bgcv_core::{HeadlessHost, Stylesheet, TrackViewer, TrackViewerData};
use bgcv_export::ExportOptions;

use super::convert::load_converted;
use super::read_input;
use crate::config::Config;
use crate::error::CliError;
use crate::RenderFormat;

/// Mount point of the headless viewer
const CONTAINER: &str = "#track-viewer";
/// Height reported for the headless container; the drawing height comes from the tracks
const CONTAINER_HEIGHT: f64 = 600.0;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// TrackViewerData JSON
    #[arg(long, conflicts_with = "record", required_unless_present = "record")]
    pub data: Option<PathBuf>,

    /// antiSMASH JSON output to render instead of viewer data
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Record to render (first record if omitted)
    #[arg(long, requires = "record")]
    pub record_id: Option<String>,

    /// Region number or id of the record
    #[arg(long, requires = "record")]
    pub region: Option<String>,

    /// JSON map of PFAM accession to fill color
    #[arg(long, requires = "record")]
    pub pfam_colors: Option<PathBuf>,

    /// Output file (SVG/PNG)
    #[arg(short, long)]
    pub out: PathBuf,

    /// Output format (auto-detected from extension)
    #[arg(long)]
    pub format: Option<RenderFormat>,

    /// Width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Genomic interval at identity zoom, e.g. '0-45000'
    #[arg(long)]
    pub domain: Option<String>,

    /// Zoom onto an interval before exporting, e.g. '12000-18000'
    #[arg(long)]
    pub zoom: Option<String>,

    /// Show every annotation label
    #[arg(long)]
    pub show_labels: bool,

    /// Hide the track label column
    #[arg(long)]
    pub hide_track_labels: bool,
}

pub fn execute(config: &Config, args: RenderArgs) -> Result<()> {
    log::info!("Output file: {}", args.out.display());

    // Auto-detect output format if not specified
    let format = match args.format {
        Some(format) => format,
        None => detect_render_format(&args.out)?,
    };
    log::info!("Output format: {:?}", format);

    let (data, record_domain) = match (&args.data, &args.record) {
        (Some(path), _) => (load_data(path)?, None),
        (None, Some(record)) => {
            let converted = load_converted(
                record,
                args.record_id.as_deref(),
                args.region.as_deref(),
                args.pfam_colors.as_deref(),
            )?;
            (converted.data, Some(converted.domain))
        }
        (None, None) => return Err(CliError::validation("one of --data or --record is required").into()),
    };

    let domain = match &args.domain {
        Some(text) => parse_range(text)?,
        None => config
            .viewer
            .domain
            .or(record_domain)
            .or_else(|| data_extent(&data))
            .unwrap_or([0.0, 1000.0]),
    };
    let zoom = args.zoom.as_deref().map(parse_range).transpose()?;

    let viewer = build_viewer(
        config,
        data,
        domain,
        args.width.unwrap_or(config.viewer.width),
        args.show_labels || config.render.show_all_annotation_labels,
        config.render.show_track_labels && !args.hide_track_labels,
        zoom,
    )?;
    log::info!("Drawing {}x{} px over {}..{}", viewer.width(), viewer.scene().height, domain[0], domain[1]);

    let options = export_options(config)?;
    match format {
        RenderFormat::Svg => bgcv_export::export_svg(viewer.scene(), &args.out, &options)?,
        RenderFormat::Png => bgcv_export::export_png(viewer.scene(), &args.out, &options)?,
    }

    log::info!("Rendering completed successfully");
    Ok(())
}

pub fn build_viewer(
    config: &Config,
    data: TrackViewerData,
    domain: [f64; 2],
    width: f64,
    show_all_labels: bool,
    show_track_labels: bool,
    zoom: Option<[f64; 2]>,
) -> Result<TrackViewer<HeadlessHost>> {
    let host = HeadlessHost::new()
        .with_container(CONTAINER, width, CONTAINER_HEIGHT)
        .with_char_advance(config.render.char_advance);
    let mut viewer_config = config.viewer.to_viewer_config(CONTAINER, domain, show_track_labels);
    viewer_config.width = Some(width);

    let mut viewer = TrackViewer::new(viewer_config, host).context("Failed to create viewer")?;
    viewer.set_data(data).context("Invalid viewer data")?;
    viewer.set_show_all_annotation_labels(show_all_labels);
    if let Some([start, end]) = zoom {
        viewer.zoom_to(start, end);
        viewer.tick(ZOOM_TRANSITION);
    }
    Ok(viewer)
}

fn load_data(path: &Path) -> Result<TrackViewerData> {
    let json = read_input(path)?;
    TrackViewerData::from_json(&json).map_err(|e| CliError::parse(path.display().to_string(), e.to_string()).into())
}

fn export_options(config: &Config) -> Result<ExportOptions> {
    let mut options = ExportOptions {
        provenance: config.export.provenance,
        png_scale: config.export.png_scale,
        png_margin: config.export.png_margin,
        ..ExportOptions::default()
    };
    if let Some(path) = &config.export.stylesheet {
        let css = read_input(path)?;
        options.stylesheet.extend(Stylesheet::parse(&css));
    }
    Ok(options)
}

/// Detect render format from file extension
pub fn detect_render_format(path: &Path) -> Result<RenderFormat> {
    match path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("svg") => Ok(RenderFormat::Svg),
        Some("png") => Ok(RenderFormat::Png),
        _ => Err(CliError::invalid_format(format!("cannot infer output format from {}", path.display())).into()),
    }
}

/// Parse 'START-END' into an increasing genomic interval.
pub fn parse_range(text: &str) -> Result<[f64; 2]> {
    let (start, end) = text
        .split_once('-')
        .ok_or_else(|| CliError::validation(format!("expected START-END, got {:?}", text)))?;
    let parse = |s: &str| {
        s.trim()
            .replace('_', "")
            .parse::<f64>()
            .map_err(|_| CliError::validation(format!("invalid coordinate {:?} in {:?}", s, text)))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    if !(start < end) {
        return Err(CliError::validation(format!("range {} is empty", text)).into());
    }
    Ok([start, end])
}

/// Smallest interval covering every annotation and extent-bound primitive.
pub fn data_extent(data: &TrackViewerData) -> Option<[f64; 2]> {
    let annotations = data.annotations.iter().map(|a| (a.start, a.end));
    let primitives = data.primitives.iter().filter_map(|p| Some((p.start?, p.end?)));
    annotations
        .chain(primitives)
        .fold(None, |acc: Option<[f64; 2]>, (s, e)| match acc {
            None => Some([s.min(e), s.max(e)]),
            Some([lo, hi]) => Some([lo.min(s.min(e)), hi.max(s.max(e))]),
        })
        .filter(|[lo, hi]| lo < hi)
}
