mod batches;
mod data;
mod errors;
mod etl;
mod geo;
mod report;
mod scene;

use std::io;
use std::path::Path;

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::batches::BatchSelector;
use crate::errors::Result;
use crate::etl::draw_map::{DrawMapEtl, Theme};
use crate::etl::Etl;

/// Which map `main` draws. Edit to render another batch.
const ACTIVE_BATCH: BatchSelector = BatchSelector::Network;

const RENDER_CONFIG: &str = include_str!("../config/render.json");

#[derive(Deserialize)]
pub struct RenderConfig {
    pub output_dir: String,
    pub dpi: f32,
    pub map_margin_deg: f64,
    pub label_offset_deg: f64,
    pub label_size_pt: f32,
    pub site_marker_size_pt: f32,
    pub connection_width_pt: f32,
    pub runway_width_pt: f32,
    pub arc_segment_km: f64,
    pub draw_labels: bool,
    /// Falls back to the system sans-serif font when unset.
    pub font_path: Option<String>,
    pub basemap: Option<BasemapConfig>,
    pub theme: Theme,
}

/// An equirectangular raster drawn under everything else, e.g. a Natural
/// Earth shaded relief PNG. The bounds say which area the image covers.
#[derive(Deserialize)]
pub struct BasemapConfig {
    pub path: String,
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

fn load_render_config() -> Result<RenderConfig> {
    Ok(serde_json::from_str(RENDER_CONFIG)?)
}

fn setup_logging() {
    // stdout carries the report
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let render_config = load_render_config()?;
    let batch = ACTIVE_BATCH.build()?;
    info!(batch = batch.display.suffix.as_str(), sites = batch.sites.len(); "Planning map");
    report::log_sites(&batch);
    let scene = scene::plan(&batch, &render_config)?;

    report::write_report(&scene, &mut io::stdout().lock())?;

    let mut etl = DrawMapEtl::new(&scene, &batch.display, &render_config)?;
    etl.process(Path::new(&render_config.output_dir))?;

    Ok(())
}
