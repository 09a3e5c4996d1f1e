//! Resolves a batch into everything that gets drawn, in map coordinates.
//!
//! Planning validates the batch first, so a bad batch never produces a
//! partial map.

use crate::data::batch::{Annotation, Batch};
use crate::data::site::RunwayHeading;
use crate::data::MapCoords;
use crate::errors::Result;
use crate::geo;
use crate::RenderConfig;

/// Finest arc sampling accepted from the config.
pub const MIN_ARC_SEGMENT_KM: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl MapExtent {
    /// Bounding box of `points` widened by `margin_deg` on every side.
    fn around<'a>(points: impl Iterator<Item = &'a MapCoords>, margin_deg: f64) -> Option<Self> {
        let mut extent: Option<MapExtent> = None;
        for point in points {
            extent = Some(match extent {
                None => MapExtent {
                    west: point.lon,
                    east: point.lon,
                    south: point.lat,
                    north: point.lat,
                },
                Some(e) => MapExtent {
                    west: e.west.min(point.lon),
                    east: e.east.max(point.lon),
                    south: e.south.min(point.lat),
                    north: e.north.max(point.lat),
                },
            });
        }
        extent.map(|e| MapExtent {
            west: e.west - margin_deg,
            east: e.east + margin_deg,
            south: e.south - margin_deg,
            north: e.north + margin_deg,
        })
    }

    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }
}

#[derive(Debug, Clone)]
pub struct SiteMarker {
    pub label: String,
    pub position: MapCoords,
    pub label_position: MapCoords,
    pub mine: bool,
}

#[derive(Debug, Clone)]
pub struct RunwaySegment {
    pub site_id: String,
    pub heading: RunwayHeading,
    /// Heading end first, reciprocal end second.
    pub ends: [MapCoords; 2],
}

#[derive(Debug, Clone)]
pub struct ConnectionArc {
    pub from: String,
    pub to: String,
    /// Both ends are our own sites.
    pub mine: bool,
    pub path: Vec<MapCoords>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub extent: MapExtent,
    pub width_px: u32,
    pub height_px: u32,
    pub markers: Vec<SiteMarker>,
    pub runways: Vec<RunwaySegment>,
    pub connections: Vec<ConnectionArc>,
    pub annotation: Option<Annotation>,
}

pub fn plan(batch: &Batch, config: &RenderConfig) -> Result<Scene> {
    batch.validate()?;
    if !(config.map_margin_deg > 0.0) {
        return Err(format!("map_margin_deg must be positive, got {}", config.map_margin_deg).into());
    }
    if !(config.arc_segment_km >= MIN_ARC_SEGMENT_KM) {
        return Err(format!(
            "arc_segment_km must be at least {}, got {}",
            MIN_ARC_SEGMENT_KM, config.arc_segment_km
        ).into());
    }

    let extent = MapExtent::around(batch.sites.values().map(|site| &site.position), config.map_margin_deg)
        .ok_or("Cannot size a map without sites")?;

    let (width_in, height_in) = batch.display.figure_size_in;
    let width_px = (width_in * config.dpi).round() as u32;
    let height_px = (height_in * config.dpi).round() as u32;
    if width_px == 0 || height_px == 0 {
        return Err(format!("Figure of {}x{} in at {} dpi has no pixels", width_in, height_in, config.dpi).into());
    }

    let markers = batch.sites.iter()
        .map(|(id, site)| SiteMarker {
            label: site.label(id),
            position: site.position,
            label_position: MapCoords::new(site.position.lat, site.position.lon + config.label_offset_deg),
            mine: site.owner.is_mine(),
        })
        .collect();

    let mut runways = Vec::new();
    for (id, site) in &batch.sites {
        for heading in site.runway_headings() {
            let (lons, lats) = geo::runway_endpoints(
                site.position.lat,
                site.position.lon,
                heading.tens(),
                batch.display.runway_length_m,
            );
            runways.push(RunwaySegment {
                site_id: id.clone(),
                heading,
                ends: [MapCoords::new(lats[0], lons[0]), MapCoords::new(lats[1], lons[1])],
            });
        }
    }

    let segment_m = config.arc_segment_km * 1000.0;
    let mut connections = Vec::with_capacity(batch.connections.len());
    for connection in &batch.connections {
        let (from, to) = batch.resolve(connection)?;
        connections.push(ConnectionArc {
            from: connection.from.clone(),
            to: connection.to.clone(),
            mine: from.owner.is_mine() && to.owner.is_mine(),
            path: geo::great_circle_path(from.position, to.position, segment_m),
        });
    }

    Ok(Scene {
        extent,
        width_px,
        height_px,
        markers,
        runways,
        connections,
        annotation: batch.display.annotation.clone(),
    })
}

/// Cylindrical equidistant projection of an extent into a pixel frame, with
/// the same scale on both axes and the extent centred in the frame.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    west: f64,
    north: f64,
    px_per_deg: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    pub fn fit(extent: &MapExtent, width_px: u32, height_px: u32) -> Self {
        let width = f64::from(width_px);
        let height = f64::from(height_px);
        let px_per_deg = (width / extent.lon_span()).min(height / extent.lat_span());
        Projection {
            west: extent.west,
            north: extent.north,
            px_per_deg,
            offset_x: (width - extent.lon_span() * px_per_deg) / 2.0,
            offset_y: (height - extent.lat_span() * px_per_deg) / 2.0,
        }
    }

    pub fn project(&self, coords: &MapCoords) -> (f32, f32) {
        let x = self.offset_x + (coords.lon - self.west) * self.px_per_deg;
        let y = self.offset_y + (self.north - coords.lat) * self.px_per_deg;
        (x as f32, y as f32)
    }
}
