use crate::data::batch::{Batch, DisplayParams};
use crate::data::site::{Elevation, Owner, Site};
use crate::data::MapCoords;
use crate::errors::Result;

/// The maps this tool knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSelector {
    /// Every site, with RacAir's Rucker strip as the hub.
    Network,
    /// Only our own sites.
    // Built only when `ACTIVE_BATCH` is edited to select it
    #[allow(dead_code)]
    Mine,
}

impl BatchSelector {
    pub fn build(self) -> Result<Batch> {
        match self {
            BatchSelector::Network => network(),
            BatchSelector::Mine => mine(),
        }
    }
}

fn gove_county() -> Result<Site> {
    Ok(Site::new("Gove Co, aka 6KS1", MapCoords::from_degrees_minutes((39, 2.32), (-100, 14.03)), Owner::Me, 1)
        .with_runways(&[17])?
        .with_elevation(Elevation::from_feet(2637.0))
        .with_approaches(false, true)
        .with_map_note("old 6KS1"))
}

fn rexford() -> Result<Site> {
    Ok(Site::new("Rexford", MapCoords::from_degrees_minutes((37, 26.97), (-100, 30.39)), Owner::Me, 1)
        .with_runways(&[18])?
        .with_elevation(Elevation::from_feet(2782.0)))
}

fn rucker() -> Result<Site> {
    Ok(Site::new("Rucker", MapCoords::from_degrees_minutes((38, 11.16), (-99, 32.13)), Owner::RacAir, 3)
        .with_runways(&[17, 3, 16])?
        .with_elevation(Elevation::from_feet(2151.0)))
}

fn newman_heliport() -> Result<Site> {
    Ok(Site::new("Newman Regional Health Heliport", MapCoords::from_degrees_minutes((38, 24.64), (-96, 11.73)), Owner::Unowned, 1)
        .with_runways(&[0])?
        .with_elevation(Elevation::from_feet(1164.0))
        .with_note("Helipad only"))
}

fn network() -> Result<Batch> {
    let display = DisplayParams::new("ks_2026-01-15", "FBO network, Kansas")
        .with_annotation("Kansas, January 2026", MapCoords::new(35.0, -103.0));
    let mut batch = Batch::new(display);

    batch.add_site("1QK", gove_county()?)?;
    batch.add_site("98KS", rexford()?)?;
    batch.add_site("SN29", rucker()?)?;
    batch.add_site("6KS1", newman_heliport()?)?;

    batch.connect("1QK", "SN29");
    batch.connect("98KS", "SN29");
    Ok(batch)
}

fn mine() -> Result<Batch> {
    let mut batch = Batch::new(DisplayParams::new("mine_2026-01-15", "FBO network, own sites"));

    batch.add_site("1QK", gove_county()?)?;
    batch.add_site("98KS", rexford()?)?;

    batch.connect("1QK", "98KS");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_batch_is_valid() {
        for selector in [BatchSelector::Network, BatchSelector::Mine] {
            let batch = selector.build().unwrap();
            assert!(batch.validate().is_ok(), "{:?} failed validation", selector);
        }
    }

    #[test]
    fn test_network_contents() {
        let batch = BatchSelector::Network.build().unwrap();
        assert_eq!(batch.sites.len(), 4);
        assert_eq!(batch.connections.len(), 2);
        assert_eq!(batch.sites["SN29"].runway_headings().count(), 3);
        assert_eq!(batch.sites["6KS1"].runway_headings().count(), 0);
        assert_eq!(batch.display.output_file_name(), "fbo_network_ks_2026-01-15.png");
    }

    #[test]
    fn test_mine_has_only_own_sites() {
        let batch = BatchSelector::Mine.build().unwrap();
        assert!(batch.sites.values().all(|site| site.owner.is_mine()));
    }

    #[test]
    fn test_rucker_position() {
        let rucker = rucker().unwrap();
        assert!((rucker.position.lat - 38.186).abs() < 1e-9);
        assert!((rucker.position.lon + 99.5355).abs() < 1e-9);
        assert!((rucker.elevation.feet() - 2151.0).abs() < 1e-9);
    }
}
