use std::collections::BTreeMap;

use crate::errors::Result;

use super::site::{feet_to_meters, Site};
use super::MapCoords;

pub const OUTPUT_FILE_PREFIX: &str = "fbo_network_";

/// Runways are drawn far longer than they are so they show up at network scale.
pub const DEFAULT_RUNWAY_LENGTH_FT: f64 = 30_000.0;
pub const DEFAULT_FIGURE_SIZE_IN: (f32, f32) = (15.0, 12.0);

/// Ordered pair of site identifiers, drawn as a great-circle arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub text: String,
    pub position: MapCoords,
}

#[derive(Debug, Clone)]
pub struct DisplayParams {
    pub suffix: String,
    pub title: String,
    pub annotation: Option<Annotation>,
    pub figure_size_in: (f32, f32),
    pub runway_length_m: f64,
}

impl DisplayParams {
    pub fn new(suffix: &str, title: &str) -> Self {
        DisplayParams {
            suffix: suffix.to_string(),
            title: title.to_string(),
            annotation: None,
            figure_size_in: DEFAULT_FIGURE_SIZE_IN,
            runway_length_m: feet_to_meters(DEFAULT_RUNWAY_LENGTH_FT),
        }
    }

    pub fn with_annotation(mut self, text: &str, position: MapCoords) -> Self {
        self.annotation = Some(Annotation {
            text: text.to_string(),
            position,
        });
        self
    }

    pub fn output_file_name(&self) -> String {
        format!("{}{}.png", OUTPUT_FILE_PREFIX, self.suffix)
    }
}

/// Everything one map is drawn from. Built once, then only read.
#[derive(Debug, Clone)]
pub struct Batch {
    pub sites: BTreeMap<String, Site>,
    pub connections: Vec<Connection>,
    pub display: DisplayParams,
}

impl Batch {
    pub fn new(display: DisplayParams) -> Self {
        Batch {
            sites: BTreeMap::new(),
            connections: Vec::new(),
            display,
        }
    }

    pub fn add_site(&mut self, id: &str, site: Site) -> Result<()> {
        if self.sites.contains_key(id) {
            return Err(format!("Duplicate site identifier {}", id).into());
        }
        self.sites.insert(id.to_string(), site);
        Ok(())
    }

    /// Endpoints are checked by `validate`, not here.
    pub fn connect(&mut self, from: &str, to: &str) {
        self.connections.push(Connection {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn site(&self, id: &str) -> Result<&Site> {
        self.sites
            .get(id)
            .ok_or_else(|| format!("Unknown site {} in batch {}", id, self.display.suffix).into())
    }

    pub fn resolve(&self, connection: &Connection) -> Result<(&Site, &Site)> {
        Ok((self.site(&connection.from)?, self.site(&connection.to)?))
    }

    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            return Err(format!("Batch {} has no sites", self.display.suffix).into());
        }
        for connection in &self.connections {
            self.resolve(connection)?;
        }
        if !(self.display.runway_length_m > 0.0) {
            return Err(format!(
                "Runway length must be positive, got {} m",
                self.display.runway_length_m,
            ).into());
        }
        let (width, height) = self.display.figure_size_in;
        if !(width > 0.0 && height > 0.0) {
            return Err(format!("Figure size must be positive, got {}x{} in", width, height).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::site::Owner;

    fn batch() -> Batch {
        let mut batch = Batch::new(DisplayParams::new("test", "Test"));
        batch.add_site("AAA", Site::new("A", MapCoords::new(38.0, -99.0), Owner::Me, 1)).unwrap();
        batch.add_site("BBB", Site::new("B", MapCoords::new(39.0, -100.0), Owner::Me, 1)).unwrap();
        batch
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            DisplayParams::new("ab_2026-01-15", "").output_file_name(),
            "fbo_network_ab_2026-01-15.png"
        );
    }

    #[test]
    fn test_default_runway_length_is_metres() {
        let display = DisplayParams::new("x", "");
        assert!((display.runway_length_m - 9144.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let mut batch = batch();
        let err = batch
            .add_site("AAA", Site::new("again", MapCoords::new(0.0, 0.0), Owner::Unowned, 0))
            .unwrap_err();
        assert!(err.message.contains("AAA"));
        assert_eq!(batch.sites["AAA"].name, "A");
    }

    #[test]
    fn test_valid_connection() {
        let mut batch = batch();
        batch.connect("AAA", "BBB");
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_unknown_connection_endpoint() {
        let mut batch = batch();
        batch.connect("AAA", "ZZZ");
        let err = batch.validate().unwrap_err();
        assert!(err.message.contains("ZZZ"));
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        let batch = Batch::new(DisplayParams::new("empty", ""));
        assert!(batch.validate().is_err());
    }

    #[test]
    fn test_non_positive_runway_length() {
        let mut batch = batch();
        batch.display.runway_length_m = 0.0;
        assert!(batch.validate().is_err());
    }
}
