pub mod batch;
pub mod site;

/// A point on the map in decimal degrees. North and east are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCoords {
    pub lat: f64,
    pub lon: f64,
}

impl MapCoords {
    pub fn new(lat: f64, lon: f64) -> Self {
        MapCoords { lat, lon }
    }

    /// Builds coordinates from the degrees + decimal minutes notation used on
    /// charts, e.g. 39°02.32'N 100°14.03'W is `from_degrees_minutes((39, 2.32), (-100, 14.03))`.
    /// The sign of the degrees gives the hemisphere.
    pub fn from_degrees_minutes(lat: (i32, f64), lon: (i32, f64)) -> Self {
        MapCoords {
            lat: degrees_minutes(lat.0, lat.1),
            lon: degrees_minutes(lon.0, lon.1),
        }
    }
}

fn degrees_minutes(degrees: i32, minutes: f64) -> f64 {
    let magnitude = f64::from(degrees.abs()) + minutes / 60.0;
    if degrees < 0 {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_minutes_west_is_negative() {
        let coords = MapCoords::from_degrees_minutes((38, 11.16), (-99, 32.13));
        assert!((coords.lat - 38.186).abs() < 1e-9);
        assert!((coords.lon + 99.5355).abs() < 1e-9);
    }
}
