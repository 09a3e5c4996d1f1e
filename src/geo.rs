//! Spherical-Earth geodesy for drawing runways and connections.
//!
//! Everything here treats the Earth as a sphere of radius
//! [`EARTH_RADIUS_METERS`]. That is plenty for drawing a map and not meant for
//! navigation.
//!
//! - Latitude: degrees north (-90 to 90)
//! - Longitude: degrees east (-180 to 180)
//! - Bearing: degrees clockwise from true north
//! - Distance: metres

use crate::data::MapCoords;

/// Mean Earth radius.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Position reached by travelling `distance_m` from `origin` along the great
/// circle that leaves it at `bearing_deg`.
pub fn destination_point(origin: MapCoords, bearing_deg: f64, distance_m: f64) -> MapCoords {
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_METERS;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_d = angular_distance.sin();
    let cos_d = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_d + cos_lat1 * sin_d * bearing.cos();
    let lat2 = sin_lat2.asin();
    let lon2 = lon1 + (bearing.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * sin_lat2);

    MapCoords {
        lat: lat2.to_degrees(),
        lon: lon2.to_degrees(),
    }
}

/// Ends of a runway centreline of `length` metres whose midpoint is at
/// (`lat`, `long`) and whose heading is `heading_tens` tens of degrees.
///
/// Returns the two longitudes and the two latitudes, the heading end first and
/// the reciprocal end second, ready to use as a polyline's x and y values.
///
/// `heading_tens` of 0 means "no runway" and must be filtered out by the
/// caller. Nothing is validated here.
pub fn runway_endpoints(lat: f64, long: f64, heading_tens: u8, length: f64) -> ([f64; 2], [f64; 2]) {
    let midpoint = MapCoords { lat, lon: long };
    let bearing = f64::from(heading_tens) * 10.0;
    let half_length = length / 2.0;

    let heading_end = destination_point(midpoint, bearing, half_length);
    let reciprocal_end = destination_point(midpoint, bearing + 180.0, half_length);

    (
        [heading_end.lon, reciprocal_end.lon],
        [heading_end.lat, reciprocal_end.lat],
    )
}

/// Great-circle distance in metres (haversine formula).
pub fn great_circle_distance(a: MapCoords, b: MapCoords) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Point `fraction` of the way from `a` to `b` along the great circle.
///
/// Coincident points return `a`. Antipodal points have no unique great circle
/// and give an undefined result.
pub fn intermediate_point(a: MapCoords, b: MapCoords, fraction: f64) -> MapCoords {
    let angular_distance = great_circle_distance(a, b) / EARTH_RADIUS_METERS;
    if angular_distance == 0.0 {
        return a;
    }

    let lat1 = a.lat.to_radians();
    let lon1 = a.lon.to_radians();
    let lat2 = b.lat.to_radians();
    let lon2 = b.lon.to_radians();

    let sin_d = angular_distance.sin();
    let weight_a = ((1.0 - fraction) * angular_distance).sin() / sin_d;
    let weight_b = (fraction * angular_distance).sin() / sin_d;

    let x = weight_a * lat1.cos() * lon1.cos() + weight_b * lat2.cos() * lon2.cos();
    let y = weight_a * lat1.cos() * lon1.sin() + weight_b * lat2.cos() * lon2.sin();
    let z = weight_a * lat1.sin() + weight_b * lat2.sin();

    MapCoords {
        lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        lon: y.atan2(x).to_degrees(),
    }
}

/// Samples the great circle from `a` to `b` with segments no longer than
/// `segment_m`. Both ends are included exactly, so there are always at least
/// two points.
pub fn great_circle_path(a: MapCoords, b: MapCoords, segment_m: f64) -> Vec<MapCoords> {
    let distance = great_circle_distance(a, b);
    let segments = if segment_m > 0.0 {
        ((distance / segment_m).ceil() as usize).max(1)
    } else {
        1
    };

    let mut path = Vec::with_capacity(segments + 1);
    path.push(a);
    for step in 1..segments {
        path.push(intermediate_point(a, b, step as f64 / segments as f64));
    }
    path.push(b);
    path
}

#[cfg(test)]
mod tests;
