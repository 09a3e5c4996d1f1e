//! Tests for runway endpoints and great-circle helpers

use super::*;

const TOLERANCE_DEG: f64 = 1e-6;

fn ends(lat: f64, long: f64, heading_tens: u8, length: f64) -> [MapCoords; 2] {
    let (lons, lats) = runway_endpoints(lat, long, heading_tens, length);
    [MapCoords::new(lats[0], lons[0]), MapCoords::new(lats[1], lons[1])]
}

fn great_circle_midpoint(a: MapCoords, b: MapCoords) -> MapCoords {
    intermediate_point(a, b, 0.5)
}

fn assert_close(actual: MapCoords, expected: MapCoords, tolerance: f64) {
    assert!(
        (actual.lat - expected.lat).abs() < tolerance && (actual.lon - expected.lon).abs() < tolerance,
        "{:?} is not within {} of {:?}",
        actual,
        tolerance,
        expected,
    );
}

#[test]
fn test_rucker_runway_17() {
    // SN29, 30,000 ft display length
    let [south, north] = ends(38.186, -99.5355, 17, 9144.0);

    // Reference values from an independent evaluation of the direct formula
    assert_close(south, MapCoords::new(38.145507, -99.526421), 1e-5);
    assert_close(north, MapCoords::new(38.226492, -99.544589), 1e-5);

    let lat_offset = 38.186 - south.lat;
    assert!((lat_offset - 0.0405).abs() < 1e-3, "lat offset {}", lat_offset);
    assert!(south.lon > -99.5355, "170° points slightly east");
    assert!(north.lon < -99.5355);
}

#[test]
fn test_reciprocal_heading_swaps_ends() {
    for heading in 1..=35u8 {
        let reciprocal = (heading + 18) % 36;
        if reciprocal == 0 {
            continue;
        }
        let forward = ends(45.5, 7.25, heading, 3000.0);
        let backward = ends(45.5, 7.25, reciprocal, 3000.0);
        assert_close(forward[0], backward[1], TOLERANCE_DEG);
        assert_close(forward[1], backward[0], TOLERANCE_DEG);
    }
}

#[test]
fn test_midpoint_is_reconstructed() {
    for (lat, long, heading) in [(38.186, -99.5355, 17), (-33.9, 151.2, 7), (64.1, -21.9, 28)] {
        let [a, b] = ends(lat, long, heading, 9144.0);
        assert_close(great_circle_midpoint(a, b), MapCoords::new(lat, long), TOLERANCE_DEG);
    }
}

#[test]
fn test_endpoints_are_length_apart() {
    for length in [500.0, 2_500.0, 9_144.0, 50_000.0] {
        let [a, b] = ends(39.0387, -100.2338, 3, length);
        let distance = great_circle_distance(a, b);
        assert!(
            ((distance - length) / length).abs() < 1e-3,
            "{} m runway measured {} m",
            length,
            distance,
        );
    }
}

#[test]
fn test_zero_length_collapses_to_midpoint() {
    let midpoint = MapCoords::new(37.4495, -100.5065);
    for end in ends(midpoint.lat, midpoint.lon, 18, 0.0) {
        assert_close(end, midpoint, 1e-12);
    }
}

#[test]
fn test_east_runway_on_equator() {
    let [east, west] = ends(0.0, 0.0, 9, 2.0 * 111_194.9);
    assert_close(east, MapCoords::new(0.0, 1.0), 1e-4);
    assert_close(west, MapCoords::new(0.0, -1.0), 1e-4);
}

#[test]
fn test_destination_one_degree_north() {
    let one_degree = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
    let end = destination_point(MapCoords::new(10.0, 20.0), 0.0, one_degree);
    assert_close(end, MapCoords::new(11.0, 20.0), 1e-9);
}

#[test]
fn test_distance_one_degree_of_latitude() {
    let distance = great_circle_distance(MapCoords::new(0.0, 0.0), MapCoords::new(1.0, 0.0));
    assert!((distance - 111_194.9).abs() < 1.0);
}

#[test]
fn test_distance_to_self_is_zero() {
    let point = MapCoords::new(38.4107, -96.1955);
    assert_eq!(great_circle_distance(point, point), 0.0);
}

#[test]
fn test_intermediate_point_of_coincident_points() {
    let point = MapCoords::new(38.4107, -96.1955);
    assert_eq!(intermediate_point(point, point, 0.3), point);
}

#[test]
fn test_path_has_exact_ends_and_short_segments() {
    let start = MapCoords::new(39.0387, -100.2338);
    let end = MapCoords::new(38.186, -99.5355);
    let path = great_circle_path(start, end, 20_000.0);

    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&end));
    // ~110 km apart
    assert_eq!(path.len(), 7);
    for pair in path.windows(2) {
        assert!(great_circle_distance(pair[0], pair[1]) <= 20_000.0 + 1e-6);
    }
}

#[test]
fn test_path_short_hop_is_single_segment() {
    let start = MapCoords::new(39.0, -100.0);
    let end = MapCoords::new(39.1, -100.0);
    assert_eq!(great_circle_path(start, end, 100_000.0), vec![start, end]);
}

#[test]
fn test_long_path_bulges_poleward() {
    // New York to London: the great circle goes well north of both ends
    let path = great_circle_path(MapCoords::new(40.78, -73.98), MapCoords::new(51.53, 0.08), 100_000.0);
    let max_lat = path.iter().map(|p| p.lat).fold(f64::MIN, f64::max);
    assert!(max_lat > 52.0, "max latitude {}", max_lat);
}
