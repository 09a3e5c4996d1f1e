use std::io::Write;

use log::info;

use crate::data::batch::Batch;
use crate::errors::Result;
use crate::scene::Scene;

/// Writes the human-readable summary of a planned map: site positions,
/// connection endpoints and runway ends. The output depends only on the
/// scene, so the same batch always reports the same text.
pub fn write_report(scene: &Scene, out: &mut impl Write) -> Result<()> {
    for marker in &scene.markers {
        writeln!(out, "{} {:.2}, {:.2}", marker.label, marker.position.lat, marker.position.lon)?;
    }

    writeln!(out, "***")?;
    for arc in &scene.connections {
        let (Some(start), Some(end)) = (arc.path.first(), arc.path.last()) else {
            continue;
        };
        writeln!(
            out,
            "{} - {}; {:.2}, {:.2} --> {:.2}, {:.2}",
            arc.from,
            arc.to,
            start.lat,
            start.lon,
            end.lat,
            end.lon,
        )?;
    }

    writeln!(out, "***")?;
    for runway in &scene.runways {
        let [heading_end, reciprocal_end] = runway.ends;
        writeln!(
            out,
            "{} runway {}: {:.5}, {:.5} <-> {:.5}, {:.5}",
            runway.site_id,
            runway.heading,
            heading_end.lat,
            heading_end.lon,
            reciprocal_end.lat,
            reciprocal_end.lon,
        )?;
    }
    Ok(())
}

/// Logs the descriptive site attributes that do not show on the map.
pub fn log_sites(batch: &Batch) {
    for (id, site) in &batch.sites {
        info!(
            site = id.as_str(),
            name = site.name.as_str(),
            owner = site.owner.to_string().as_str(),
            lots = site.lots,
            elevation_m = site.elevation.meters(),
            elevation_ft = site.elevation.feet(),
            ils = site.ils,
            rnav = site.rnav,
            note = site.note.as_str();
            "Site"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batches::BatchSelector;
    use crate::load_render_config;
    use crate::scene::plan;

    fn report(selector: BatchSelector) -> String {
        let batch = selector.build().unwrap();
        let scene = plan(&batch, &load_render_config().unwrap()).unwrap();
        let mut out = Vec::new();
        write_report(&scene, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_is_repeatable() {
        assert_eq!(report(BatchSelector::Network), report(BatchSelector::Network));
    }

    #[test]
    fn test_report_lines() {
        let text = report(BatchSelector::Network);
        let lines: Vec<&str> = text.lines().collect();

        // 4 sites, separator, 2 connections, separator, 5 runways
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "1QK (old 6KS1) 39.04, -100.23");
        assert_eq!(lines[4], "***");
        assert_eq!(lines[5], "1QK - SN29; 39.04, -100.23 --> 38.19, -99.54");
        assert_eq!(lines[7], "***");
        assert!(lines.contains(&"SN29 runway 17: 38.14551, -99.52642 <-> 38.22649, -99.54459"));
        assert!(lines.contains(&"SN29 runway 03: 38.22161, -99.50933 <-> 38.15039, -99.56164"));
        assert!(!text.contains("6KS1 runway"));
    }
}
