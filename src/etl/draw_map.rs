use std::{fs::{create_dir_all, File}, io::BufWriter, path::{Path, PathBuf}};

use log::{info, warn};
use png::{BitDepth, ColorType, Transformations};
use raqote::{BlendMode, DrawOptions, DrawTarget, ExtendMode, FilterMode, Image, LineCap, LineJoin, PathBuilder, Point, SolidSource, Source, StrokeStyle, Transform};
use serde::Deserialize;

use crate::{
    data::{batch::DisplayParams, MapCoords},
    errors::Result,
    scene::{ConnectionArc, Projection, RunwaySegment, Scene, SiteMarker},
    BasemapConfig, RenderConfig,
};

use super::Etl;

mod fk {
    pub use font_kit::family_name::FamilyName;
    pub use font_kit::font::Font;
    pub use font_kit::properties::Properties;
    pub use font_kit::source::SystemSource;
    pub use pathfinder_geometry::vector::vec2f;
}

pub const ETL_NAME: &str = "draw_map";

const POINTS_PER_INCH: f32 = 72.0;

pub struct OwnedImage {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u32>,
}

use serialize_color::deserialize;

#[derive(Deserialize)]
pub struct Theme {
    #[serde(deserialize_with = "deserialize")]
    pub ocean_color: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub land_color: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub site_color: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub site_color_mine: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub connection_color: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub connection_color_mine: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub runway_color: SolidSource,

    #[serde(deserialize_with = "deserialize")]
    pub text_color: SolidSource,
}

mod serialize_color {
    use raqote::SolidSource;
    use serde::{de, Deserializer};
    use serde::de::Visitor;


    struct ColorVisitor;

    impl<'de> Visitor<'de> for ColorVisitor {
        type Value = SolidSource;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a colour string of the form '#RRGGBB' or '#RRGGBBAA'")
        }

        fn visit_str<E>(self, string: &str) -> Result<Self::Value, E> where E: de::Error {
            if !string.starts_with('#') || !(string.len() == 7 || string.len() == 9) || !string.is_ascii() {
                return Err(de::Error::invalid_value(de::Unexpected::Str(string), &self))
            }
            let r = parse_hex_byte(&self, &string[1..3])?;
            let g = parse_hex_byte(&self, &string[3..5])?;
            let b = parse_hex_byte(&self, &string[5..7])?;
            let a = if string.len() == 9 {
                parse_hex_byte(&self, &string[7..9])?
            } else {
                0xff
            };
            Ok(SolidSource::from_unpremultiplied_argb(a, r, g, b))
        }
    }

    fn parse_hex_byte<E>(visitor: &ColorVisitor, string: &str) -> Result<u8, E> where E: de::Error {
        u8::from_str_radix(string, 16).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(string), visitor)
        })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SolidSource, D::Error>
        where D: Deserializer<'de> {
        deserializer.deserialize_str(ColorVisitor)
    }
}

pub struct DrawMapEtl<'a> {
    scene: &'a Scene,
    display: &'a DisplayParams,
    config: &'a RenderConfig,
    projection: Projection,
    font: Option<fk::Font>,
}

impl DrawMapEtl<'_> {
    pub fn new<'a>(scene: &'a Scene, display: &'a DisplayParams, config: &'a RenderConfig) -> Result<DrawMapEtl<'a>> {
        let font = if config.draw_labels {
            Some(Self::load_font(config)?)
        } else {
            None
        };

        Ok(DrawMapEtl {
            scene,
            display,
            config,
            projection: Projection::fit(&scene.extent, scene.width_px, scene.height_px),
            font,
        })
    }

    fn load_font(config: &RenderConfig) -> Result<fk::Font> {
        match &config.font_path {
            Some(path) => Ok(fk::Font::from_path(path, 0)?),
            None => {
                let handle = fk::SystemSource::new()
                    .select_best_match(&[fk::FamilyName::SansSerif], &fk::Properties::new())?;
                Ok(handle.load()?)
            },
        }
    }

    /// Converts a size in points to pixels at the configured resolution.
    fn px(&self, points: f32) -> f32 {
        points * self.config.dpi / POINTS_PER_INCH
    }

    fn stroke(width: f32, cap: LineCap) -> StrokeStyle {
        StrokeStyle {
            cap,
            join: LineJoin::Round,
            width,
            miter_limit: 2.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }

    fn polyline(&self, coords: &[MapCoords]) -> Option<raqote::Path> {
        if coords.len() < 2 {
            return None;
        }
        let mut pb = PathBuilder::new();
        let (x0, y0) = self.projection.project(&coords[0]);
        pb.move_to(x0, y0);

        for point in &coords[1..] {
            let (x, y) = self.projection.project(point);
            pb.line_to(x, y);
        }
        Some(pb.finish())
    }

    fn draw_background(&self, dt: &mut DrawTarget, basemap: Option<&OwnedImage>) {
        let extent = &self.scene.extent;
        let (x0, y0) = self.projection.project(&MapCoords::new(extent.north, extent.west));
        let (x1, y1) = self.projection.project(&MapCoords::new(extent.south, extent.east));

        let mut pb = PathBuilder::new();
        pb.rect(x0, y0, x1 - x0, y1 - y0);
        let frame = pb.finish();

        let draw_options = DrawOptions::new();
        dt.fill(&frame, &Source::Solid(self.config.theme.ocean_color), &draw_options);

        match (basemap, &self.config.basemap) {
            (Some(image), Some(bounds)) => {
                self.draw_basemap(dt, image, bounds, (x0, y0, x1, y1));
            },
            _ => {
                // No coastline data, so the whole frame is land
                dt.fill(&frame, &Source::Solid(self.config.theme.land_color), &draw_options);
            },
        }
    }

    /// Draws the part of the basemap that falls inside `frame` (x0, y0, x1, y1).
    /// Only that overlap is filled: a world image projected at network scale is
    /// tens of thousands of pixels across, far outside what raqote rasterises.
    fn draw_basemap(&self, dt: &mut DrawTarget, basemap: &OwnedImage, bounds: &BasemapConfig, frame: (f32, f32, f32, f32)) {
        let (bx0, by0) = self.projection.project(&MapCoords::new(bounds.north, bounds.west));
        let (bx1, by1) = self.projection.project(&MapCoords::new(bounds.south, bounds.east));
        if !(bx1 > bx0 && by1 > by0) || basemap.width <= 0 || basemap.height <= 0 {
            warn!(etl_name = ETL_NAME, basemap = bounds.path.as_str(); "Basemap bounds are empty, skipping");
            return;
        }

        let (fx0, fy0, fx1, fy1) = frame;
        let x0 = fx0.max(bx0);
        let y0 = fy0.max(by0);
        let x1 = fx1.min(bx1);
        let y1 = fy1.min(by1);
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        let img = Image {
            width: basemap.width,
            height: basemap.height,
            data: &basemap.data,
        };
        // Device pixels to basemap pixels
        let transform = Transform::translation(-bx0, -by0).then_scale(
            basemap.width as f32 / (bx1 - bx0),
            basemap.height as f32 / (by1 - by0),
        );

        let mut pb = PathBuilder::new();
        pb.rect(x0, y0, x1 - x0, y1 - y0);

        let mut draw_options = DrawOptions::new();
        draw_options.blend_mode = BlendMode::SrcOver;

        dt.fill(
            &pb.finish(),
            &Source::Image(img, ExtendMode::Pad, FilterMode::Bilinear, transform),
            &draw_options,
        );
    }

    fn draw_runway(&self, dt: &mut DrawTarget, runway: &RunwaySegment) {
        if let Some(path) = self.polyline(&runway.ends) {
            dt.stroke(
                &path,
                &Source::Solid(self.config.theme.runway_color),
                &Self::stroke(self.px(self.config.runway_width_pt), LineCap::Butt),
                &DrawOptions::new(),
            );
        }
    }

    fn draw_connection(&self, dt: &mut DrawTarget, connection: &ConnectionArc) {
        let color = if connection.mine {
            self.config.theme.connection_color_mine
        } else {
            self.config.theme.connection_color
        };
        if let Some(path) = self.polyline(&connection.path) {
            dt.stroke(
                &path,
                &Source::Solid(color),
                &Self::stroke(self.px(self.config.connection_width_pt), LineCap::Round),
                &DrawOptions::new(),
            );
        }
    }

    fn draw_site(&self, dt: &mut DrawTarget, marker: &SiteMarker) {
        let (x, y) = self.projection.project(&marker.position);
        let radius = self.px(self.config.site_marker_size_pt) / 2.0;

        let mut pb = PathBuilder::new();
        pb.arc(x, y, radius, 0.0, 2.0 * std::f32::consts::PI);
        pb.close();

        let color = if marker.mine {
            self.config.theme.site_color_mine
        } else {
            self.config.theme.site_color
        };
        dt.fill(&pb.finish(), &Source::Solid(color), &DrawOptions::new());
    }

    /// Draws `text` starting at `position`, vertically centred on it.
    /// Characters the font has no glyph for are skipped.
    fn draw_text(&self, dt: &mut DrawTarget, position: &MapCoords, point_size: f32, text: &str) -> Result<()> {
        let Some(font) = &self.font else {
            return Ok(());
        };
        let (x, y) = self.projection.project(position);
        let size = self.px(point_size);
        let metrics = font.metrics();
        let scale = size / metrics.units_per_em as f32;

        let mut start = fk::vec2f(x, y + metrics.cap_height * scale / 2.0);
        let mut ids = Vec::new();
        let mut positions = Vec::new();
        for c in text.chars() {
            let Some(id) = font.glyph_for_char(c) else {
                warn!(text = text, glyph = c.to_string().as_str(); "Font has no glyph, skipping");
                continue;
            };
            ids.push(id);
            positions.push(Point::new(start.x(), start.y()));
            start += font.advance(id)? * scale;
        }

        dt.draw_glyphs(
            font,
            size,
            &ids,
            &positions,
            &Source::Solid(self.config.theme.text_color),
            &DrawOptions::new(),
        );
        Ok(())
    }

    fn load_image(path: &Path) -> Result<OwnedImage> {
        let mut decoder = png::Decoder::new(File::open(path)?);
        decoder.set_transformations(Transformations::EXPAND);

        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;

        if info.bit_depth != BitDepth::Eight {
            return Err("Unsupported bit depth".into())
        }
        let channels = match info.color_type {
            ColorType::Rgba => 4,
            ColorType::Rgb => 3,
            other => return Err(format!("Unsupported basemap colour type {:?}", other).into()),
        };

        let data = buf[..info.buffer_size()]
            .chunks_exact(channels)
            .map(|px| {
                let a = if channels == 4 { px[3] } else { 0xff };
                premultiply(a, px[0], px[1], px[2])
            })
            .collect();

        Ok(OwnedImage {
            width: info.width.try_into()?,
            height: info.height.try_into()?,
            data,
        })
    }

    fn write_png(&self, dt: &DrawTarget, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(
            BufWriter::new(file),
            dt.width().try_into()?,
            dt.height().try_into()?,
        );
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.add_text_chunk("Title".to_string(), self.display.title.clone())?;

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&unpremultiply(dt.get_data()))?;
        writer.finish()?;
        Ok(())
    }
}

/// Packs straight-alpha RGBA into raqote's premultiplied ARGB.
fn premultiply(a: u8, r: u8, g: u8, b: u8) -> u32 {
    let alpha = u32::from(a);
    let channel = |c: u8| (u32::from(c) * alpha + 127) / 255;
    (alpha << 24) | (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Unpacks raqote's premultiplied ARGB into straight-alpha RGBA bytes.
fn unpremultiply(data: &[u32]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len() * 4);
    for pixel in data {
        let a = (pixel >> 24) & 0xff;
        let channel = |shift: u32| {
            let c = (pixel >> shift) & 0xff;
            if a == 0 {
                0
            } else {
                ((c * 255 + a / 2) / a).min(255) as u8
            }
        };
        rgba.extend_from_slice(&[channel(16), channel(8), channel(0), a as u8]);
    }
    rgba
}

impl Etl for DrawMapEtl<'_> {
    type Input = Option<OwnedImage>;

    type Output = DrawTarget;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.display.output_file_name())
    }

    fn extract(&mut self) -> Result<Self::Input> {
        match &self.config.basemap {
            Some(basemap) => {
                info!(etl_name = ETL_NAME, basemap = basemap.path.as_str(); "Loading basemap");
                Ok(Some(Self::load_image(Path::new(&basemap.path))?))
            },
            None => Ok(None),
        }
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut dt = DrawTarget::new(
            self.scene.width_px.try_into()?,
            self.scene.height_px.try_into()?
        );

        dt.clear(SolidSource::from_unpremultiplied_argb(
            0xff, 0xff, 0xff, 0xff,
        ));

        self.draw_background(&mut dt, input.as_ref());

        for runway in &self.scene.runways {
            self.draw_runway(&mut dt, runway);
        }
        for connection in &self.scene.connections {
            self.draw_connection(&mut dt, connection);
        }
        for marker in &self.scene.markers {
            self.draw_site(&mut dt, marker);
        }
        for marker in &self.scene.markers {
            self.draw_text(&mut dt, &marker.label_position, self.config.label_size_pt, &marker.label)?;
        }
        if let Some(annotation) = &self.scene.annotation {
            self.draw_text(&mut dt, &annotation.position, self.config.label_size_pt, &annotation.text)?;
        }
        Ok(dt)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        create_dir_all(dir)?;
        self.write_png(&output, &self.output_path(dir))
    }
}
