//! Rasterization of an offscreen surface.

use crate::font::FontSet;
use crate::host::OffscreenSurface;
use crate::{ExportError, ExportResult};
use ab_glyph::{point, Font, FontArc, GlyphId, PxScale};
use async_trait::async_trait;
use consent_document::{ExportBlock, ExportLayout, Rgb};
use std::path::Path;
use tracing::{debug, warn};

/// Largest output edge in device pixels.
pub const MAX_DIMENSION: u32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Device pixels per logical pixel.
    pub scale: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { scale: 2 }
    }
}

/// Straight RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some(Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize the surface's content. Blocks tagged for exclusion are
    /// skipped.
    async fn rasterize(
        &self,
        surface: &OffscreenSurface,
        options: &RasterOptions,
    ) -> ExportResult<RasterImage>;
}

/// Paints captured blocks with real glyph outlines from a [`FontSet`].
#[derive(Debug, Clone)]
pub struct GlyphRasterizer {
    fonts: FontSet,
}

impl GlyphRasterizer {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }

    /// Fonts from `paths`, or the system fonts when `paths` is empty.
    pub fn discover<P: AsRef<Path>>(paths: &[P]) -> ExportResult<Self> {
        Ok(Self::new(FontSet::discover(paths)?))
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }
}

#[async_trait]
impl Rasterizer for GlyphRasterizer {
    async fn rasterize(
        &self,
        surface: &OffscreenSurface,
        options: &RasterOptions,
    ) -> ExportResult<RasterImage> {
        let layout = surface.layout()?.clone();
        let fonts = self.fonts.clone();
        let scale = options.scale.max(1);
        tokio::task::spawn_blocking(move || paint(&layout, scale, &fonts))
            .await
            .map_err(|e| ExportError::Raster(e.to_string()))?
    }
}

type Line = Vec<(char, f32)>;

struct Placed<'a> {
    block: &'a ExportBlock,
    y: u32,
    height: u32,
    lines: Vec<Line>,
}

fn line_height(block: &ExportBlock) -> u32 {
    block.style.font_size_px * 3 / 2
}

/// Greedy wrap at glyph boundaries. Newlines always break.
fn wrap(text: &str, fonts: &FontSet, font_size: f32, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = Vec::new();
        let mut used = 0.0;
        for c in paragraph.chars() {
            let w = fonts.advance(c, font_size);
            if used + w > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                used = 0.0;
            }
            line.push((c, w));
            used += w;
        }
        lines.push(line);
    }
    lines
}

fn place<'a>(layout: &'a ExportLayout, fonts: &FontSet) -> (Vec<Placed<'a>>, u32) {
    let content_width = layout.width.saturating_sub(layout.padding_px * 2);
    let mut y = layout.padding_px;
    let mut placed = Vec::new();
    for block in layout.captured() {
        let style = &block.style;
        let border = u32::from(style.border.is_some());
        let inner = content_width.saturating_sub((style.padding_px + border) * 2);
        let lines = wrap(
            &block.text,
            fonts,
            style.font_size_px as f32,
            inner.max(style.font_size_px) as f32,
        );
        let height = lines.len() as u32 * line_height(block) + (style.padding_px + border) * 2;
        placed.push(Placed {
            block,
            y,
            height,
            lines,
        });
        y += height + style.margin_bottom_px;
    }
    (placed, y + layout.padding_px)
}

struct Canvas {
    width: u32,
    height: u32,
    scale: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32, scale: u32, background: Rgb) -> Self {
        let (w, h) = (width * scale, height * scale);
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for _ in 0..(w * h) {
            pixels.extend_from_slice(&[background.0, background.1, background.2, 255]);
        }
        Self {
            width: w,
            height: h,
            scale,
            pixels,
        }
    }

    /// Fill a rectangle given in logical pixels, clipped to the canvas.
    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        let s = self.scale;
        let x1 = ((x + w) * s).min(self.width);
        let y1 = ((y + h) * s).min(self.height);
        for py in (y * s).min(y1)..y1 {
            for px in (x * s).min(x1)..x1 {
                let i = ((py * self.width + px) * 4) as usize;
                self.pixels[i..i + 3].copy_from_slice(&[color.0, color.1, color.2]);
            }
        }
    }

    fn outline(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
        if w == 0 || h == 0 {
            return;
        }
        self.fill(x, y, w, 1, color);
        self.fill(x, y + h - 1, w, 1, color);
        self.fill(x, y, 1, h, color);
        self.fill(x + w - 1, y, 1, h, color);
    }

    /// Mix `color` into one device pixel by `coverage`.
    fn blend(&mut self, x: i64, y: i64, color: Rgb, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let a = coverage.clamp(0.0, 1.0);
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        for (channel, value) in [color.0, color.1, color.2].into_iter().enumerate() {
            let under = f32::from(self.pixels[i + channel]);
            self.pixels[i + channel] = (under + (f32::from(value) - under) * a).round() as u8;
        }
    }

    /// Draw one glyph with its baseline origin at device coordinates.
    fn glyph(&mut self, face: &FontArc, id: GlyphId, size: f32, origin: (f32, f32), color: Rgb) {
        let glyph = id.with_scale_and_position(PxScale::from(size), point(origin.0, origin.1));
        if let Some(outlined) = face.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                self.blend(left + i64::from(gx), top + i64::from(gy), color, coverage);
            });
        }
    }
}

/// Lay out and paint `layout` at `scale`.
pub fn paint(layout: &ExportLayout, scale: u32, fonts: &FontSet) -> ExportResult<RasterImage> {
    let (placed, height) = place(layout, fonts);
    let (device_w, device_h) = (
        layout.width.saturating_mul(scale),
        height.saturating_mul(scale),
    );
    if device_w == 0 || device_h == 0 || device_w > MAX_DIMENSION || device_h > MAX_DIMENSION {
        return Err(ExportError::Raster(format!(
            "surface of {}x{} device pixels cannot be rasterized",
            device_w, device_h
        )));
    }

    let mut canvas = Canvas::new(layout.width, height, scale, layout.background);
    let s = scale as f32;
    let x = layout.padding_px;
    let width = layout.width.saturating_sub(layout.padding_px * 2);
    let mut missing = 0usize;
    for item in &placed {
        let style = &item.block.style;
        if let Some(bg) = style.background {
            canvas.fill(x, item.y, width, item.height, bg);
        }
        let border = match style.border {
            Some(color) => {
                canvas.outline(x, item.y, width, item.height, color);
                1
            }
            None => 0,
        };

        let f = style.font_size_px as f32;
        let (ascent, descent) = fonts.vertical_metrics(f);
        let lh = line_height(item.block) as f32;
        let baseline = (lh - (ascent - descent)) / 2.0 + ascent;
        let mut line_y = (item.y + style.padding_px + border) as f32;
        for line in &item.lines {
            let mut pen = (x + style.padding_px + border) as f32;
            for &(c, advance) in line {
                if !c.is_whitespace() {
                    if !fonts.covers(c) {
                        missing += 1;
                    }
                    let (face, id) = fonts.face_for(c);
                    let origin = (pen * s, (line_y + baseline) * s);
                    canvas.glyph(face, id, f * s, origin, style.color);
                    if style.bold {
                        canvas.glyph(face, id, f * s, (origin.0 + s / 2.0, origin.1), style.color);
                    }
                }
                pen += advance;
            }
            line_y += lh;
        }
    }

    if missing > 0 {
        warn!(missing, "characters without a glyph in any configured font");
    }
    debug!(
        width = canvas.width,
        height = canvas.height,
        blocks = placed.len(),
        "rasterized surface"
    );
    Ok(RasterImage {
        width: canvas.width,
        height: canvas.height,
        pixels: canvas.pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::testing::fonts;
    use crate::host::HostDocument;
    use consent_document::{
        project, DisplaySettings, ExportRenderer, Renderer, SignatureView,
    };
    use consent_types::{ConsentRecord, NewConsentRecord, Party, PartySlot, RecordId};

    fn layout(signed: bool) -> ExportLayout {
        let draft = NewConsentRecord {
            title: "协议".into(),
            date: "2024-03-05".into(),
            party_a: Party::new("Alice", "110101199003071234"),
            party_b: Party::new("Bob", "11010119900307123X"),
            consent_details: "一\n二".into(),
            privacy_terms: "p".into(),
            revocation_terms: "r".into(),
            ..Default::default()
        };
        let mut record = ConsentRecord::from_draft(draft, RecordId::from("r"), chrono::Utc::now());
        if signed {
            record.mark_signed(PartySlot::A, chrono::Utc::now());
        }
        let tree = project(&record, &SignatureView::of(&record), &DisplaySettings::china());
        ExportRenderer::default().render(&tree).unwrap()
    }

    fn dark_pixels(image: &RasterImage) -> usize {
        (0..image.height)
            .flat_map(|y| (0..image.width).map(move |x| (x, y)))
            .filter_map(|(x, y)| image.pixel(x, y))
            .filter(|p| p.0 < 128 && p.1 < 128 && p.2 < 128)
            .count()
    }

    #[test]
    fn wrap_breaks_on_newlines_and_width() {
        let fonts = fonts();
        let w = fonts.advance('a', 10.0);
        let lines = wrap("ab\naaaa", &fonts, 10.0, w * 2.5);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].len(), 2);
        assert_eq!(lines[2].len(), 2);
    }

    #[test]
    fn output_is_scaled_and_white_at_the_edge() {
        let image = paint(&layout(false), 2, &fonts()).unwrap();
        assert_eq!(image.width, 1600);
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
        assert_eq!(image.pixel(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn text_is_drawn_from_glyph_outlines() {
        let fonts = fonts();
        let mut blank = layout(false);
        for block in &mut blank.blocks {
            block.text = block.text.chars().map(|_| ' ').collect();
        }
        let text = paint(&layout(false), 1, &fonts).unwrap();
        let spaces = paint(&blank, 1, &fonts).unwrap();
        assert_eq!(dark_pixels(&spaces), 0);
        assert!(dark_pixels(&text) > 100);

        // Anti-aliased edges leave intermediate shades, not just on/off cells.
        let greys = text
            .pixels
            .chunks(4)
            .filter(|p| p[0] > 40 && p[0] < 200 && p[0] == p[1] && p[1] == p[2])
            .count();
        assert!(greys > 0);
    }

    #[test]
    fn different_text_paints_different_pixels() {
        let fonts = fonts();
        let mut other = layout(false);
        for block in &mut other.blocks {
            block.text = block.text.replace("Alice", "Xerxe");
        }
        assert_ne!(paint(&layout(false), 1, &fonts).unwrap(), paint(&other, 1, &fonts).unwrap());
    }

    #[test]
    fn excluded_badges_do_not_change_the_image() {
        let full = layout(true);
        let mut captured_only = full.clone();
        captured_only
            .blocks
            .retain(|b| b.capture == consent_document::Capture::Include);
        assert!(captured_only.blocks.len() < full.blocks.len());
        let fonts = fonts();
        assert_eq!(paint(&full, 1, &fonts).unwrap(), paint(&captured_only, 1, &fonts).unwrap());
    }

    #[test]
    fn oversized_surfaces_are_rejected() {
        let mut l = layout(false);
        l.width = MAX_DIMENSION;
        assert!(matches!(paint(&l, 2, &fonts()), Err(ExportError::Raster(_))));
    }

    #[tokio::test]
    async fn glyph_rasterizer_reads_the_surface() {
        let host = HostDocument::new();
        let mut surface = host.mount_surface(800);
        surface.render_into(layout(false));
        let image = GlyphRasterizer::new(fonts())
            .rasterize(&surface, &RasterOptions::default())
            .await
            .unwrap();
        assert_eq!(image.width, 1600);
    }

    #[test]
    fn configured_font_paths_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.ttf");
        std::fs::write(&path, crate::font::testing::FIXTURE).unwrap();
        let rasterizer = GlyphRasterizer::discover(&[&path]).unwrap();
        assert!(rasterizer.fonts().covers('A'));
    }
}
