//! Fonts for the rasterizer.
//!
//! A [`FontSet`] is an ordered fallback chain: each character is drawn with
//! the first face that has a glyph for it. Faces come from explicit files or
//! from the system font database.

use crate::{ExportError, ExportResult};
use ab_glyph::{Font, FontArc, FontVec, GlyphId, PxScale, ScaleFont};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Families looked up, in order, when fonts come from the system.
pub const PREFERRED_FAMILIES: &[&str] = &[
    "Noto Sans CJK SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
    "PingFang SC",
    "Microsoft YaHei",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Arial",
];

#[derive(Clone)]
pub struct FontSet {
    faces: Vec<FontArc>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("faces", &self.faces.len())
            .finish()
    }
}

fn parse(data: Vec<u8>, index: u32) -> ExportResult<FontArc> {
    FontVec::try_from_vec_and_index(data, index)
        .map(FontArc::new)
        .map_err(|e| ExportError::Raster(format!("invalid font data: {}", e)))
}

impl FontSet {
    /// Fails when `faces` is empty: there is nothing to draw text with.
    pub fn new(faces: Vec<FontArc>) -> ExportResult<Self> {
        if faces.is_empty() {
            return Err(ExportError::Raster("no usable font found".to_string()));
        }
        Ok(Self { faces })
    }

    pub fn from_bytes(data: Vec<u8>) -> ExportResult<Self> {
        Self::new(vec![parse(data, 0)?])
    }

    /// One face per file, in fallback order.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> ExportResult<Self> {
        let faces = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let data = std::fs::read(path)
                    .map_err(|e| ExportError::Raster(format!("{}: {}", path.display(), e)))?;
                parse(data, 0).map_err(|e| ExportError::Raster(format!("{}: {}", path.display(), e)))
            })
            .collect::<ExportResult<Vec<_>>>()?;
        Self::new(faces)
    }

    /// Faces installed on this machine.
    pub fn system() -> ExportResult<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system font database");
        Self::from_database(&db)
    }

    /// The configured files if any, the system fonts otherwise.
    pub fn discover<P: AsRef<Path>>(paths: &[P]) -> ExportResult<Self> {
        if paths.is_empty() {
            Self::system()
        } else {
            Self::from_paths(paths)
        }
    }

    pub fn from_database(db: &fontdb::Database) -> ExportResult<Self> {
        let mut ids = Vec::new();
        for family in PREFERRED_FAMILIES {
            let query = fontdb::Query {
                families: &[fontdb::Family::Name(family)],
                weight: fontdb::Weight::NORMAL,
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            };
            if let Some(id) = db.query(&query) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        if ids.is_empty() {
            // None of the preferred families is installed.
            ids.extend(db.faces().map(|face| face.id).next());
        }

        let faces = ids
            .into_iter()
            .filter_map(|id| db.with_face_data(id, |data, index| parse(data.to_vec(), index)))
            .filter_map(|face| match face {
                Ok(face) => Some(face),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable font face");
                    None
                }
            })
            .collect();
        Self::new(faces)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The face that draws `c`. Falls back to the primary face, which then
    /// draws its missing-glyph box.
    pub fn face_for(&self, c: char) -> (&FontArc, GlyphId) {
        for face in &self.faces {
            let id = face.glyph_id(c);
            if id.0 != 0 {
                return (face, id);
            }
        }
        let primary = &self.faces[0];
        (primary, primary.glyph_id(c))
    }

    pub fn covers(&self, c: char) -> bool {
        self.faces.iter().any(|face| face.glyph_id(c).0 != 0)
    }

    pub fn advance(&self, c: char, size: f32) -> f32 {
        let (face, id) = self.face_for(c);
        face.as_scaled(PxScale::from(size)).h_advance(id)
    }

    /// Ascent and descent of the primary face at `size`. Descent is negative.
    pub fn vertical_metrics(&self, size: f32) -> (f32, f32) {
        let scaled = self.faces[0].as_scaled(PxScale::from(size));
        (scaled.ascent(), scaled.descent())
    }
}
