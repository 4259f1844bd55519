use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::layout::directives::FontRole;

/// Family names commonly used by installed E-13B MICR fonts.
pub const MICR_FAMILY_NAMES: &[&str] = &["MICR Encoding", "GnuMICR", "MICR E13B", "MICR"];

/// How a MICR face encodes the four E-13B control symbols.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MicrGlyphs {
    /// Symbols live at U+2446..U+2449.
    #[default]
    Unicode,
    /// Symbols are mapped onto the letters `A`..`D`.
    Letters,
}

/// One font face: raw font file bytes plus the face index inside a collection.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
    pub micr_glyphs: MicrGlyphs,
}

impl FontFace {
    pub fn new(bytes: Vec<u8>, index: u32) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index,
            micr_glyphs: MicrGlyphs::Unicode,
        }
    }

    pub fn with_micr_glyphs(mut self, glyphs: MicrGlyphs) -> Self {
        self.micr_glyphs = glyphs;
        self
    }
}

/// Faces used to draw a check. Missing roles fall back to `regular`.
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    pub regular: Option<FontFace>,
    pub bold: Option<FontFace>,
    pub micr: Option<FontFace>,
}

impl FontSet {
    /// Face to draw `role` with, if any face is available.
    pub fn face(&self, role: FontRole) -> Option<&FontFace> {
        let primary = match role {
            FontRole::Regular => self.regular.as_ref(),
            FontRole::Bold => self.bold.as_ref(),
            FontRole::Micr => self.micr.as_ref(),
        };
        primary.or(self.regular.as_ref()).or(self.bold.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_none() && self.bold.is_none() && self.micr.is_none()
    }

    /// True when the MICR line must be drawn through a dedicated MICR face.
    pub fn has_micr_face(&self) -> bool {
        self.micr.is_some()
    }
}

/// Source of the fonts a render draws text with.
pub trait FontLoader: Send + Sync {
    fn load(&self) -> CheckForgeResult<FontSet>;
}

/// Loader that provides no fonts. Text directives are laid out but not painted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFonts;

impl FontLoader for NoFonts {
    fn load(&self) -> CheckForgeResult<FontSet> {
        Ok(FontSet::default())
    }
}

/// Loads `.ttf`/`.otf`/`.ttc` files from one directory.
///
/// Files are classified by name: a stem containing `micr` or `e13b` is the MICR face
/// (letter-mapped symbols), a stem containing `bold` is the bold face, and the first
/// remaining file in name order is the regular face.
#[derive(Clone, Debug)]
pub struct FsFontLoader {
    dir: PathBuf,
}

impl FsFontLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FontLoader for FsFontLoader {
    fn load(&self) -> CheckForgeResult<FontSet> {
        let rd = std::fs::read_dir(&self.dir).map_err(|e| {
            CheckForgeError::resource_load(format!(
                "read font dir '{}': {e}",
                self.dir.display()
            ))
        })?;

        let mut files: Vec<PathBuf> = rd
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && is_font_file(p))
            .collect();
        files.sort();

        let mut set = FontSet::default();
        for path in files {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            let slot = if stem.contains("micr") || stem.contains("e13b") {
                &mut set.micr
            } else if stem.contains("bold") {
                &mut set.bold
            } else {
                &mut set.regular
            };
            if slot.is_some() {
                continue;
            }
            let bytes = std::fs::read(&path).map_err(|e| {
                CheckForgeError::resource_load(format!("read font '{}': {e}", path.display()))
            })?;
            let mut face = FontFace::new(bytes, 0);
            if stem.contains("micr") || stem.contains("e13b") {
                face = face.with_micr_glyphs(MicrGlyphs::Letters);
            }
            tracing::debug!(path = %path.display(), "loaded font file");
            *slot = Some(face);
        }

        if set.is_empty() {
            return Err(CheckForgeError::resource_load(format!(
                "no font files in '{}'",
                self.dir.display()
            )));
        }
        Ok(set)
    }
}

fn is_font_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc")
}

/// Picks faces from the fonts installed on the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemFontLoader;

impl FontLoader for SystemFontLoader {
    fn load(&self) -> CheckForgeResult<FontSet> {
        use usvg::fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();
        if db.is_empty() {
            return Err(CheckForgeError::resource_load("no system fonts installed"));
        }

        let face_for = |families: &[Family<'_>], weight: Weight| -> Option<FontFace> {
            let id = db.query(&Query {
                families,
                weight,
                stretch: Stretch::Normal,
                style: Style::Normal,
            })?;
            db.with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
        };

        let sans = [Family::SansSerif, Family::Serif];
        let micr_families: Vec<Family<'_>> =
            MICR_FAMILY_NAMES.iter().map(|n| Family::Name(*n)).collect();

        let set = FontSet {
            regular: face_for(&sans, Weight::NORMAL),
            bold: face_for(&sans, Weight::BOLD),
            micr: face_for(&micr_families, Weight::NORMAL)
                .map(|f| f.with_micr_glyphs(MicrGlyphs::Letters)),
        };
        if set.is_empty() {
            return Err(CheckForgeError::resource_load(
                "no usable sans-serif system font",
            ));
        }
        if set.micr.is_none() {
            tracing::debug!("no MICR system font; MICR line uses the regular face");
        }
        Ok(set)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
