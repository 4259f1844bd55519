use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{LogicalSize, Point, Rect, Rgba8Premul};

const XXH3_SEED: u64 = 0x5f1c_0e3a_9b27_d4c1;

/// Which font a text run is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FontRole {
    Regular,
    Bold,
    Micr,
}

/// Horizontal anchoring of a text run relative to its origin `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TextAlign {
    Start,
    Center,
    End,
}

/// Image placeholder filled by the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageSlot {
    Background,
    Logo,
}

/// One line of text. `origin.y` is the top of the line box.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub role: FontRole,
    pub size_pt: f64,
    pub align: TextAlign,
    pub color: Rgba8Premul,
}

/// A single visual primitive in logical units (points).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum DrawDirective {
    /// Draw the image bound to `slot`, scaled into `rect`.
    Image { slot: ImageSlot, rect: Rect },
    /// Straight line of `width` points.
    Rule {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8Premul,
    },
    /// Stroked rectangle outline.
    Frame {
        rect: Rect,
        width: f64,
        color: Rgba8Premul,
    },
    Text(TextRun),
}

/// Stable 128-bit digest of a [`DrawList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawListFingerprint {
    pub hi: u64,
    pub lo: u64,
}

/// Ordered directives for one check. Images always come first.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DrawList {
    size: LogicalSize,
    directives: Vec<DrawDirective>,
}

impl DrawList {
    /// Assemble a list from image placements followed by content directives.
    pub fn from_parts(
        size: LogicalSize,
        images: Vec<DrawDirective>,
        content: Vec<DrawDirective>,
    ) -> Self {
        debug_assert!(
            images
                .iter()
                .all(|d| matches!(d, DrawDirective::Image { .. }))
        );
        let mut directives = images;
        directives.extend(
            content
                .into_iter()
                .filter(|d| !matches!(d, DrawDirective::Image { .. })),
        );
        Self { size, directives }
    }

    pub fn size(&self) -> LogicalSize {
        self.size
    }

    pub fn directives(&self) -> &[DrawDirective] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.directives.iter().filter_map(|d| match d {
            DrawDirective::Text(t) => Some(t),
            _ => None,
        })
    }

    /// First text run whose content starts with `prefix`.
    pub fn find_text(&self, prefix: &str) -> Option<&TextRun> {
        self.text_runs().find(|t| t.text.starts_with(prefix))
    }

    pub fn image_slots(&self) -> impl Iterator<Item = ImageSlot> + '_ {
        self.directives.iter().filter_map(|d| match d {
            DrawDirective::Image { slot, .. } => Some(*slot),
            _ => None,
        })
    }

    pub fn fingerprint(&self) -> DrawListFingerprint {
        let mut h = StableHasher::new();
        h.write_f64(self.size.width_pt);
        h.write_f64(self.size.height_pt);
        h.write_u32(self.directives.len() as u32);
        for d in &self.directives {
            write_directive(&mut h, d);
        }
        h.finish()
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_bits().to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn write_point(&mut self, p: Point) {
        self.write_f64(p.x);
        self.write_f64(p.y);
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_color(&mut self, c: Rgba8Premul) {
        self.write_bytes(&c.to_array());
    }

    fn finish(self) -> DrawListFingerprint {
        let v = self.inner.digest128();
        DrawListFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_directive(h: &mut StableHasher, d: &DrawDirective) {
    match d {
        DrawDirective::Image { slot, rect } => {
            h.write_u8(1);
            h.write_u8(match slot {
                ImageSlot::Background => 0,
                ImageSlot::Logo => 1,
            });
            h.write_rect(*rect);
        }
        DrawDirective::Rule {
            from,
            to,
            width,
            color,
        } => {
            h.write_u8(2);
            h.write_point(*from);
            h.write_point(*to);
            h.write_f64(*width);
            h.write_color(*color);
        }
        DrawDirective::Frame { rect, width, color } => {
            h.write_u8(3);
            h.write_rect(*rect);
            h.write_f64(*width);
            h.write_color(*color);
        }
        DrawDirective::Text(t) => {
            h.write_u8(4);
            h.write_str(&t.text);
            h.write_point(t.origin);
            h.write_u8(match t.role {
                FontRole::Regular => 0,
                FontRole::Bold => 1,
                FontRole::Micr => 2,
            });
            h.write_f64(t.size_pt);
            h.write_u8(match t.align {
                TextAlign::Start => 0,
                TextAlign::Center => 1,
                TextAlign::End => 2,
            });
            h.write_color(t.color);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/directives.rs"]
mod tests;
