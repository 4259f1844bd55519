use std::borrow::Cow;
use std::sync::Arc;

use crate::assets::fonts::{FontSet, MicrGlyphs};
use crate::foundation::core::Rgba8Premul;
use crate::format::micr::symbols_to_letters;
use crate::layout::directives::FontRole;
use crate::layout::metrics::{ApproxMetrics, TextMeasure};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8Premul> for TextBrushRgba8 {
    fn from(c: Rgba8Premul) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

struct RoleFace {
    family: String,
    bold: bool,
    letters: bool,
    font: vello_cpu::peniko::FontData,
}

/// Parley contexts plus the faces registered for each [`FontRole`].
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    faces: [Option<RoleFace>; 3],
}

fn role_index(role: FontRole) -> usize {
    match role {
        FontRole::Regular => 0,
        FontRole::Bold => 1,
        FontRole::Micr => 2,
    }
}

impl TextLayoutEngine {
    /// Register every face in `fonts`. Faces whose bytes Parley cannot read are skipped.
    pub fn new(fonts: &FontSet) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let mut registered: Vec<(Arc<Vec<u8>>, String)> = Vec::new();
        let mut faces: [Option<RoleFace>; 3] = [None, None, None];

        for role in [FontRole::Regular, FontRole::Bold, FontRole::Micr] {
            let Some(face) = fonts.face(role) else {
                continue;
            };
            let known = registered
                .iter()
                .find(|(bytes, _)| Arc::ptr_eq(bytes, &face.bytes))
                .map(|(_, family)| family.clone());
            let family = match known {
                Some(f) => f,
                None => {
                    let families = font_ctx.collection.register_fonts(
                        parley::fontique::Blob::from(face.bytes.as_ref().clone()),
                        None,
                    );
                    let name = match families.first() {
                        Some((id, _)) => font_ctx.collection.family_name(*id).map(str::to_string),
                        None => None,
                    };
                    let Some(name) = name else {
                        tracing::warn!(?role, "font bytes did not register a family; skipping face");
                        continue;
                    };
                    registered.push((Arc::clone(&face.bytes), name.clone()));
                    name
                }
            };

            let font = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                face.index,
            );
            faces[role_index(role)] = Some(RoleFace {
                family,
                bold: role == FontRole::Bold && fonts.bold.is_some(),
                letters: role == FontRole::Micr
                    && fonts.has_micr_face()
                    && face.micr_glyphs == MicrGlyphs::Letters,
                font,
            });
        }

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            faces,
        }
    }

    pub fn has_face(&self, role: FontRole) -> bool {
        self.faces[role_index(role)].is_some()
    }

    pub fn has_any_face(&self) -> bool {
        self.faces.iter().any(Option::is_some)
    }

    pub(crate) fn font_data(&self, role: FontRole) -> Option<&vello_cpu::peniko::FontData> {
        self.faces[role_index(role)].as_ref().map(|f| &f.font)
    }

    /// Text as it must be shaped for `role`'s face.
    pub fn shaped_text<'a>(&self, text: &'a str, role: FontRole) -> Cow<'a, str> {
        match &self.faces[role_index(role)] {
            Some(face) if face.letters => Cow::Owned(symbols_to_letters(text)),
            _ => Cow::Borrowed(text),
        }
    }

    /// Lay out one unwrapped line. Returns `None` when `role` has no face.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        role: FontRole,
        size_pt: f32,
        brush: TextBrushRgba8,
    ) -> Option<parley::Layout<TextBrushRgba8>> {
        if !size_pt.is_finite() || size_pt <= 0.0 {
            return None;
        }
        let shaped = self.shaped_text(text, role).into_owned();
        let face = self.faces[role_index(role)].as_ref()?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &shaped, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_pt));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if face.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(&shaped);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Some(layout)
    }
}

/// [`TextMeasure`] backed by shaped Parley layouts, estimating for roles without a face.
pub struct ParleyMeasure<'a> {
    engine: &'a mut TextLayoutEngine,
}

impl<'a> ParleyMeasure<'a> {
    pub fn new(engine: &'a mut TextLayoutEngine) -> Self {
        Self { engine }
    }
}

impl TextMeasure for ParleyMeasure<'_> {
    fn width(&mut self, text: &str, role: FontRole, size_pt: f64) -> f64 {
        match self
            .engine
            .layout_line(text, role, size_pt as f32, TextBrushRgba8::default())
        {
            Some(layout) => f64::from(layout.width()),
            None => ApproxMetrics.width(text, role, size_pt),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
