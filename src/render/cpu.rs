use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::request::Resources;
use crate::foundation::core::{Affine, LogicalSize, Point, Rect, Rgba8Premul};
use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layout::directives::{DrawDirective, DrawList, ImageSlot, TextAlign, TextRun};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};

/// A rendered frame in CPU memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Executes a [`DrawList`] onto a fresh pixmap with `vello_cpu`.
pub struct CpuRasterizer<'a> {
    text: &'a mut TextLayoutEngine,
    resources: &'a Resources,
    paper: Rgba8Premul,
}

impl<'a> CpuRasterizer<'a> {
    pub fn new(
        text: &'a mut TextLayoutEngine,
        resources: &'a Resources,
        paper: Rgba8Premul,
    ) -> Self {
        Self {
            text,
            resources,
            paper,
        }
    }

    /// Rasterize `list` at `scale`. Pixel size is `list.size().pixel_size(scale)`.
    #[tracing::instrument(skip_all, fields(scale = scale, directives = list.len()))]
    pub fn rasterize(&mut self, list: &DrawList, scale: f64) -> CheckForgeResult<FrameRGBA> {
        let canvas = list.size().pixel_size(scale)?;
        let (w, h) = (to_u16(canvas.width)?, to_u16(canvas.height)?);
        let base = LogicalSize::points_to_pixels(scale);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(self.paper));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        let mut skipped_text = 0usize;
        for d in list.directives() {
            match d {
                DrawDirective::Image { slot, rect } => {
                    let img = match slot {
                        ImageSlot::Background => self.resources.background.as_ref(),
                        ImageSlot::Logo => self.resources.logo.as_ref(),
                    };
                    if let Some(img) = img
                        && let Err(err) = draw_image(&mut ctx, base, img, *rect)
                    {
                        tracing::warn!(?slot, error = %err, "image not drawable, skipping");
                    }
                }
                DrawDirective::Rule {
                    from,
                    to,
                    width,
                    color,
                } => {
                    ctx.set_transform(affine_to_cpu(base));
                    ctx.set_paint(cpu_color(*color));
                    if let Some(path) = rule_path(*from, *to, *width) {
                        ctx.fill_path(&path);
                    }
                }
                DrawDirective::Frame { rect, width, color } => {
                    ctx.set_transform(affine_to_cpu(base));
                    ctx.set_paint(cpu_color(*color));
                    for edge in frame_edges(*rect, *width) {
                        ctx.fill_rect(&rect_to_cpu(edge));
                    }
                }
                DrawDirective::Text(run) => {
                    if !self.draw_text(&mut ctx, base, run) {
                        skipped_text += 1;
                    }
                }
            }
        }
        if skipped_text > 0 {
            tracing::warn!(skipped_text, "text runs without a usable font were not painted");
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_text(&mut self, ctx: &mut vello_cpu::RenderContext, base: Affine, run: &TextRun) -> bool {
        let Some(layout) = self.text.layout_line(
            &run.text,
            run.role,
            run.size_pt as f32,
            TextBrushRgba8::from(run.color),
        ) else {
            return false;
        };
        let Some(font) = self.text.font_data(run.role) else {
            return false;
        };

        let width = f64::from(layout.width());
        let x = match run.align {
            TextAlign::Start => run.origin.x,
            TextAlign::Center => run.origin.x - width / 2.0,
            TextAlign::End => run.origin.x - width,
        };
        ctx.set_transform(affine_to_cpu(base * Affine::translate((x, run.origin.y))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let brush = glyph_run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        true
    }
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    base: Affine,
    img: &PreparedImage,
    rect: Rect,
) -> CheckForgeResult<()> {
    if img.width == 0 || img.height == 0 {
        return Ok(());
    }
    let (iw, ih) = (f64::from(img.width), f64::from(img.height));
    let place = Affine::translate((rect.x0, rect.y0))
        * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    ctx.set_transform(affine_to_cpu(base * place));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    Ok(())
}

/// Quad covering a line segment of `width` points.
fn rule_path(from: Point, to: Point, width: f64) -> Option<vello_cpu::kurbo::BezPath> {
    let d = to - from;
    let len = d.hypot();
    if len <= 0.0 || width <= 0.0 {
        return None;
    }
    let n = crate::foundation::core::Vec2::new(-d.y, d.x) * (width / 2.0 / len);
    let corners = [from + n, to + n, to - n, from - n];

    let mut p = vello_cpu::kurbo::BezPath::new();
    p.move_to(vello_cpu::kurbo::Point::new(corners[0].x, corners[0].y));
    for c in &corners[1..] {
        p.line_to(vello_cpu::kurbo::Point::new(c.x, c.y));
    }
    p.close_path();
    Some(p)
}

/// Four non-overlapping edge strips of an outline centered on `rect`'s border.
fn frame_edges(rect: Rect, width: f64) -> [Rect; 4] {
    let hw = width / 2.0;
    [
        Rect::new(rect.x0 - hw, rect.y0 - hw, rect.x1 + hw, rect.y0 + hw),
        Rect::new(rect.x0 - hw, rect.y1 - hw, rect.x1 + hw, rect.y1 + hw),
        Rect::new(rect.x0 - hw, rect.y0 + hw, rect.x0 + hw, rect.y1 - hw),
        Rect::new(rect.x1 - hw, rect.y0 + hw, rect.x1 + hw, rect.y1 - hw),
    ]
}

fn to_u16(v: u32) -> CheckForgeResult<u16> {
    v.try_into()
        .map_err(|_| CheckForgeError::render(format!("surface edge {v} exceeds u16")))
}

fn cpu_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    // `Color` takes straight alpha.
    let mut px = c.to_array();
    unpremultiply_rgba8_in_place(&mut px);
    let [r, g, b, a] = px;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CheckForgeResult<vello_cpu::Pixmap> {
    let w = to_u16(width)?;
    let h = to_u16(height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CheckForgeError::render("image byte length mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
