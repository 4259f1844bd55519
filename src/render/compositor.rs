use crate::foundation::core::{LogicalSize, Rect};
use crate::layout::directives::{DrawDirective, ImageSlot};
use crate::layout::engine::logo_box;

/// Image placements for a check, background first and logo second.
///
/// Dimensions are the decoded pixel sizes; missing images yield no directive.
pub fn place_images(
    size: LogicalSize,
    background: Option<(u32, u32)>,
    logo: Option<(u32, u32)>,
) -> Vec<DrawDirective> {
    let mut out = Vec::with_capacity(2);
    if let Some(rect) = background.and_then(|(w, h)| background_rect(size, w, h)) {
        out.push(DrawDirective::Image {
            slot: ImageSlot::Background,
            rect,
        });
    }
    if let Some(rect) = logo.and_then(|(w, h)| fit_centered(logo_box(), w, h)) {
        out.push(DrawDirective::Image {
            slot: ImageSlot::Logo,
            rect,
        });
    }
    out
}

/// Scale to the full logical width, keep aspect, anchor top-left.
pub fn background_rect(size: LogicalSize, img_w: u32, img_h: u32) -> Option<Rect> {
    if img_w == 0 || img_h == 0 {
        return None;
    }
    let k = size.width_pt / f64::from(img_w);
    Some(Rect::new(0.0, 0.0, size.width_pt, f64::from(img_h) * k))
}

/// Largest aspect-preserving rect inside `bounds`, centered in it.
pub fn fit_centered(bounds: Rect, img_w: u32, img_h: u32) -> Option<Rect> {
    if img_w == 0 || img_h == 0 || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }
    let (iw, ih) = (f64::from(img_w), f64::from(img_h));
    let k = (bounds.width() / iw).min(bounds.height() / ih);
    let (w, h) = (iw * k, ih * k);
    let x0 = bounds.x0 + (bounds.width() - w) / 2.0;
    let y0 = bounds.y0 + (bounds.height() - h) / 2.0;
    Some(Rect::new(x0, y0, x0 + w, y0 + h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
