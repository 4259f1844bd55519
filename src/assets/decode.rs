use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::MAX_SURFACE_DIM;
use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Longest edge an SVG image is rasterized to before compositing.
pub const SVG_RASTER_MAX_EDGE: u32 = 1024;

/// Longest image edge the rasterizer can sample from.
pub const MAX_IMAGE_EDGE: u32 = MAX_SURFACE_DIM;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> CheckForgeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    if dyn_img.width() > MAX_IMAGE_EDGE || dyn_img.height() > MAX_IMAGE_EDGE {
        return Err(CheckForgeError::resource_load(format!(
            "image is {}x{}, edges above {MAX_IMAGE_EDGE} px are not supported",
            dyn_img.width(),
            dyn_img.height()
        )));
    }
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> CheckForgeResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize an SVG so its longest edge is at most `max_edge` pixels (aspect preserved).
pub fn rasterize_svg(tree: &usvg::Tree, max_edge: u32) -> CheckForgeResult<PreparedImage> {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(CheckForgeError::resource_load("svg has invalid width/height"));
    }
    let fit = (max_edge as f32 / w.max(h)).min(4.0);
    let width = ((w * fit).round() as u32).max(1);
    let height = ((h * fit).round() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CheckForgeError::resource_load("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(width as f32 / w, height as f32 / h);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Decode raster or SVG bytes, sniffing the format from the content.
pub fn decode_any(bytes: &[u8]) -> CheckForgeResult<PreparedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        return rasterize_svg(&tree, SVG_RASTER_MAX_EDGE);
    }
    decode_image(bytes)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
