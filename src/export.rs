use std::io::Cursor;

use anyhow::Context;

use crate::document::model::CheckDocument;
use crate::format::amount::format_numerals;
use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::cpu::FrameRGBA;

/// Encode a rendered frame as PNG with straight (non-premultiplied) alpha.
pub fn encode_png(frame: &FrameRGBA) -> CheckForgeResult<Vec<u8>> {
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
        CheckForgeError::render(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        ))
    })?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Plain-text export of a check's key fields.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl CheckSummary {
    pub const CONTENT_TYPE: &'static str = "text/plain";

    pub fn from_document(doc: &CheckDocument) -> CheckForgeResult<Self> {
        let body = format!(
            "Check #: {}\nAmount: ${}\nPayee: {}",
            doc.check_number,
            format_numerals(doc.amount)?,
            doc.payee()
        );
        Ok(Self {
            file_name: format!("check-{}.txt", doc.check_number),
            content_type: Self::CONTENT_TYPE,
            body,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
