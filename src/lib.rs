//! CheckForge renders bank checks: validated check data in, a laid-out, rasterized check out.
//!
//! The pipeline is:
//!
//! - Parse a [`CheckDocumentDef`] (JSON boundary) and [`validate`](CheckDocumentDef::validate) it
//!   into an immutable [`CheckDocument`]
//! - Derive the [`MicrLine`] and the amount in words
//! - Load background, logo and fonts concurrently with a bounded wait
//! - Lay the check out as a [`DrawList`] in points
//! - Rasterize with `vello_cpu` and composite onto a [`SharedSurface`]
//!
//! [`Renderer`] drives all of it.
#![forbid(unsafe_code)]

mod assets;
mod document;
mod export;
mod format;
mod foundation;
mod intent;
mod layout;
mod render;

pub use crate::foundation::core::{
    Affine, Canvas, LogicalSize, POINTS_PER_INCH, PX_PER_INCH, Point, Rect, Rgba8Premul,
};
pub use crate::foundation::error::{CheckForgeError, CheckForgeResult};
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;

pub use crate::assets::decode::{MAX_IMAGE_EDGE, PreparedImage, decode_any, decode_image};
pub use crate::assets::fonts::{
    FontFace, FontLoader, FontSet, FsFontLoader, MicrGlyphs, NoFonts, SystemFontLoader,
};
pub use crate::assets::loader::{FsImageLoader, ImageLoader, normalize_rel_path};
pub use crate::assets::request::{ResourceLoaders, ResourceRequest, Resources};
pub use crate::document::model::{
    Address, AddressDef, CheckDocument, CheckDocumentDef, ExpireDaysDef, ISSUE_DATE_FORMAT,
    ImageSource,
};
pub use crate::export::{CheckSummary, encode_png};
pub use crate::format::amount::{
    MAX_AMOUNT_EXCLUSIVE, amount_from_words, amount_in_words, format_numerals, parse_amount,
    split_cents,
};
pub use crate::format::micr::{MicrLine, encode_micr, routing_checksum_ok, symbols_to_letters};
pub use crate::intent::parser::{
    Intent, IntentAction, IntentParser, KeywordIntentParser, MockIntentParser,
};
pub use crate::layout::directives::{
    DrawDirective, DrawList, DrawListFingerprint, FontRole, ImageSlot, TextAlign, TextRun,
};
pub use crate::layout::engine::{
    BLEED_PT, DATE_LABEL, LayoutInput, MEMO_LABEL, PAY_TO_LABEL, SIGNATURE_LABEL, layout_check,
    logo_box,
};
pub use crate::layout::metrics::{ApproxMetrics, TextMeasure};
pub use crate::render::cpu::FrameRGBA;
pub use crate::render::pipeline::{
    DEFAULT_RESOURCE_TIMEOUT, RESOURCE_TIMEOUT_ENV, RenderConfig, Renderer, RendererOpts,
};
pub use crate::render::surface::{RenderOutcome, RenderSurface, RenderTicket, SharedSurface};

/// MICR E-13B control symbols.
pub mod micr_symbols {
    pub use crate::format::micr::{AMOUNT, DASH, ON_US, TRANSIT};
}
