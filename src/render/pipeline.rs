use std::sync::Arc;
use std::time::Duration;

use crate::assets::fonts::{FontLoader, SystemFontLoader};
use crate::assets::loader::{FsImageLoader, ImageLoader};
use crate::assets::request::{ResourceLoaders, ResourceRequest, Resources};
use crate::document::model::{CheckDocument, CheckDocumentDef};
use crate::format::micr::MicrLine;
use crate::foundation::core::{LogicalSize, Rgba8Premul};
use crate::foundation::error::CheckForgeResult;
use crate::layout::directives::DrawList;
use crate::layout::engine::{LayoutInput, layout_check};
use crate::layout::metrics::ApproxMetrics;
use crate::render::compositor::place_images;
use crate::render::cpu::{CpuRasterizer, FrameRGBA};
use crate::render::surface::{RenderOutcome, SharedSurface};
use crate::render::text::{ParleyMeasure, TextLayoutEngine};

/// Environment variable overriding the default resource wait, in milliseconds.
pub const RESOURCE_TIMEOUT_ENV: &str = "CHECKFORGE_RESOURCE_TIMEOUT_MS";

/// Resource wait used when [`RESOURCE_TIMEOUT_ENV`] is unset or invalid.
pub const DEFAULT_RESOURCE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Per-call render settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Device scale factor, must be finite and > 0.
    pub scale: f64,
    /// Draw bleed guides and crop marks.
    pub preview_mode: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            preview_mode: false,
        }
    }
}

impl RenderConfig {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_preview_mode(mut self, preview_mode: bool) -> Self {
        self.preview_mode = preview_mode;
        self
    }
}

/// Long-lived renderer configuration: collaborators, resource timeout and paper.
#[derive(Clone, Debug)]
pub struct RendererOpts {
    pub(crate) loaders: ResourceLoaders,
    pub(crate) resource_timeout: Duration,
    pub(crate) paper: Rgba8Premul,
    pub(crate) size: LogicalSize,
}

impl Default for RendererOpts {
    fn default() -> Self {
        let resource_timeout = std::env::var(RESOURCE_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RESOURCE_TIMEOUT);
        Self {
            loaders: ResourceLoaders {
                images: Arc::new(FsImageLoader::new(".")),
                fonts: Arc::new(SystemFontLoader),
            },
            resource_timeout,
            paper: Rgba8Premul::WHITE,
            size: LogicalSize::PERSONAL_CHECK,
        }
    }
}

impl RendererOpts {
    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loaders.images = loader;
        self
    }

    pub fn with_font_loader(mut self, loader: Arc<dyn FontLoader>) -> Self {
        self.loaders.fonts = loader;
        self
    }

    /// Upper bound on the total wait for background, logo and fonts.
    pub fn with_resource_timeout(mut self, timeout: Duration) -> Self {
        self.resource_timeout = timeout;
        self
    }

    pub fn with_paper(mut self, paper: Rgba8Premul) -> Self {
        self.paper = paper;
        self
    }

    pub fn with_logical_size(mut self, size: LogicalSize) -> Self {
        self.size = size;
        self
    }

    pub fn resource_timeout(&self) -> Duration {
        self.resource_timeout
    }
}

/// Validated inputs for one render, computed before any resource is requested.
struct Prepared {
    doc: CheckDocument,
    micr: MicrLine,
}

/// Laid-out check with the resources and faces it was measured against.
struct Composed {
    list: DrawList,
    resources: Resources,
    text: TextLayoutEngine,
}

/// Check renderer: validate, load resources, lay out, rasterize, composite.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    opts: RendererOpts,
}

impl Renderer {
    pub fn new(opts: RendererOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &RendererOpts {
        &self.opts
    }

    /// Render `def` onto `surface`.
    ///
    /// Validation and formatting errors are returned before the surface is touched. Resource
    /// failures are logged and rendered without. If another render on the same surface starts
    /// before this one composites, this one returns [`RenderOutcome::Superseded`].
    #[tracing::instrument(skip_all, fields(scale = config.scale, preview = config.preview_mode))]
    pub fn render(
        &self,
        def: &CheckDocumentDef,
        config: &RenderConfig,
        surface: &SharedSurface,
    ) -> CheckForgeResult<RenderOutcome> {
        let prepared = self.prepare(def, config)?;
        let ticket = surface.begin();

        let mut composed = self.compose(&prepared, config)?;
        if !surface.is_current(ticket) {
            tracing::debug!("render superseded after resource load");
            return Ok(RenderOutcome::Superseded);
        }

        let frame = self.rasterize(&mut composed, config)?;
        surface.composite(ticket, &frame, config.scale)
    }

    /// Run the full pipeline into a standalone frame of premultiplied RGBA8 pixels.
    #[tracing::instrument(skip_all, fields(scale = config.scale, preview = config.preview_mode))]
    pub fn render_frame(
        &self,
        def: &CheckDocumentDef,
        config: &RenderConfig,
    ) -> CheckForgeResult<FrameRGBA> {
        let prepared = self.prepare(def, config)?;
        let mut composed = self.compose(&prepared, config)?;
        self.rasterize(&mut composed, config)
    }

    /// Directives the rasterizer would execute, in logical units.
    pub fn draw_list(
        &self,
        def: &CheckDocumentDef,
        config: &RenderConfig,
    ) -> CheckForgeResult<DrawList> {
        let prepared = self.prepare(def, config)?;
        Ok(self.compose(&prepared, config)?.list)
    }

    fn prepare(&self, def: &CheckDocumentDef, config: &RenderConfig) -> CheckForgeResult<Prepared> {
        self.opts.size.pixel_size(config.scale)?;
        let doc = def.validate()?;
        let micr = doc.micr_line()?;
        tracing::debug!(check = %doc.check_number, micr = %micr, "document validated");
        Ok(Prepared { doc, micr })
    }

    fn compose(&self, prepared: &Prepared, config: &RenderConfig) -> CheckForgeResult<Composed> {
        let resources = ResourceRequest::issue(&prepared.doc, &self.opts.loaders)
            .resolve(self.opts.resource_timeout);
        let mut text = TextLayoutEngine::new(&resources.fonts);

        let size = self.opts.size;
        let images = place_images(
            size,
            resources.background.as_ref().map(|i| (i.width, i.height)),
            resources.logo.as_ref().map(|i| (i.width, i.height)),
        );
        let input = LayoutInput {
            doc: &prepared.doc,
            micr: &prepared.micr,
            size,
            preview: config.preview_mode,
            logo_present: resources.logo.is_some(),
        };
        let content = if text.has_any_face() {
            layout_check(&input, &mut ParleyMeasure::new(&mut text))?
        } else {
            layout_check(&input, &mut ApproxMetrics)?
        };

        let list = DrawList::from_parts(size, images, content);
        tracing::debug!(directives = list.len(), "check laid out");
        Ok(Composed {
            list,
            resources,
            text,
        })
    }

    fn rasterize(&self, composed: &mut Composed, config: &RenderConfig) -> CheckForgeResult<FrameRGBA> {
        CpuRasterizer::new(&mut composed.text, &composed.resources, self.opts.paper)
            .rasterize(&composed.list, config.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
