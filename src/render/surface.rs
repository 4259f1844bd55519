use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::core::Canvas;
use crate::foundation::error::{CheckForgeError, CheckForgeResult};
use crate::render::cpu::FrameRGBA;

/// Pixel buffer a check is composited onto.
#[derive(Clone, Debug, Default)]
pub struct RenderSurface {
    canvas: Option<Canvas>,
    scale: Option<f64>,
    pixels: Vec<u8>,
    paints: u64,
}

impl RenderSurface {
    /// Pixel size of the last composite, `None` before the first one.
    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Premultiplied RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of completed composites.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    fn composite(&mut self, frame: &FrameRGBA, scale: f64) {
        let canvas = Canvas {
            width: frame.width,
            height: frame.height,
        };
        if self.canvas != Some(canvas) {
            self.pixels = vec![0; canvas.byte_len()];
            self.canvas = Some(canvas);
        } else {
            self.pixels.fill(0);
        }
        self.pixels.copy_from_slice(&frame.data);
        self.scale = Some(scale);
        self.paints += 1;
    }

    fn to_frame(&self) -> Option<FrameRGBA> {
        let canvas = self.canvas?;
        Some(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: self.pixels.clone(),
            premultiplied: true,
        })
    }
}

/// Ticket identifying one render call against a [`SharedSurface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(u64);

/// Result of a render call that passed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The surface now shows this render.
    Painted(Canvas),
    /// A newer render was started on the same surface; this one was dropped.
    Superseded,
}

/// Cloneable handle to a single mutable [`RenderSurface`].
///
/// Renders take a ticket when they start; only the newest ticket may composite.
#[derive(Clone, Debug, Default)]
pub struct SharedSurface {
    inner: Arc<Mutex<RenderSurface>>,
    latest: Arc<AtomicU64>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render. Every earlier ticket becomes stale.
    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Clear the surface and copy `frame` onto it, unless `ticket` is stale.
    ///
    /// The staleness check and the copy happen under the surface lock.
    pub fn composite(
        &self,
        ticket: RenderTicket,
        frame: &FrameRGBA,
        scale: f64,
    ) -> CheckForgeResult<RenderOutcome> {
        let canvas = Canvas {
            width: frame.width,
            height: frame.height,
        };
        if frame.data.len() != canvas.byte_len() {
            return Err(CheckForgeError::render("frame byte length mismatch"));
        }
        let mut surface = self.lock()?;
        if !self.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "render superseded before composite");
            return Ok(RenderOutcome::Superseded);
        }
        surface.composite(frame, scale);
        Ok(RenderOutcome::Painted(canvas))
    }

    /// Copy of the current pixels, `None` before the first composite.
    pub fn snapshot(&self) -> CheckForgeResult<Option<FrameRGBA>> {
        Ok(self.lock()?.to_frame())
    }

    pub fn paint_count(&self) -> CheckForgeResult<u64> {
        Ok(self.lock()?.paint_count())
    }

    /// Run `f` with the surface locked.
    pub fn with_surface<R>(&self, f: impl FnOnce(&RenderSurface) -> R) -> CheckForgeResult<R> {
        let guard = self.lock()?;
        Ok(f(&*guard))
    }

    fn lock(&self) -> CheckForgeResult<MutexGuard<'_, RenderSurface>> {
        self.inner
            .lock()
            .map_err(|_| CheckForgeError::render("render surface lock poisoned"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
