use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::assets::decode::PreparedImage;
use crate::assets::fonts::{FontLoader, FontSet};
use crate::assets::loader::ImageLoader;
use crate::document::model::{CheckDocument, ImageSource};
use crate::foundation::error::CheckForgeResult;

/// Collaborators a render uses to fetch external resources.
#[derive(Clone)]
pub struct ResourceLoaders {
    pub images: Arc<dyn ImageLoader>,
    pub fonts: Arc<dyn FontLoader>,
}

impl std::fmt::Debug for ResourceLoaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoaders").finish_non_exhaustive()
    }
}

/// Resources available to one render. Anything that failed to load is absent.
#[derive(Clone, Debug, Default)]
pub struct Resources {
    pub background: Option<PreparedImage>,
    pub logo: Option<PreparedImage>,
    pub fonts: FontSet,
}

struct Pending<T> {
    what: String,
    rx: mpsc::Receiver<CheckForgeResult<T>>,
}

impl<T: Send + 'static> Pending<T> {
    fn spawn(what: String, job: impl FnOnce() -> CheckForgeResult<T> + Send + 'static) -> Self {
        let (tx, rx) = mpsc::sync_channel(1);
        let spawned = std::thread::Builder::new()
            .name("checkforge-load".to_string())
            .spawn(move || {
                let _ = tx.send(job());
            });
        if let Err(e) = spawned {
            // The sender was dropped with the closure; `wait` reports it as a failure.
            tracing::warn!(resource = %what, error = %e, "failed to spawn loader thread");
        }
        Self { what, rx }
    }

    fn wait(self, deadline: Instant) -> Option<T> {
        let left = deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(left) {
            Ok(Ok(v)) => Some(v),
            Ok(Err(e)) => {
                tracing::warn!(resource = %self.what, error = %e, "resource failed to load; skipping");
                None
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(resource = %self.what, "resource load timed out; skipping");
                None
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::warn!(resource = %self.what, "resource loader exited without a result; skipping");
                None
            }
        }
    }
}

/// In-flight loads for one render, started together and awaited against one deadline.
pub struct ResourceRequest {
    background: Option<Pending<PreparedImage>>,
    logo: Option<Pending<PreparedImage>>,
    fonts: Pending<FontSet>,
}

impl ResourceRequest {
    /// Start loading the document's background, logo and the font set concurrently.
    pub fn issue(doc: &CheckDocument, loaders: &ResourceLoaders) -> Self {
        let image = |slot: &str, source: &Option<ImageSource>| {
            source.as_ref().map(|source| {
                let loader = Arc::clone(&loaders.images);
                let source = source.clone();
                Pending::spawn(format!("{slot} '{}'", source.describe()), move || {
                    loader.load(&source)
                })
            })
        };
        let fonts = {
            let loader = Arc::clone(&loaders.fonts);
            Pending::spawn("fonts".to_string(), move || loader.load())
        };
        Self {
            background: image("background", &doc.background),
            logo: image("logo", &doc.logo),
            fonts,
        }
    }

    /// Wait at most `timeout` in total. Failed or late resources are logged and left out.
    pub fn resolve(self, timeout: Duration) -> Resources {
        let deadline = Instant::now() + timeout;
        let background = self.background.and_then(|p| p.wait(deadline));
        let logo = self.logo.and_then(|p| p.wait(deadline));
        let fonts = self.fonts.wait(deadline).unwrap_or_default();
        if fonts.is_empty() {
            tracing::warn!("no fonts available; text will be laid out but not painted");
        }
        Resources {
            background,
            logo,
            fonts,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/request.rs"]
mod tests;
