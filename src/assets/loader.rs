use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, decode_any};
use crate::document::model::ImageSource;
use crate::foundation::error::{CheckForgeError, CheckForgeResult};

/// Resolves an [`ImageSource`] into decoded pixels.
///
/// Implementations run on loader threads, so they must be `Send + Sync`.
pub trait ImageLoader: Send + Sync {
    /// Load and decode one image. Failures are reported as `ResourceLoad` errors.
    fn load(&self, source: &ImageSource) -> CheckForgeResult<PreparedImage>;
}

/// Filesystem-backed loader rooted at an assets directory.
///
/// Inline byte sources are decoded directly. Remote URLs are not fetched.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: &str) -> CheckForgeResult<Vec<u8>> {
        let norm = normalize_rel_path(rel)?;
        let path = self.root.join(&norm);
        std::fs::read(&path).map_err(|e| {
            CheckForgeError::resource_load(format!("read image '{}': {e}", path.display()))
        })
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageSource) -> CheckForgeResult<PreparedImage> {
        let decoded = match source {
            ImageSource::Path(rel) => decode_any(&self.read(rel)?),
            ImageSource::Bytes(bytes) => decode_any(bytes),
            ImageSource::Url(url) => {
                return Err(CheckForgeError::resource_load(format!(
                    "remote image '{url}' is not supported by the filesystem loader"
                )));
            }
        };
        decoded.map_err(|e| match e {
            CheckForgeError::ResourceLoad(_) => e,
            other => CheckForgeError::resource_load(format!(
                "decode image '{}': {other}",
                source.describe()
            )),
        })
    }
}

/// Normalize a user-supplied relative asset path into `a/b/c` form.
///
/// Absolute paths, `..` segments and empty paths are rejected.
pub fn normalize_rel_path(source: &str) -> CheckForgeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || has_drive_prefix(&s) {
        return Err(CheckForgeError::resource_load(format!(
            "image path '{source}' must be relative to the assets root"
        )));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CheckForgeError::resource_load(format!(
                "image path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CheckForgeError::resource_load(
            "image path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

fn has_drive_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
