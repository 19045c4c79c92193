//! Image resolution.
//!
//! The engine never decodes images. It asks an [`ImageResolver`] for the
//! pixel dimensions of a source and receives an opaque [`ImageHandle`]
//! that is passed through to the draw commands.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque reference to an image, understood by the page emitter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(pub String);

impl ImageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Intrinsic size of a resolved image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub handle: ImageHandle,
}

impl ImageInfo {
    pub fn new(pixel_width: u32, pixel_height: u32, handle: ImageHandle) -> Self {
        Self {
            pixel_width,
            pixel_height,
            handle,
        }
    }

    /// Height divided by width, or `None` for a degenerate image.
    pub fn aspect(&self) -> Option<f64> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            None
        } else {
            Some(self.pixel_height as f64 / self.pixel_width as f64)
        }
    }
}

/// Looks up image dimensions. Returns `None` when the image is unavailable.
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, src: &str) -> Option<ImageInfo>;
}

/// Resolver that knows no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve(&self, _src: &str) -> Option<ImageInfo> {
        None
    }
}

impl<F> ImageResolver for F
where
    F: Fn(&str) -> Option<ImageInfo> + Send + Sync,
{
    fn resolve(&self, src: &str) -> Option<ImageInfo> {
        self(src)
    }
}

/// Resolver that probes local files with the `image` crate.
///
/// Relative sources are joined onto the base directory. Remote URLs are
/// not fetched.
#[derive(Debug, Clone)]
pub struct FileImageResolver {
    base_dir: PathBuf,
}

impl FileImageResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn locate(&self, src: &str) -> Option<PathBuf> {
        if src.starts_with("http://") || src.starts_with("https://") {
            return None;
        }
        let src = src.strip_prefix("file://").unwrap_or(src);
        let path = Path::new(src);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        })
    }
}

impl ImageResolver for FileImageResolver {
    fn resolve(&self, src: &str) -> Option<ImageInfo> {
        let path = self.locate(src)?;
        match image::image_dimensions(&path) {
            Ok((w, h)) => Some(ImageInfo::new(w, h, ImageHandle::new(path.to_string_lossy()))),
            Err(e) => {
                log::warn!("cannot read image {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        let info = ImageInfo::new(200, 100, ImageHandle::new("a"));
        assert_eq!(info.aspect(), Some(0.5));
        assert_eq!(ImageInfo::new(0, 10, ImageHandle::new("b")).aspect(), None);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |src: &str| {
            (src == "logo.png").then(|| ImageInfo::new(64, 32, ImageHandle::new(src)))
        };
        assert!(resolver.resolve("logo.png").is_some());
        assert!(resolver.resolve("other.png").is_none());
        assert!(NoImages.resolve("logo.png").is_none());
    }

    #[test]
    fn test_file_resolver_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::new(30, 20);
        img.save(dir.path().join("pic.png")).unwrap();

        let resolver = FileImageResolver::new(dir.path());
        let info = resolver.resolve("pic.png").unwrap();
        assert_eq!((info.pixel_width, info.pixel_height), (30, 20));
        assert!(resolver.resolve("missing.png").is_none());
        assert!(resolver.resolve("https://example.com/a.png").is_none());
    }
}
