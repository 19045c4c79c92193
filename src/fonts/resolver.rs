//! Font family resolution and the shared font cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use super::metrics::{FaceMetrics, FontHandle};

/// Resolves a font family name to metrics.
///
/// Resolution never fails: any problem yields the built-in handle.
pub trait FontResolver: Send + Sync {
    fn resolve(&self, family: Option<&str>) -> Arc<FontHandle>;
}

/// Resolver that always returns the built-in font.
#[derive(Debug, Clone, Default)]
pub struct BuiltinFonts {
    handle: Arc<FontHandle>,
}

impl BuiltinFonts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FontResolver for BuiltinFonts {
    fn resolve(&self, _family: Option<&str>) -> Arc<FontHandle> {
        Arc::clone(&self.handle)
    }
}

impl<F> FontResolver for F
where
    F: Fn(Option<&str>) -> Arc<FontHandle> + Send + Sync,
{
    fn resolve(&self, family: Option<&str>) -> Arc<FontHandle> {
        self(family)
    }
}

/// Process-wide cache of resolved fonts keyed by family.
///
/// Each key is loaded at most once. Callers asking for a key that is
/// being loaded block until the load finishes and share its result.
#[derive(Debug, Default)]
pub struct FontCache {
    entries: Mutex<HashMap<String, Arc<OnceLock<Arc<FontHandle>>>>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached handle or load it with `load`.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Arc<FontHandle>
    where
        F: FnOnce() -> FontHandle,
    {
        let slot = {
            let mut entries = match self.entries.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(entries.entry(key.to_string()).or_default())
        };
        // The map lock is released here so loads of different keys run concurrently.
        Arc::clone(slot.get_or_init(|| Arc::new(load())))
    }

    /// Number of cached families.
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolver that reads TrueType files from a local directory.
///
/// Files are named `<Family_Name>_<variant>.ttf` where spaces in the family
/// become underscores and variant is one of `regular`, `bold`, `italic`
/// or `bold-italic`.
#[derive(Debug)]
pub struct DirectoryFontResolver {
    root: PathBuf,
    cache: FontCache,
    fallback: Arc<FontHandle>,
}

impl DirectoryFontResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: FontCache::new(),
            fallback: Arc::new(FontHandle::builtin()),
        }
    }

    /// Directory searched for font files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The cache backing this resolver.
    pub fn cache(&self) -> &FontCache {
        &self.cache
    }

    /// Path of one face file for a family.
    pub fn face_path(&self, family: &str, variant: &str) -> PathBuf {
        self.root
            .join(format!("{}_{}.ttf", family.trim().replace(' ', "_"), variant))
    }

    fn load_face(&self, family: &str, variant: &str) -> Option<FaceMetrics> {
        let path = self.face_path(family, variant);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("font face {} not readable: {}", path.display(), e);
                return None;
            }
        };
        match FaceMetrics::from_ttf(&data) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                log::warn!("ignoring font face {}: {}", path.display(), e);
                None
            }
        }
    }

    fn load_family(&self, family: &str) -> FontHandle {
        let Some(regular) = self.load_face(family, "regular") else {
            log::warn!(
                "font family '{}' unavailable, using built-in {}",
                family,
                self.fallback.family()
            );
            return FontHandle::builtin();
        };
        log::debug!("loaded font family '{}'", family);
        FontHandle::from_faces(
            family,
            regular,
            self.load_face(family, "bold"),
            self.load_face(family, "italic"),
            self.load_face(family, "bold-italic"),
        )
    }
}

impl FontResolver for DirectoryFontResolver {
    fn resolve(&self, family: Option<&str>) -> Arc<FontHandle> {
        match family.map(str::trim).filter(|f| !f.is_empty()) {
            Some(family) => self.cache.get_or_load(family, || self.load_family(family)),
            None => Arc::clone(&self.fallback),
        }
    }
}
