use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::assets::decode::read_image;
use crate::compose::layout::StripLayout;
use crate::compose::strip::Template;
use crate::foundation::core::RgbaBuffer;
use crate::foundation::error::{BoothError, BoothResult};

/// Decoded image with pixel dimensions, as returned by a [`TemplateLoader`].
pub type DecodedImage = RgbaBuffer;

/// Normalize and validate booth-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`). It doubles as the identity backgrounds are cached under.
pub fn normalize_rel_path(source: &str) -> BoothResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(BoothError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(BoothError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BoothError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BoothError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Background loading seam. Failures are reported as [`BoothError::AssetLoadFailed`].
pub trait TemplateLoader {
    /// Load and decode the background identified by `id`.
    fn load(&mut self, id: &str) -> BoothResult<DecodedImage>;
}

/// Loads backgrounds from files under a root directory.
#[derive(Clone, Debug)]
pub struct FsTemplateLoader {
    root: PathBuf,
}

impl FsTemplateLoader {
    /// Resolve ids relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateLoader for FsTemplateLoader {
    fn load(&mut self, id: &str) -> BoothResult<DecodedImage> {
        let rel = normalize_rel_path(id)?;
        read_image(&self.root.join(&rel))
            .map_err(|e| BoothError::asset_load_failed(rel, format!("{e:#}")))
    }
}

/// In-memory backgrounds keyed by id; counts loads so cache behaviour is observable.
#[derive(Clone, Debug, Default)]
pub struct MemoryTemplateLoader {
    images: HashMap<String, DecodedImage>,
    loads: usize,
}

impl MemoryTemplateLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` under `id`.
    pub fn insert(&mut self, id: impl Into<String>, image: DecodedImage) {
        self.images.insert(id.into(), image);
    }

    /// Number of `load` calls served, successful or not.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl TemplateLoader for MemoryTemplateLoader {
    fn load(&mut self, id: &str) -> BoothResult<DecodedImage> {
        self.loads += 1;
        self.images
            .get(id)
            .cloned()
            .ok_or_else(|| BoothError::asset_load_failed(id, "no such background"))
    }
}

/// Templates built once per background identity and shared thereafter.
pub struct TemplateCache<L> {
    loader: L,
    layout: StripLayout,
    slot_count: u32,
    templates: HashMap<String, Arc<Template>>,
}

impl<L: TemplateLoader> TemplateCache<L> {
    /// Cache templates with `slot_count` slots laid out by `layout`.
    pub fn new(loader: L, layout: StripLayout, slot_count: u32) -> BoothResult<Self> {
        layout.validate(slot_count)?;
        Ok(Self {
            loader,
            layout,
            slot_count,
            templates: HashMap::new(),
        })
    }

    /// Return the cached template for `id`, loading and laying it out on first use.
    ///
    /// Failed loads are not cached, so a later call retries.
    #[tracing::instrument(skip(self))]
    pub fn get(&mut self, id: &str) -> BoothResult<Arc<Template>> {
        let key = normalize_rel_path(id)?;
        if let Some(t) = self.templates.get(&key) {
            debug!(id = %key, "template cache hit");
            return Ok(Arc::clone(t));
        }

        let background = self.loader.load(&key)?;
        let template = Template::new(background, &self.layout, self.slot_count)
            .map_err(|e| BoothError::asset_load_failed(key.clone(), e.to_string()))?;
        info!(
            id = %key,
            width = template.width(),
            height = template.height(),
            "template loaded"
        );
        let template = Arc::new(template);
        self.templates.insert(key, Arc::clone(&template));
        Ok(template)
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Borrow the underlying loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
