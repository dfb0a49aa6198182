use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::decode::load_raster;
use crate::foundation::core::Raster;
use crate::foundation::error::{BackdropError, BackdropResult};

/// File extensions a directory catalog accepts (case-insensitive).
pub const BACKGROUND_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Fixed pool of backgrounds to draw from.
///
/// Which entry is used is the caller's decision; the catalog only has to be non-empty and
/// able to load entry `index` for every `index < len()`.
pub trait BackgroundCatalog {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, index: usize) -> BackdropResult<Raster>;
}

/// Load entry `selector % len`, failing with [`BackdropError::EmptyCatalog`] on an empty pool.
pub fn pick_background(
    catalog: &dyn BackgroundCatalog,
    selector: usize,
) -> BackdropResult<Raster> {
    let len = catalog.len();
    if len == 0 {
        return Err(BackdropError::EmptyCatalog);
    }
    let index = selector % len;
    tracing::debug!(index, len, "background picked");
    catalog.load(index)
}

/// Backgrounds already decoded in memory.
#[derive(Clone, Debug)]
pub struct MemoryCatalog {
    rasters: Vec<Raster>,
}

impl MemoryCatalog {
    pub fn new(rasters: Vec<Raster>) -> BackdropResult<Self> {
        if rasters.is_empty() {
            return Err(BackdropError::EmptyCatalog);
        }
        Ok(Self { rasters })
    }
}

impl BackgroundCatalog for MemoryCatalog {
    fn len(&self) -> usize {
        self.rasters.len()
    }

    fn load(&self, index: usize) -> BackdropResult<Raster> {
        self.rasters.get(index).cloned().ok_or_else(|| {
            BackdropError::source_unavailable(format!("background #{index} out of range"))
        })
    }
}

/// Image files found directly inside one directory, in sorted path order.
///
/// The listing is taken once at construction; files are decoded lazily on [`load`].
///
/// [`load`]: BackgroundCatalog::load
#[derive(Clone, Debug)]
pub struct DirCatalog {
    root: PathBuf,
    entries: Vec<PathBuf>,
}

impl DirCatalog {
    pub fn scan(root: impl AsRef<Path>) -> BackdropResult<Self> {
        let root = root.as_ref();
        let read_dir = std::fs::read_dir(root)
            .with_context(|| format!("list background directory '{}'", root.display()))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.with_context(|| format!("read entry in '{}'", root.display()))?;
            let path = entry.path();
            if path.is_file() && has_background_extension(&path) {
                entries.push(path);
            }
        }
        entries.sort();

        if entries.is_empty() {
            return Err(BackdropError::EmptyCatalog);
        }
        tracing::debug!(root = %root.display(), count = entries.len(), "background catalog scanned");
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

impl BackgroundCatalog for DirCatalog {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn load(&self, index: usize) -> BackdropResult<Raster> {
        let path = self.entries.get(index).ok_or_else(|| {
            BackdropError::source_unavailable(format!("background #{index} out of range"))
        })?;
        load_raster(path)
    }
}

fn has_background_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            BACKGROUND_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
