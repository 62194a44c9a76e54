//! Catalog of single-slide templates on disk.
//!
//! Descriptor metadata is derived, never authored: each `.pptx` file under
//! the template directory is fingerprinted with MD5, and its shape
//! descriptors are re-extracted whenever the fingerprint changes. Requests
//! only ever read the cache; the lock is held long enough to clone an entry.

use crate::error::{Result, ServiceError};
use crate::pptx::PptxPackage;
use common::model::shape::ShapeDescriptor;
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

struct CatalogEntry {
    fingerprint: String,
    descriptors: Vec<ShapeDescriptor>,
}

pub struct TemplateCatalog {
    dir: PathBuf,
    entries: RwLock<HashMap<String, CatalogEntry>>,
}

impl TemplateCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TemplateCatalog {
            dir: dir.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Prime the descriptor cache for every template present at startup.
    /// Unreadable files are skipped; they surface as `NotFound` or
    /// `Document` errors when actually requested.
    pub fn warm_up(&self) {
        for id in self.template_ids().unwrap_or_default() {
            match self.descriptors(&id) {
                Ok(shapes) => info!("template '{}': {} text shape(s)", id, shapes.len()),
                Err(e) => info!("template '{}' skipped: {}", id, e),
            }
        }
    }

    /// Ids of every `.pptx` file in the template directory, sorted.
    pub fn template_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        if !self.dir.is_dir() {
            return Ok(ids);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("pptx") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Shape descriptors for a template, regenerated when the file changed
    /// since the last request.
    pub fn descriptors(&self, template_id: &str) -> Result<Vec<ShapeDescriptor>> {
        let bytes = self.read_template(template_id)?;
        let fingerprint = format!("{:x}", md5::compute(&bytes));

        {
            let cache = self
                .entries
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(entry) = cache.get(template_id) {
                if entry.fingerprint == fingerprint {
                    return Ok(entry.descriptors.clone());
                }
            }
        }

        info!("regenerating shape descriptors for template '{}'", template_id);
        let descriptors = PptxPackage::from_bytes(&bytes)?.shape_descriptors()?;
        let mut cache = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.insert(
            template_id.to_string(),
            CatalogEntry {
                fingerprint,
                descriptors: descriptors.clone(),
            },
        );
        Ok(descriptors)
    }

    /// Open a fresh package over the template bytes. The file on disk is
    /// never written back, so each render starts from the pristine slide.
    pub fn open(&self, template_id: &str) -> Result<PptxPackage> {
        PptxPackage::from_bytes(&self.read_template(template_id)?)
    }

    fn read_template(&self, template_id: &str) -> Result<Vec<u8>> {
        let path = self.template_path(template_id)?;
        std::fs::read(&path)
            .map_err(|_| ServiceError::NotFound(format!("unknown template '{}'", template_id)))
    }

    fn template_path(&self, template_id: &str) -> Result<PathBuf> {
        if template_id.is_empty()
            || !template_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ServiceError::NotFound(format!(
                "unknown template '{}'",
                template_id
            )));
        }
        Ok(self.dir.join(format!("{}.pptx", template_id)))
    }
}

/// Directory resolution used at startup.
pub fn template_dir_from_env() -> PathBuf {
    std::env::var("SLIDE_TEMPLATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(crate::config::DEFAULT_SLIDE_TEMPLATE_DIR).to_path_buf())
}
