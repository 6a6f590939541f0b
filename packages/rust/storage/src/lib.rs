//! Collection storage: Markdown pages and the visited-URL manifest.
//!
//! A collection is a directory `data/collections/<name>/` holding one `.md`
//! file per accepted page plus `urls.json`. Reads are tolerant (a missing or
//! corrupt manifest is an empty one); writes return errors that callers are
//! expected to log and move past — a failed save never aborts a crawl.

mod manifest;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use docharvest_shared::{DocHarvestError, Result};

pub use manifest::Manifest;

/// Manifest file name inside each collection directory.
const MANIFEST_FILE: &str = "urls.json";

/// Filesystem root for all collections.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    root: PathBuf,
}

impl CollectionStore {
    /// Create a store rooted at `root` (collections live in
    /// `<root>/collections/<name>/`). Nothing is created until a write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of one collection.
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join("collections").join(collection)
    }

    /// Load the manifest of a collection.
    ///
    /// Missing file or unreadable content both yield an empty manifest;
    /// this path must never stop a crawl from starting.
    pub fn load_manifest(&self, collection: &str) -> Manifest {
        let path = self.collection_dir(collection).join(MANIFEST_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(?path, error = %e, "no prior manifest");
                return Manifest::default();
            }
        };

        match Manifest::from_json(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(?path, error = %e, "manifest unreadable, starting empty");
                Manifest::default()
            }
        }
    }

    /// Persist the manifest, creating the collection directory if needed.
    pub fn save_manifest(&self, collection: &str, manifest: &Manifest) -> Result<()> {
        let dir = self.collection_dir(collection);
        std::fs::create_dir_all(&dir).map_err(|e| DocHarvestError::io(&dir, e))?;

        let path = dir.join(MANIFEST_FILE);
        let json = manifest
            .to_json()
            .map_err(|e| DocHarvestError::validation(format!("manifest serialization: {e}")))?;

        std::fs::write(&path, json).map_err(|e| DocHarvestError::io(&path, e))?;
        info!(?path, "manifest saved");
        Ok(())
    }

    /// Write one page's Markdown under the collection directory.
    ///
    /// `file_name` is the already-derived `<host_path>.md` name; an existing
    /// file with the same name is overwritten.
    pub fn write_page(&self, collection: &str, file_name: &str, markdown: &str) -> Result<PathBuf> {
        let dir = self.collection_dir(collection);
        std::fs::create_dir_all(&dir).map_err(|e| DocHarvestError::io(&dir, e))?;

        let path = dir.join(file_name);
        std::fs::write(&path, markdown).map_err(|e| DocHarvestError::io(&path, e))?;
        debug!(?path, bytes = markdown.len(), "page written");
        Ok(path)
    }
}
