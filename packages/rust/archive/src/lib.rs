//! Repository archive downloader.
//!
//! Companion utility to the crawler: pulls a GitHub repository as a ZIP of
//! its `main` branch and extracts it under `<data>/repos/<repo>/`. The
//! repository URL is probed with a plain GET first so typos fail with a
//! clear reason instead of a confusing 404 on the archive endpoint.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use url::Url;

use docharvest_shared::{DocHarvestError, Result};

/// Archive host used by [`RepoLoader::new`].
const GITHUB_BASE: &str = "https://github.com";

/// Downloads and unpacks repository archives.
pub struct RepoLoader {
    client: reqwest::Client,
    base: String,
}

impl RepoLoader {
    /// Loader against github.com.
    pub fn new() -> Result<Self> {
        Self::with_base(GITHUB_BASE)
    }

    /// Loader against another host with the same archive URL layout
    /// (GitHub Enterprise, a mock server in tests).
    pub fn with_base(base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("docharvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocHarvestError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// `https://github.com/<user>/<repo>` → `(user, repo)`.
    pub fn parse_slug(repo_url: &str) -> Result<(String, String)> {
        let parsed = Url::parse(repo_url)
            .map_err(|e| DocHarvestError::validation(format!("invalid repository URL: {e}")))?;

        let mut segments = parsed
            .path_segments()
            .map(|s| s.filter(|part| !part.is_empty()))
            .ok_or_else(|| DocHarvestError::validation("repository URL has no path"))?;

        let user = segments
            .next()
            .ok_or_else(|| DocHarvestError::validation("repository URL is missing the owner"))?;
        let repo = segments
            .next()
            .ok_or_else(|| DocHarvestError::validation("repository URL is missing the name"))?;

        Ok((user.to_string(), repo.trim_end_matches(".git").to_string()))
    }

    /// Download the `main`-branch archive of `repo_url` and extract it to
    /// `<data_root>/repos/<repo>/`. Returns the extraction directory.
    #[instrument(skip(self, data_root))]
    pub async fn download(&self, repo_url: &str, data_root: &Path) -> Result<PathBuf> {
        let probe = self
            .client
            .get(repo_url)
            .send()
            .await
            .map_err(|e| DocHarvestError::Archive(format!("{repo_url}: {e}")))?;
        if !probe.status().is_success() {
            return Err(DocHarvestError::Archive(format!(
                "repository not reachable: HTTP {}",
                probe.status()
            )));
        }

        let (user, repo) = Self::parse_slug(repo_url)?;
        let zip_url = format!("{}/{user}/{repo}/archive/refs/heads/main.zip", self.base);

        let response = self
            .client
            .get(&zip_url)
            .send()
            .await
            .map_err(|e| DocHarvestError::Archive(format!("{zip_url}: {e}")))?;
        if !response.status().is_success() {
            return Err(DocHarvestError::Archive(format!(
                "archive download failed: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocHarvestError::Archive(format!("{zip_url}: body read: {e}")))?;

        let dest = data_root.join("repos").join(&repo);
        std::fs::create_dir_all(&dest).map_err(|e| DocHarvestError::io(&dest, e))?;

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref()))
            .map_err(|e| DocHarvestError::Archive(format!("not a ZIP archive: {e}")))?;
        archive
            .extract(&dest)
            .map_err(|e| DocHarvestError::Archive(format!("extraction failed: {e}")))?;

        info!(repo = %repo, dest = %dest.display(), files = archive.len(), "repository extracted");
        Ok(dest)
    }
}
