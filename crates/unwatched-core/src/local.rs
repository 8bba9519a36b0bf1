use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::tautulli::models::MediaDetailRecord;

/// Maps a server-side file path onto the local mount:
/// `local_root / grandparent_title / (file_path - remote_prefix)`.
///
/// An unconfigured resolver reports every file as missing.
#[derive(Debug, Clone, Default)]
pub struct LocalResolver {
    local_root: Option<PathBuf>,
    remote_prefix: Option<String>,
    strict: bool,
}

impl LocalResolver {
    pub fn new(local_root: Option<PathBuf>, remote_prefix: Option<String>) -> Self {
        Self {
            local_root,
            remote_prefix,
            strict: false,
        }
    }

    /// Component-aware prefix stripping instead of substring removal.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.local_root.is_some() && self.remote_prefix.is_some()
    }

    pub fn local_path(&self, grandparent_title: &str, file_path: &str) -> Option<PathBuf> {
        let (root, prefix) = match (&self.local_root, &self.remote_prefix) {
            (Some(root), Some(prefix)) => (root, prefix),
            _ => return None,
        };

        let relative = if self.strict {
            Path::new(file_path)
                .strip_prefix(prefix)
                .ok()?
                .to_path_buf()
        } else {
            let stripped = file_path.replace(prefix.as_str(), "");
            PathBuf::from(stripped.trim_start_matches(['/', '\\']))
        };

        Some(root.join(grandparent_title).join(relative))
    }

    pub fn exists(&self, grandparent_title: &str, file_path: &str) -> bool {
        let Some(local) = self.local_path(grandparent_title, file_path) else {
            return false;
        };
        debug!("Checking local file: {}", local.display());
        fs::metadata(&local).is_ok()
    }

    /// Split records into (present locally, missing), keeping order.
    pub fn partition(
        &self,
        items: &[MediaDetailRecord],
    ) -> (Vec<MediaDetailRecord>, Vec<MediaDetailRecord>) {
        items
            .iter()
            .cloned()
            .partition(|item| self.exists(&item.grandparent_title, &item.file_path))
    }
}
