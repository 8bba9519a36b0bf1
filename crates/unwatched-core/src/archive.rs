//! Archival of candidates: a local zip file, or offload to object storage
//! through rclone.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ArchiveConfig;
use crate::error::Error;

pub const ARCHIVE_FILE_NAME: &str = "archived_media.zip";

#[derive(Debug, Default)]
pub struct ArchiveOutcome {
    pub archive: PathBuf,
    pub archived: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    /// Files whose name was already taken by an earlier entry.
    pub duplicates: Vec<PathBuf>,
}

/// Writes existing files, flattened to their file names, into
/// `<archive_path>/archived_media.zip`.
pub struct Archiver {
    archive_path: PathBuf,
}

impl Archiver {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            archive_path: PathBuf::from(&config.archive_path),
        }
    }

    pub fn archive_file(&self) -> PathBuf {
        self.archive_path.join(ARCHIVE_FILE_NAME)
    }

    pub fn archive<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ArchiveOutcome, Error> {
        fs::create_dir_all(&self.archive_path)?;
        let archive_file = self.archive_file();
        let mut zip = ZipWriter::new(File::create(&archive_file)?);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(true);

        let mut outcome = ArchiveOutcome {
            archive: archive_file.clone(),
            ..Default::default()
        };
        let mut names = HashSet::new();

        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                warn!("File not found: {}", path.display());
                outcome.missing.push(path.to_path_buf());
                continue;
            }

            let name = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !names.insert(name.clone()) {
                warn!("Duplicate name '{}', skipping {}", name, path.display());
                outcome.duplicates.push(path.to_path_buf());
                continue;
            }

            let mut source = File::open(path)?;
            zip.start_file(name, options)?;
            io::copy(&mut source, &mut zip)?;
            info!("Archived: {}", path.display());
            outcome.archived.push(path.to_path_buf());
        }

        zip.finish()?;
        info!("Archive created at: {}", archive_file.display());
        Ok(outcome)
    }
}

#[derive(Debug, Default)]
pub struct OffloadOutcome {
    pub uploaded: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct Offloader {
    rclone_path: String,
    bucket: String,
    rc_url: String,
}

impl Offloader {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            rclone_path: config.rclone_path.clone(),
            bucket: config.s3_bucket.clone(),
            rc_url: config.rclone_url.clone(),
        }
    }

    /// `<bucket>:<remote_dir>/<file name>`
    pub fn destination(&self, file: &Path, remote_dir: &str) -> String {
        let name = file
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let remote_dir = remote_dir.trim_matches('/');
        if remote_dir.is_empty() {
            format!("{}:{}", self.bucket, name)
        } else {
            format!("{}:{}/{}", self.bucket, remote_dir, name)
        }
    }

    /// Move each existing file to the bucket. Failures are collected, the
    /// batch always runs to the end.
    pub fn offload<P: AsRef<Path>>(&self, paths: &[P], remote_dir: &str) -> OffloadOutcome {
        let mut outcome = OffloadOutcome::default();

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                warn!("File not found: {}", path.display());
                outcome.missing.push(path.to_path_buf());
                continue;
            }

            let destination = self.destination(path, remote_dir);
            let result = run(
                Command::new(&self.rclone_path)
                    .arg("moveto")
                    .arg(path)
                    .arg(&destination)
                    .arg("-P"),
            );
            match result {
                Ok(()) => {
                    info!("Uploaded: {} to {}", path.display(), destination);
                    outcome.uploaded.push(path.to_path_buf());
                }
                Err(e) => {
                    error!("Failed to upload '{}': {}", path.display(), e);
                    outcome.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        outcome
    }

    /// Ask the rclone remote-control server to refresh its VFS cache.
    pub fn refresh_cache(&self) -> Result<bool, Error> {
        if self.rc_url.trim().is_empty() {
            info!("Rclone URL not set. Skipping cache refresh.");
            return Ok(false);
        }
        run(
            Command::new(&self.rclone_path)
                .args(["rc", "--url", self.rc_url.as_str(), "vfs/refresh", "recursive=true"]),
        )?;
        info!("Rclone cache refreshed.");
        Ok(true)
    }
}

fn run(command: &mut Command) -> Result<(), Error> {
    let status = command.status()?;
    if status.success() {
        Ok(())
    } else {
        Err(Error::Offload(format!(
            "{:?} exited with {}",
            command.get_program(),
            status
        )))
    }
}
