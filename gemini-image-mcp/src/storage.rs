//! Output directory management.
//!
//! Images are written through a temporary file in the output directory and
//! renamed into place without clobbering, so a listing never sees a partial
//! file and a name collision fails instead of overwriting.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use gemini_image_mcp_common::error::{Error, StorageError};
use tracing::{debug, info, instrument};

use crate::format::{ImageFormat, has_image_extension};
use crate::request::{GeneratedImage, MAX_SOURCE_BYTES, SourceImage};

/// Smallest limit accepted by the listing tool.
pub const MIN_LIST_LIMIT: usize = 10;

/// Largest limit accepted by the listing tool.
pub const MAX_LIST_LIMIT: usize = 100;

/// Clamp a caller-provided listing limit to `[MIN_LIST_LIMIT, MAX_LIST_LIMIT]`.
pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(MIN_LIST_LIMIT as i64, MAX_LIST_LIMIT as i64) as usize
}

/// An image found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImageRef {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Last modification time
    pub modified: SystemTime,
}

/// Flat directory of generated images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create a store over `dir`. The directory is not created.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::DirectoryNotFound(self.dir.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::DirectoryNotFound(self.dir.clone()))
            }
            Err(e) => Err(StorageError::read_failed(&self.dir, e.to_string())),
        }
    }

    /// Write `image` under its filename and return the absolute path.
    ///
    /// # Errors
    /// - `StorageError::DirectoryNotFound` if the output directory is missing
    /// - `StorageError::AlreadyExists` if a file with that name exists
    /// - `StorageError::WriteFailed` for any other write failure
    #[instrument(
        level = "debug",
        skip(self, image),
        fields(filename = %image.filename, size = image.data.len())
    )]
    pub async fn save(&self, image: &GeneratedImage) -> Result<PathBuf, Error> {
        self.ensure_dir().await?;

        let dir = self.dir.clone();
        let target = self.dir.join(&image.filename);
        let data = image.data.clone();

        let path = tokio::task::spawn_blocking(move || write_no_clobber(&dir, &target, &data))
            .await
            .map_err(|e| {
                StorageError::write_failed(self.dir.join(&image.filename), e.to_string())
            })??;

        info!(path = %path.display(), "Image saved");
        Ok(path)
    }

    /// Images directly under the directory, newest first.
    ///
    /// Returns at most `limit` paths when given. Files without a recognized
    /// image extension are skipped.
    #[instrument(level = "debug", skip(self))]
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<PathBuf>, Error> {
        let mut images = self.scan().await?;

        // Newest first; ties broken by name for a stable order.
        images.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
        if let Some(limit) = limit {
            images.truncate(limit);
        }

        debug!(count = images.len(), "Listed images");
        Ok(images.into_iter().map(|image| image.path).collect())
    }

    async fn scan(&self) -> Result<Vec<StoredImageRef>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::DirectoryNotFound(self.dir.clone()));
            }
            Err(e) => return Err(StorageError::read_failed(&self.dir, e.to_string())),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::read_failed(&self.dir, e.to_string()))?
        {
            let path = entry.path();
            if !has_image_extension(&path) {
                continue;
            }
            // Entries can vanish between read_dir and metadata.
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            images.push(StoredImageRef { path, modified });
        }

        Ok(images)
    }

    /// Resolve a caller-supplied name to a file in the output directory.
    ///
    /// Accepts a bare filename or an absolute path whose parent is the output
    /// directory (the form returned by listing). The file must exist exactly;
    /// there is no fuzzy matching.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("image_filename cannot be empty"));
        }

        let given = Path::new(name);
        let file_name = if given.is_absolute() {
            if given.parent() != Some(self.dir.as_path()) {
                return Err(Error::validation(format!(
                    "{} is not inside the output directory {}",
                    name,
                    self.dir.display()
                )));
            }
            given.file_name()
        } else {
            let mut components = given.components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(file_name)), None) => Some(file_name),
                _ => None,
            }
        };

        let Some(file_name) = file_name else {
            return Err(Error::validation(format!(
                "{} must be a file name inside the output directory",
                name
            )));
        };

        self.ensure_dir().await?;

        let path = self.dir.join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(StorageError::ImageNotFound(name.to_string()).into()),
        }
    }

    /// Read an image from the output directory for transformation.
    ///
    /// Files over [`MAX_SOURCE_BYTES`] are rejected before they are read. The
    /// format comes from the file's magic bytes, falling back to its
    /// extension.
    #[instrument(level = "debug", skip(self))]
    pub async fn read_source(&self, name: &str) -> Result<SourceImage, Error> {
        let path = self.resolve(name).await?;

        let len = tokio::fs::metadata(&path)
            .await
            .map_err(|e| StorageError::read_failed(&path, e.to_string()))?
            .len();
        if len > MAX_SOURCE_BYTES as u64 {
            return Err(Error::validation(format!(
                "{} is {} bytes, the limit is {} bytes",
                name, len, MAX_SOURCE_BYTES
            )));
        }

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::read_failed(&path, e.to_string()))?;

        let format = ImageFormat::sniff(&data)
            .or_else(|| ImageFormat::from_path(&path))
            .ok_or_else(|| {
                Error::validation(format!(
                    "Could not identify the format of {}; supported formats are PNG, JPEG and WebP",
                    name
                ))
            })?;

        debug!(path = %path.display(), %format, size = data.len(), "Loaded source image");
        Ok(SourceImage { data, format })
    }
}

fn write_no_clobber(dir: &Path, target: &Path, data: &[u8]) -> Result<PathBuf, StorageError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".incoming-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| StorageError::write_failed(target, e.to_string()))?;

    tmp.write_all(data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StorageError::write_failed(target, e.to_string()))?;

    tmp.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            StorageError::AlreadyExists(target.to_path_buf())
        } else {
            StorageError::write_failed(target, e.error.to_string())
        }
    })?;

    Ok(target.to_path_buf())
}
