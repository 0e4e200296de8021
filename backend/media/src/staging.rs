//! Upload staging: writes incoming images to the upload directory and hands
//! them to the pipeline as owned [`ImagePayload`]s.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use narrator_core::{sanitize_filename, ImagePayload, ValidationError};
use thiserror::Error;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to stage upload at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check a client-supplied filename and return its sanitized form.
pub fn validate_filename(original: &str) -> Result<String, ValidationError> {
    if original.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    let sanitized = sanitize_filename(original);
    if sanitized.is_empty() {
        return Err(ValidationError::UnusableFilename(original.to_string()));
    }
    Ok(sanitized)
}

/// Writes uploads into a dedicated directory under request-unique names.
#[derive(Debug, Clone)]
pub struct UploadStager {
    upload_dir: PathBuf,
}

impl UploadStager {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self { upload_dir: upload_dir.into() }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Persist `bytes` and return the payload that owns the staged file.
    pub async fn stage(&self, original_name: &str, bytes: Bytes) -> Result<ImagePayload, StagingError> {
        let filename = validate_filename(original_name)?;

        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| StagingError::Io { path: self.upload_dir.clone(), source })?;

        let path = self.upload_dir.join(format!("{}_{}", Uuid::new_v4().simple(), filename));
        fs::write(&path, &bytes)
            .await
            .map_err(|source| StagingError::Io { path: path.clone(), source })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Staged upload");
        Ok(ImagePayload::new(filename, bytes, path))
    }

    /// Stage a copy of a local file. The original is left untouched.
    pub async fn stage_file(&self, source: &Path) -> Result<ImagePayload, StagingError> {
        let bytes = fs::read(source)
            .await
            .map_err(|e| StagingError::Io { path: source.to_path_buf(), source: e })?;
        let name = source.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.stage(name, Bytes::from(bytes)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stager() -> UploadStager {
        UploadStager::new(std::env::temp_dir().join(format!("narrator-staging-{}", Uuid::new_v4())))
    }

    #[test]
    fn empty_and_unusable_filenames_are_rejected() {
        assert_eq!(validate_filename(""), Err(ValidationError::EmptyFilename));
        assert_eq!(validate_filename("  "), Err(ValidationError::EmptyFilename));
        assert_eq!(validate_filename("..."), Err(ValidationError::UnusableFilename("...".into())));
        assert_eq!(validate_filename("my cat.png").unwrap(), "my_cat.png");
    }

    #[tokio::test]
    async fn stage_writes_unique_file_under_upload_dir() {
        let stager = stager();
        let a = stager.stage("cat.png", Bytes::from_static(b"abc")).await.unwrap();
        let b = stager.stage("cat.png", Bytes::from_static(b"abc")).await.unwrap();

        let (pa, pb) = (a.staged_path().unwrap().to_path_buf(), b.staged_path().unwrap().to_path_buf());
        assert_ne!(pa, pb);
        assert!(pa.starts_with(stager.upload_dir()));
        assert!(pa.to_string_lossy().ends_with("_cat.png"));
        assert_eq!(a.filename(), "cat.png");
        assert_eq!(std::fs::read(&pa).unwrap(), b"abc");

        a.release().await;
        b.release().await;
        assert!(!pa.exists() && !pb.exists());
    }

    #[tokio::test]
    async fn stage_rejects_empty_filename_without_writing() {
        let stager = stager();
        let err = stager.stage("", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, StagingError::Validation(ValidationError::EmptyFilename)));
        assert!(!stager.upload_dir().exists());
    }

    #[tokio::test]
    async fn stage_file_keeps_the_original() {
        let src_dir = std::env::temp_dir().join(format!("narrator-src-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&src_dir).unwrap();
        let src = src_dir.join("photo.jpg");
        std::fs::write(&src, b"jpeg").unwrap();

        let payload = stager().stage_file(&src).await.unwrap();
        assert_eq!(payload.filename(), "photo.jpg");
        assert_eq!(payload.bytes(), b"jpeg");
        payload.release().await;
        assert!(src.exists());
    }
}
