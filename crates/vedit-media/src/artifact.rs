//! Output artifacts and their transient preview files.

use std::path::Path;
use tempfile::NamedTempFile;
use vedit_models::OutputFormat;

use crate::error::MediaResult;

/// Bytes read back from engine storage, tagged for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl OutputArtifact {
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format.output_file_name(),
            mime_type: format.mime_type().to_string(),
            format,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact to a destination path ("download").
    pub async fn save_to(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

/// Transient on-disk copy of the latest artifact, for preview.
///
/// The file is removed when the value is dropped: the runner drops its
/// reference when the next job starts or when the runner itself goes
/// away.
#[derive(Debug)]
pub struct PreviewFile {
    file: NamedTempFile,
    mime_type: String,
}

impl PreviewFile {
    /// Persist an artifact into `dir` (or the system temp dir).
    pub async fn create(artifact: &OutputArtifact, dir: Option<&Path>) -> MediaResult<Self> {
        let suffix = format!(".{}", artifact.format.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("vedit-preview-").suffix(&suffix);
        let file = match dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };

        tokio::fs::write(file.path(), &artifact.bytes).await?;
        Ok(Self {
            file,
            mime_type: artifact.mime_type.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_tagging() {
        let artifact = OutputArtifact::new(OutputFormat::Webm, vec![1, 2, 3]);
        assert_eq!(artifact.file_name, "output.webm");
        assert_eq!(artifact.mime_type, "video/webm");
        assert_eq!(artifact.len(), 3);
    }

    #[tokio::test]
    async fn test_preview_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let artifact = OutputArtifact::new(OutputFormat::Mp4, b"frames".to_vec());

        let preview = PreviewFile::create(&artifact, Some(dir.path())).await.unwrap();
        let path = preview.path().to_path_buf();
        assert!(path.to_string_lossy().ends_with(".mp4"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"frames");
        assert_eq!(preview.mime_type(), "video/mp4");

        drop(preview);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_save_to_creates_parent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("exports").join("clip.mp4");
        let artifact = OutputArtifact::new(OutputFormat::Mp4, b"data".to_vec());

        artifact.save_to(&target).await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"data");
    }
}
