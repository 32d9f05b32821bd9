//! Draft files on disk.

use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::domain::Draft;
use crate::services::DraftRenderer;

/// Errors that can occur while saving drafts.
#[derive(Debug, Error)]
pub enum DraftStoreError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes drafts as timestamped text files into one directory.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a draft, from its local generation time.
    pub fn file_name(draft: &Draft) -> String {
        let at = draft.metadata.generated_at.with_timezone(&Local);
        format!("top5_draft_{}.txt", at.format("%Y-%m-%d_%H%M%S"))
    }

    /// Saves a draft, creating the directory if needed. Returns the file path.
    pub async fn save(&self, draft: &Draft) -> Result<PathBuf, DraftStoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DraftStoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(Self::file_name(draft));
        tokio::fs::write(&path, DraftRenderer::format_for_file(draft))
            .await
            .map_err(|source| DraftStoreError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), "draft saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalysisResult;

    #[tokio::test]
    async fn saves_formatted_draft_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path().join("output"));
        let draft = DraftRenderer::default().render(&AnalysisResult::default(), 30);

        let path = store.save(&draft).await.unwrap();

        assert!(path.starts_with(store.dir()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("top5_draft_"));
        assert!(name.ends_with(".txt"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Subject: Top 5 Things - Monthly Update"));
    }
}
