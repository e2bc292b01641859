use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use prescreen_domain::{BlobStorePort, DomainError, RecordingType};

/// Directory-backed blob store: one subdirectory per recording type, blob
/// names drawn from random UUIDs. Stands in for a cloud blob service behind
/// the same port.
#[derive(Debug)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStorePort for DirectoryBlobStore {
    async fn store_many(
        &self,
        entries: &[(String, PathBuf)],
        rec_type: &RecordingType,
    ) -> Result<HashMap<String, String>, DomainError> {
        let target_dir = self.root.join(rec_type.as_str());
        tokio::fs::create_dir_all(&target_dir).await.map_err(|error| {
            DomainError::store(format!(
                "cannot create blob directory {}: {error}",
                target_dir.display()
            ))
        })?;

        let mut name_to_blob = HashMap::with_capacity(entries.len());
        for (name, path) in entries {
            let blob_id = Uuid::new_v4().simple().to_string();
            let target = target_dir.join(&blob_id);
            tokio::fs::copy(path, &target).await.map_err(|error| {
                DomainError::store(format!(
                    "cannot store blob for {}: {error}",
                    path.display()
                ))
            })?;
            tracing::debug!(submission = %name, blob = %blob_id, "blob stored");
            name_to_blob.insert(name.clone(), blob_id);
        }
        Ok(name_to_blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn stores_each_entry_under_the_type_directory() {
        let dir = TempDir::new().expect("tempdir");
        let audio = dir.path().join("sub.wav");
        std::fs::write(&audio, b"RIFF").expect("audio written");
        let store = DirectoryBlobStore::new(dir.path().join("blobs"));

        let mapping = store
            .store_many(
                &[("sub".to_string(), audio)],
                &RecordingType::Normal,
            )
            .await
            .expect("store succeeds");

        let blob_id = mapping.get("sub").expect("mapping entry");
        assert!(dir.path().join("blobs/normal").join(blob_id).exists());
    }

    #[tokio::test]
    async fn missing_source_file_is_a_store_error() {
        let dir = TempDir::new().expect("tempdir");
        let store = DirectoryBlobStore::new(dir.path().join("blobs"));

        let result = store
            .store_many(
                &[("ghost".to_string(), dir.path().join("ghost.wav"))],
                &RecordingType::Buzz,
            )
            .await;

        assert!(result.is_err());
    }
}
