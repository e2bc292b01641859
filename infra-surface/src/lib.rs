use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use prescreen_domain::{DomainError, SubmissionMetadata, SubmissionSurfacePort};

/// Settings for the directory-backed submission surface.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub queue_dir: PathBuf,
    pub error_dir: PathBuf,
    /// File extensions a submission may be backed by, without the dot.
    pub file_types: Vec<String>,
}

impl SurfaceConfig {
    pub fn new(queue_dir: impl Into<PathBuf>, error_dir: impl Into<PathBuf>) -> Self {
        Self {
            queue_dir: queue_dir.into(),
            error_dir: error_dir.into(),
            file_types: vec!["wav".to_string(), "json".to_string()],
        }
    }
}

/// Filesystem submission surface: a queue directory holding
/// `<name>.wav` + `<name>.json` pairs. Polling reports sorted unique base
/// names so batch processing stays deterministic.
pub struct DirectorySubmissionSurface {
    queue_dir: PathBuf,
    error_dir: PathBuf,
    file_types: Vec<String>,
}

impl DirectorySubmissionSurface {
    pub fn new(config: SurfaceConfig) -> Result<Self, DomainError> {
        std::fs::create_dir_all(&config.queue_dir).map_err(|error| {
            DomainError::store(format!(
                "cannot create queue directory {}: {error}",
                config.queue_dir.display()
            ))
        })?;
        std::fs::create_dir_all(&config.error_dir).map_err(|error| {
            DomainError::store(format!(
                "cannot create error directory {}: {error}",
                config.error_dir.display()
            ))
        })?;
        Ok(Self {
            queue_dir: config.queue_dir,
            error_dir: config.error_dir,
            file_types: config.file_types,
        })
    }

    fn file_path(&self, name: &str, extension: &str) -> PathBuf {
        self.queue_dir.join(format!("{name}.{extension}"))
    }
}

#[async_trait]
impl SubmissionSurfacePort for DirectorySubmissionSurface {
    async fn poll(&self, limit: usize) -> Result<Vec<String>, DomainError> {
        let mut entries = tokio::fs::read_dir(&self.queue_dir).await.map_err(|error| {
            DomainError::store(format!(
                "cannot read queue directory {}: {error}",
                self.queue_dir.display()
            ))
        })?;

        let mut names = BTreeSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| DomainError::store(error.to_string()))?
        {
            let path = entry.path();
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.insert(stem.to_string());
            }
        }

        Ok(names.into_iter().take(limit).collect())
    }

    async fn metadata(&self, name: &str) -> Result<Option<SubmissionMetadata>, DomainError> {
        let path = self.file_path(name, "json");
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(DomainError::store(format!(
                    "cannot read metadata {}: {error}",
                    path.display()
                )))
            }
        };
        let metadata = serde_json::from_slice(&raw).map_err(|error| {
            DomainError::invalid_input(&format!("malformed metadata {}: {error}", path.display()))
        })?;
        Ok(Some(metadata))
    }

    fn audio_path(&self, name: &str) -> PathBuf {
        self.file_path(name, "wav")
    }

    async fn audio_duration(&self, name: &str) -> Result<f64, DomainError> {
        let path = self.audio_path(name);
        let reader = hound::WavReader::open(&path).map_err(|error| {
            DomainError::store(format!("cannot open audio {}: {error}", path.display()))
        })?;
        let sample_rate = reader.spec().sample_rate;
        Ok(f64::from(reader.duration()) / f64::from(sample_rate))
    }

    async fn delete(&self, name: &str) -> Result<(), DomainError> {
        for extension in &self.file_types {
            let path = self.file_path(name, extension);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(DomainError::store(format!(
                        "cannot delete {}: {error}",
                        path.display()
                    )))
                }
            }
        }
        Ok(())
    }

    async fn quarantine(&self, name: &str) -> Result<(), DomainError> {
        for extension in &self.file_types {
            let source = self.file_path(name, extension);
            let target = self.error_dir.join(format!("{name}.{extension}"));
            match tokio::fs::rename(&source, &target).await {
                Ok(()) => {
                    tracing::debug!(from = %source.display(), to = %target.display(), "quarantined");
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(DomainError::store(format!(
                        "cannot quarantine {}: {error}",
                        source.display()
                    )))
                }
            }
        }
        Ok(())
    }
}
