use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;

use prescreen_application::{
    ArchiveUseCase, ArchiveUseCaseImpl, CatalogUseCase, CatalogUseCaseImpl, TriageUseCase,
    TriageUseCaseImpl,
};
use prescreen_configuration::AppConfig;
use prescreen_domain::{
    ForcedAlignerPort, QuestionStorePort, ReconcilerConfig, ScoringPolicy, SubmissionSurfacePort,
    TimestampReconciler, UserStorePort,
};
use prescreen_infra_alignment::{HttpAlignerConfig, HttpForcedAligner};
use prescreen_infra_store::{
    DirectoryBlobStore, InMemoryQuestionStore, InMemoryRecordingStore, InMemoryUserStore,
};
use prescreen_infra_surface::{DirectorySubmissionSurface, SurfaceConfig};

use crate::watcher::{SubmissionWatcher, WatcherSettings};

pub async fn build_and_run(config: AppConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run().await
}

pub struct Application {
    watcher: SubmissionWatcher,
    /// Record-linkage entry point for the downstream processing layer.
    pub catalog: Arc<dyn CatalogUseCase>,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        tracing::info!(
            queue_dir = %config.watcher.queue_dir,
            aligner_endpoint = %config.aligner.endpoint,
            min_accuracy = config.triage.min_accuracy,
            "initializing pre-screening application"
        );

        let surface: Arc<dyn SubmissionSurfacePort> = Arc::new(DirectorySubmissionSurface::new(
            SurfaceConfig {
                queue_dir: config.watcher.queue_dir.clone().into(),
                error_dir: config.watcher.error_dir.clone().into(),
                file_types: config.watcher.file_types.clone(),
            },
        )?);
        let aligner: Arc<dyn ForcedAlignerPort> = Arc::new(HttpForcedAligner::new(
            &HttpAlignerConfig {
                endpoint: config.aligner.endpoint.clone(),
                request_timeout_secs: config.aligner.request_timeout_secs,
            },
        )?);

        // In-memory stores; a database-backed adapter plugs in behind the
        // same ports.
        let questions: Arc<InMemoryQuestionStore> = Arc::new(InMemoryQuestionStore::new());
        let users: Arc<InMemoryUserStore> = Arc::new(InMemoryUserStore::new());
        let recordings = Arc::new(InMemoryRecordingStore::new());
        let blobs = Arc::new(DirectoryBlobStore::new(config.storage.blob_dir.clone()));

        let question_port: Arc<dyn QuestionStorePort> = questions;
        let user_port: Arc<dyn UserStorePort> = users;

        let reconciler = TimestampReconciler::new(ReconcilerConfig {
            char_speak_rate: config.triage.char_speak_rate,
        });
        let policy = ScoringPolicy {
            check_unknown_token: config.triage.check_unknown_token,
            unknown_token: config.triage.unknown_token.clone(),
        };

        let triage: Arc<dyn TriageUseCase> = Arc::new(TriageUseCaseImpl::new(
            aligner,
            question_port.clone(),
            surface.clone(),
            reconciler,
            policy,
            config.triage.min_accuracy,
        ));
        let catalog: Arc<dyn CatalogUseCase> = Arc::new(
            CatalogUseCaseImpl::bootstrap(question_port, user_port).await?,
        );
        let archive: Arc<dyn ArchiveUseCase> = Arc::new(ArchiveUseCaseImpl::new(
            blobs,
            recordings,
            catalog.clone(),
            surface.clone(),
        ));

        let watcher = SubmissionWatcher::new(
            surface,
            triage,
            archive,
            WatcherSettings {
                poll_interval: Duration::from_secs_f64(config.watcher.poll_interval_secs),
                poll_size_limit: config.watcher.poll_size_limit,
            },
        );

        Ok(Self { watcher, catalog })
    }

    pub async fn run(self) -> Result<(), Error> {
        self.watcher.run().await
    }
}
