use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use prescreen_application::{
    ArchiveUseCase, ArchiveUseCaseImpl, BatchReport, CatalogUseCase, CatalogUseCaseImpl,
    SubmissionOutcome,
};
use prescreen_domain::{
    BlobStorePort, DomainError, QuestionQuery, QuestionRecord, QuestionStorePort,
    RecordingDocument, RecordingRef, RecordingStorePort, RecordingType, SubmissionMetadata,
    SubmissionSurfacePort, TriageFault, TriageResult, UserStorePort,
};

#[derive(Default)]
struct MockBlobStore {
    calls: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl BlobStorePort for MockBlobStore {
    async fn store_many(
        &self,
        entries: &[(String, PathBuf)],
        rec_type: &RecordingType,
    ) -> Result<HashMap<String, String>, DomainError> {
        self.calls
            .lock()
            .expect("lock")
            .push((rec_type.as_str().to_string(), entries.len()));
        Ok(entries
            .iter()
            .map(|(name, _)| (name.clone(), format!("blob-{name}")))
            .collect())
    }
}

#[derive(Default)]
struct MockRecordingStore {
    pending: Mutex<Vec<RecordingDocument>>,
    processed: Mutex<Vec<RecordingDocument>>,
}

#[async_trait]
impl RecordingStorePort for MockRecordingStore {
    async fn insert_pending(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError> {
        self.pending.lock().expect("lock").extend(documents);
        Ok(())
    }

    async fn insert_processed(&self, documents: Vec<RecordingDocument>) -> Result<(), DomainError> {
        self.processed.lock().expect("lock").extend(documents);
        Ok(())
    }
}

struct MockUserStore {
    known: Vec<String>,
    pushed: Mutex<Vec<(String, RecordingRef)>>,
}

impl MockUserStore {
    fn with_users(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|id| id.to_string()).collect(),
            pushed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserStorePort for MockUserStore {
    async fn push_recording(
        &self,
        user_id: &str,
        recording: RecordingRef,
    ) -> Result<u64, DomainError> {
        if !self.known.contains(&user_id.to_string()) {
            return Ok(0);
        }
        self.pushed
            .lock()
            .expect("lock")
            .push((user_id.to_string(), recording));
        Ok(1)
    }

    async fn bulk_push_recordings(
        &self,
        updates: &[(String, RecordingRef)],
    ) -> Result<u64, DomainError> {
        let mut matched = 0;
        for (user_id, recording) in updates {
            if self.known.contains(user_id) {
                self.pushed
                    .lock()
                    .expect("lock")
                    .push((user_id.clone(), recording.clone()));
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn ids(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.known.clone())
    }
}

#[derive(Default)]
struct MockQuestionStore {
    unrecorded: Mutex<Vec<QuestionRecord>>,
    recorded: Mutex<Vec<QuestionRecord>>,
}

impl MockQuestionStore {
    fn with_unrecorded(records: Vec<QuestionRecord>) -> Self {
        Self {
            unrecorded: Mutex::new(records),
            recorded: Mutex::new(Vec::new()),
        }
    }

    fn with_recorded(records: Vec<QuestionRecord>) -> Self {
        Self {
            unrecorded: Mutex::new(Vec::new()),
            recorded: Mutex::new(records),
        }
    }
}

#[async_trait]
impl QuestionStorePort for MockQuestionStore {
    async fn find_unrecorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError> {
        Ok(self
            .unrecorded
            .lock()
            .expect("lock")
            .iter()
            .find(|question| question.matches(query))
            .cloned())
    }

    async fn find_recorded(
        &self,
        query: &QuestionQuery,
    ) -> Result<Option<QuestionRecord>, DomainError> {
        Ok(self
            .recorded
            .lock()
            .expect("lock")
            .iter()
            .find(|question| question.matches(query))
            .cloned())
    }

    async fn insert_recorded(&self, question: QuestionRecord) -> Result<(), DomainError> {
        self.recorded.lock().expect("lock").push(question);
        Ok(())
    }

    async fn delete_unrecorded(&self, question_id: i64) -> Result<(), DomainError> {
        self.unrecorded
            .lock()
            .expect("lock")
            .retain(|question| question.question_id != question_id);
        Ok(())
    }

    async fn push_recording(
        &self,
        question_id: i64,
        recording: RecordingRef,
    ) -> Result<u64, DomainError> {
        let mut recorded = self.recorded.lock().expect("lock");
        match recorded
            .iter_mut()
            .find(|question| question.question_id == question_id)
        {
            Some(question) => {
                question.recordings.push(recording);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn bulk_push_recordings(
        &self,
        updates: &[(i64, RecordingRef)],
    ) -> Result<u64, DomainError> {
        let mut matched = 0;
        for (question_id, recording) in updates {
            matched += self.push_recording(*question_id, recording.clone()).await?;
        }
        Ok(matched)
    }

    async fn unrecorded_ids(&self) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .unrecorded
            .lock()
            .expect("lock")
            .iter()
            .map(|question| question.question_id)
            .collect())
    }

    async fn recorded_ids(&self) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .recorded
            .lock()
            .expect("lock")
            .iter()
            .map(|question| question.question_id)
            .collect())
    }
}

#[derive(Default)]
struct MockSurface {
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl SubmissionSurfacePort for MockSurface {
    async fn poll(&self, _limit: usize) -> Result<Vec<String>, DomainError> {
        Ok(Vec::new())
    }

    async fn metadata(&self, _name: &str) -> Result<Option<SubmissionMetadata>, DomainError> {
        Ok(None)
    }

    fn audio_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("/queue/{name}.wav"))
    }

    async fn audio_duration(&self, _name: &str) -> Result<f64, DomainError> {
        Ok(1.0)
    }

    async fn delete(&self, name: &str) -> Result<(), DomainError> {
        self.deleted.lock().expect("lock").push(name.to_string());
        Ok(())
    }

    async fn quarantine(&self, _name: &str) -> Result<(), DomainError> {
        Ok(())
    }
}

fn question(question_id: i64) -> QuestionRecord {
    QuestionRecord {
        question_id,
        sentence_id: None,
        transcript: Some("a transcript".to_string()),
        tokenizations: Vec::new(),
        recordings: Vec::new(),
    }
}

fn recording(id: &str) -> RecordingRef {
    RecordingRef {
        id: id.to_string(),
        rec_type: RecordingType::Normal,
    }
}

fn accepted_normal(name: &str, question_id: i64) -> SubmissionOutcome {
    let mut metadata = SubmissionMetadata::new(RecordingType::Normal);
    metadata.question_id = Some(question_id);
    metadata.user_id = Some("u1".to_string());
    SubmissionOutcome {
        name: name.to_string(),
        result: TriageResult::Accepted {
            metadata,
            vtt: Some("WEBVTT Kind: captions; Language: en".to_string()),
            accuracy: Some(0.9),
        },
    }
}

fn accepted_buzz(name: &str, user_id: Option<&str>) -> SubmissionOutcome {
    let mut metadata = SubmissionMetadata::new(RecordingType::Buzz);
    metadata.user_id = user_id.map(str::to_string);
    SubmissionOutcome {
        name: name.to_string(),
        result: TriageResult::Accepted {
            metadata,
            vtt: None,
            accuracy: None,
        },
    }
}

async fn catalog_with(
    questions: Arc<MockQuestionStore>,
    users: Arc<MockUserStore>,
) -> CatalogUseCaseImpl {
    CatalogUseCaseImpl::bootstrap(questions, users)
        .await
        .expect("catalog bootstraps")
}

#[tokio::test]
async fn archive_routes_documents_per_partition_and_cleans_up() {
    let blobs = Arc::new(MockBlobStore::default());
    let recordings = Arc::new(MockRecordingStore::default());
    let users = Arc::new(MockUserStore::with_users(&["u1"]));
    let surface = Arc::new(MockSurface::default());
    let catalog = Arc::new(catalog_with(Arc::new(MockQuestionStore::default()), users.clone()).await);
    let archive = ArchiveUseCaseImpl::new(blobs.clone(), recordings.clone(), catalog, surface.clone());

    let report = BatchReport {
        outcomes: vec![
            accepted_normal("normal-1", 7),
            accepted_buzz("buzz-1", Some("u1")),
            SubmissionOutcome {
                name: "rejected-1".to_string(),
                result: TriageResult::Rejected { accuracy: 0.2 },
            },
            SubmissionOutcome {
                name: "errored-1".to_string(),
                result: TriageResult::Error {
                    fault: TriageFault::MetaNotFound,
                },
            },
        ],
    };

    let summary = archive.archive_batch(&report).await.expect("archive succeeds");

    assert_eq!(summary.archived, vec!["normal-1", "buzz-1"]);
    assert!(summary.persistence_faults.is_empty());

    // One blob call per recording type.
    assert_eq!(
        blobs.calls.lock().expect("lock").clone(),
        vec![("normal".to_string(), 1), ("buzz".to_string(), 1)]
    );

    let pending = recordings.pending.lock().expect("lock").clone();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "blob-normal-1");
    assert!(pending[0].vtt.is_some());
    assert_eq!(pending[0].accuracy, Some(0.9));

    let processed = recordings.processed.lock().expect("lock").clone();
    assert_eq!(processed.len(), 1);
    assert_eq!(processed[0].id, "blob-buzz-1");

    let pushed = users.pushed.lock().expect("lock").clone();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].0, "u1");
    assert_eq!(pushed[0].1.rec_type, RecordingType::Buzz);

    // Accepted submissions are consumed; errored and rejected are not
    // touched here.
    assert_eq!(
        surface.deleted.lock().expect("lock").clone(),
        vec!["normal-1", "buzz-1"]
    );
}

#[tokio::test]
async fn missing_user_reference_becomes_a_fault_not_an_abort() {
    let users = Arc::new(MockUserStore::with_users(&[]));
    let surface = Arc::new(MockSurface::default());
    let catalog = Arc::new(catalog_with(Arc::new(MockQuestionStore::default()), users).await);
    let archive = ArchiveUseCaseImpl::new(
        Arc::new(MockBlobStore::default()),
        Arc::new(MockRecordingStore::default()),
        catalog,
        surface,
    );

    let report = BatchReport {
        outcomes: vec![accepted_buzz("buzz-1", None)],
    };

    let summary = archive.archive_batch(&report).await.expect("archive succeeds");

    assert_eq!(summary.archived, vec!["buzz-1"]);
    assert_eq!(
        summary.persistence_faults,
        vec![TriageFault::UndefinedUserId]
    );
}

#[tokio::test]
async fn unmatched_user_updates_surface_as_faults_per_document() {
    let users = Arc::new(MockUserStore::with_users(&["known"]));
    let surface = Arc::new(MockSurface::default());
    let catalog = Arc::new(catalog_with(Arc::new(MockQuestionStore::default()), users).await);
    let archive = ArchiveUseCaseImpl::new(
        Arc::new(MockBlobStore::default()),
        Arc::new(MockRecordingStore::default()),
        catalog,
        surface,
    );

    let report = BatchReport {
        outcomes: vec![
            accepted_buzz("buzz-1", Some("known")),
            accepted_buzz("buzz-2", Some("ghost-1")),
            accepted_buzz("buzz-3", Some("ghost-2")),
        ],
    };

    let summary = archive.archive_batch(&report).await.expect("archive succeeds");

    assert_eq!(
        summary.persistence_faults,
        vec![TriageFault::UserUpdateFailure, TriageFault::UserUpdateFailure]
    );
}

#[tokio::test]
async fn empty_report_archives_nothing() {
    let blobs = Arc::new(MockBlobStore::default());
    let users = Arc::new(MockUserStore::with_users(&[]));
    let surface = Arc::new(MockSurface::default());
    let catalog = Arc::new(catalog_with(Arc::new(MockQuestionStore::default()), users).await);
    let archive = ArchiveUseCaseImpl::new(
        blobs.clone(),
        Arc::new(MockRecordingStore::default()),
        catalog,
        surface,
    );

    let summary = archive
        .archive_batch(&BatchReport::default())
        .await
        .expect("archive succeeds");

    assert!(summary.archived.is_empty());
    assert!(blobs.calls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn first_recording_moves_a_question_between_partitions() {
    let questions = Arc::new(MockQuestionStore::with_unrecorded(vec![question(7)]));
    let users = Arc::new(MockUserStore::with_users(&[]));
    let catalog = catalog_with(questions.clone(), users).await;
    assert_eq!(catalog.known_unrecorded_question_ids(), vec![7]);
    assert!(catalog.known_recorded_question_ids().is_empty());

    let fault = catalog
        .attach_recording_to_question(Some(7), recording("r1"))
        .await
        .expect("attach succeeds");

    assert_eq!(fault, None);
    assert!(questions.unrecorded.lock().expect("lock").is_empty());
    let recorded = questions.recorded.lock().expect("lock").clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].recordings.len(), 1);
    // Caches track the move: appended on insert, refreshed on delete.
    assert_eq!(catalog.known_recorded_question_ids(), vec![7]);
    assert!(catalog.known_unrecorded_question_ids().is_empty());
}

#[tokio::test]
async fn later_recordings_push_onto_the_recorded_question() {
    let questions = Arc::new(MockQuestionStore::with_recorded(vec![question(7)]));
    let users = Arc::new(MockUserStore::with_users(&[]));
    let catalog = catalog_with(questions.clone(), users).await;

    let fault = catalog
        .attach_recording_to_question(Some(7), recording("r2"))
        .await
        .expect("attach succeeds");

    assert_eq!(fault, None);
    let recorded = questions.recorded.lock().expect("lock").clone();
    assert_eq!(recorded[0].recordings.len(), 1);
}

#[tokio::test]
async fn question_linkage_faults_are_reported_not_raised() {
    let questions = Arc::new(MockQuestionStore::default());
    let users = Arc::new(MockUserStore::with_users(&["u1"]));
    let catalog = catalog_with(questions, users).await;

    let missing_id = catalog
        .attach_recording_to_question(None, recording("r1"))
        .await
        .expect("attach succeeds");
    assert_eq!(missing_id, Some(TriageFault::UndefinedQuestionId));

    let unknown_question = catalog
        .attach_recording_to_question(Some(404), recording("r1"))
        .await
        .expect("attach succeeds");
    assert_eq!(unknown_question, Some(TriageFault::QuestionUpdateFailure));

    let missing_user = catalog
        .attach_recording_to_user(None, recording("r1"))
        .await
        .expect("attach succeeds");
    assert_eq!(missing_user, Some(TriageFault::UndefinedUserId));

    let unknown_user = catalog
        .attach_recording_to_user(Some("ghost"), recording("r1"))
        .await
        .expect("attach succeeds");
    assert_eq!(unknown_user, Some(TriageFault::UserUpdateFailure));

    let attached_user = catalog
        .attach_recording_to_user(Some("u1"), recording("r1"))
        .await
        .expect("attach succeeds");
    assert_eq!(attached_user, None);
}
