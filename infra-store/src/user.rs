use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use prescreen_domain::{DomainError, RecordingRef, UserRecord, UserStorePort};

/// In-memory user store keyed by user identifier.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, id: &str) {
        self.users.write().await.insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                recorded_audios: Vec::new(),
            },
        );
    }

    pub async fn get(&self, id: &str) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }
}

#[async_trait]
impl UserStorePort for InMemoryUserStore {
    async fn push_recording(
        &self,
        user_id: &str,
        recording: RecordingRef,
    ) -> Result<u64, DomainError> {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                user.recorded_audios.push(recording);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn bulk_push_recordings(
        &self,
        updates: &[(String, RecordingRef)],
    ) -> Result<u64, DomainError> {
        let mut users = self.users.write().await;
        let mut matched = 0;
        for (user_id, recording) in updates {
            if let Some(user) = users.get_mut(user_id) {
                user.recorded_audios.push(recording.clone());
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn ids(&self) -> Result<Vec<String>, DomainError> {
        let mut ids: Vec<String> = self.users.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
