use crate::error::{Error, Result};
use crate::services::authoring_service::AuthoringSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<AuthoringSession>>;

/// In-memory authoring sessions. Nothing here outlives the process.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SharedSession {
        let session = AuthoringSession::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        tracing::info!(session_id = %id, "authoring session started");
        shared
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Authoring session {}", id)))
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                tracing::info!(session_id = %id, "authoring session discarded");
                Ok(())
            }
            None => Err(Error::NotFound(format!("Authoring session {}", id))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new();
        let shared = store.create().await;
        let id = shared.lock().await.id;

        let fetched = store.get(id).await.unwrap();
        fetched.lock().await.test.title = "Shared".into();
        assert_eq!(shared.lock().await.test.title, "Shared");
        assert_eq!(store.len().await, 1);

        store.remove(id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(store.get(id).await, Err(Error::NotFound(_))));
        assert!(store.remove(id).await.is_err());
    }
}
