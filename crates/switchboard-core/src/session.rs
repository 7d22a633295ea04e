//! Session storage collaborator.
//!
//! The engine does not own session persistence; it talks to an injected
//! [`SessionStore`] keyed by an opaque session identifier. The
//! [`Sessions`] handle layers the get-or-create convention on top:
//! absent sessions are initialized with a caller-supplied default field,
//! and a stored value that is not a JSON object is a type conflict.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::SessionError;

/// The expected shape of a stored session: a JSON object.
pub type SessionData = serde_json::Map<String, Value>;

/// Key-value backend for session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the raw stored value for `id`, if any.
    async fn load(&self, id: &str) -> Result<Option<Value>, SessionError>;

    /// Persist the raw value for `id`.
    async fn save(&self, id: &str, data: Value) -> Result<(), SessionError>;
}

/// Shared handle over a session store.
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
}

impl Sessions {
    /// Wrap a store.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Fetch the session for `id`, creating it when absent.
    ///
    /// A newly created session is initialized as an object holding
    /// `default_key: default_value` and persisted before being returned.
    ///
    /// # Errors
    ///
    /// [`SessionError::TypeConflict`] when a stored value exists but is
    /// not an object; backend errors pass through.
    pub async fn get_or_create(
        &self,
        id: &str,
        default_key: &str,
        default_value: Value,
    ) -> Result<SessionData, SessionError> {
        match self.store.load(id).await? {
            Some(Value::Object(data)) => Ok(data),
            Some(_) => Err(SessionError::TypeConflict { id: id.to_string() }),
            None => {
                tracing::debug!(id, "initializing new session");
                let mut data = SessionData::new();
                data.insert(default_key.to_string(), default_value);
                self.store.save(id, Value::Object(data.clone())).await?;
                Ok(data)
            }
        }
    }

    /// Persist `data` for `id`.
    pub async fn save(&self, id: &str, data: SessionData) -> Result<(), SessionError> {
        self.store.save(id, Value::Object(data)).await
    }
}

impl std::fmt::Debug for Sessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sessions").finish_non_exhaustive()
    }
}

/// In-memory session store for tests and development.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<Value>, SessionError> {
        Ok(self.entries.read().get(id).cloned())
    }

    async fn save(&self, id: &str, data: Value) -> Result<(), SessionError> {
        self.entries.write().insert(id.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn absent_session_is_created_with_default_field() {
        let sessions = Sessions::new(MemorySessionStore::new());
        let data = sessions
            .get_or_create("sid-1", "visits", json!(0))
            .await
            .unwrap();
        assert_eq!(data.get("visits"), Some(&json!(0)));

        // The created session was persisted.
        let again = sessions
            .get_or_create("sid-1", "visits", json!(99))
            .await
            .unwrap();
        assert_eq!(again.get("visits"), Some(&json!(0)));
    }

    #[tokio::test]
    async fn saved_data_round_trips() {
        let sessions = Sessions::new(MemorySessionStore::new());
        let mut data = sessions
            .get_or_create("sid-2", "user", json!(null))
            .await
            .unwrap();
        data.insert("user".to_string(), json!("ada"));
        sessions.save("sid-2", data).await.unwrap();

        let loaded = sessions
            .get_or_create("sid-2", "user", json!(null))
            .await
            .unwrap();
        assert_eq!(loaded.get("user"), Some(&json!("ada")));
    }

    #[tokio::test]
    async fn incompatible_shape_is_a_type_conflict() {
        let store = MemorySessionStore::new();
        store.save("sid-3", json!("not an object")).await.unwrap();

        let sessions = Sessions::new(store);
        let err = sessions
            .get_or_create("sid-3", "user", json!(null))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TypeConflict { .. }));
    }
}
