//! Typed access to values held in the session store.
//!
//! Values are serialised as JSON by `tower-sessions`. Reading a value back as
//! the wrong type fails with [`Error::Session`] instead of quietly yielding a
//! default.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tower_sessions::Session;

use crate::error::{Error, Result};

/// Extension trait for working with session data.
///
/// `pop` and `pop_string` remove the entry in the same call that reads it, so
/// a repeated read of a one-shot value observes absence.
#[async_trait]
pub trait SessionExt {
    /// Store a value under `key`, replacing any previous value.
    async fn put<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()>;

    /// Read a value without removing it.
    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Read and remove a value.
    async fn pop<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Read and remove a string, returning `""` when absent.
    async fn pop_string(&self, key: &str) -> Result<String>;

    /// Remove a value without reading it.
    async fn remove_key(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SessionExt for Session {
    async fn put<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        self.insert(key, value)
            .await
            .map_err(|e| Error::Session(format!("Session put error for `{key}`: {e}")))
    }

    async fn get_as<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .await
            .map_err(|e| Error::Session(format!("Session get error for `{key}`: {e}")))
    }

    async fn pop<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        self.remove(key)
            .await
            .map_err(|e| Error::Session(format!("Session pop error for `{key}`: {e}")))
    }

    async fn pop_string(&self, key: &str) -> Result<String> {
        Ok(self.pop::<String>(key).await?.unwrap_or_default())
    }

    async fn remove_key(&self, key: &str) -> Result<()> {
        self.remove_value(key)
            .await
            .map_err(|e| Error::Session(format!("Session remove error for `{key}`: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use tower_sessions_memory_store::MemoryStore;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stay {
        nights: u32,
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_put_then_get_keeps_value() {
        let session = session();
        session.put("stay", &Stay { nights: 2 }).await.unwrap();

        let first: Option<Stay> = session.get_as("stay").await.unwrap();
        let second: Option<Stay> = session.get_as("stay").await.unwrap();
        assert_eq!(first, Some(Stay { nights: 2 }));
        assert_eq!(second, Some(Stay { nights: 2 }));
    }

    #[tokio::test]
    async fn test_pop_consumes_once() {
        let session = session();
        session.put("stay", &Stay { nights: 3 }).await.unwrap();

        let popped: Option<Stay> = session.pop("stay").await.unwrap();
        assert_eq!(popped, Some(Stay { nights: 3 }));

        let again: Option<Stay> = session.pop("stay").await.unwrap();
        assert_eq!(again, None);
    }

    #[tokio::test]
    async fn test_pop_string_defaults_to_empty() {
        let session = session();
        assert_eq!(session.pop_string("flash").await.unwrap(), "");

        session.put("flash", &"saved").await.unwrap();
        assert_eq!(session.pop_string("flash").await.unwrap(), "saved");
        assert_eq!(session.pop_string("flash").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_wrong_type_is_an_error() {
        let session = session();
        session.put("stay", &"not a stay").await.unwrap();

        let result: Result<Option<Stay>> = session.get_as("stay").await;
        assert!(matches!(result, Err(Error::Session(_))));
    }

    #[tokio::test]
    async fn test_remove_key() {
        let session = session();
        session.put("remote_ip", &"127.0.0.1").await.unwrap();
        session.remove_key("remote_ip").await.unwrap();

        let value: Option<String> = session.get_as("remote_ip").await.unwrap();
        assert!(value.is_none());
    }
}
