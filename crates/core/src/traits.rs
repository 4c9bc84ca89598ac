use crate::{ClientError, DictationError, Query, RemoteHistoryEntry, SearchResult, StorageError};
use async_trait::async_trait;

#[async_trait]
pub trait SuggestionClient {
    async fn suggestions(&self, text: &str) -> Result<Vec<String>, ClientError>;
}

#[async_trait]
pub trait SearchClient {
    /// Results in backend order; callers must not re-rank them.
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, ClientError>;

    async fn stemmed_words(&self) -> Result<Vec<String>, ClientError>;

    /// Backend-side query log, most recent first.
    async fn recent_queries(&self) -> Result<Vec<RemoteHistoryEntry>, ClientError>;
}

/// Durable string slots addressed by fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

pub trait SpeechRecognizer {
    fn start(&mut self) -> Result<(), DictationError>;

    fn stop(&mut self) -> Result<(), DictationError>;
}
