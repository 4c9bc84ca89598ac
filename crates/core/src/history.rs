use crate::traits::KeyValueStore;
use crate::StorageError;
use tracing::{debug, warn};

pub const HISTORY_KEY: &str = "searchQueryHistory";

/// Submitted queries, most recent first. Duplicates are kept.
pub struct QueryHistoryStore<S: KeyValueStore> {
    store: S,
    entries: Vec<String>,
}

impl<S: KeyValueStore> QueryHistoryStore<S> {
    pub fn open(store: S) -> Result<Self, StorageError> {
        let entries = match store.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(key = HISTORY_KEY, %error, "stored history is unreadable, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Returns `false` and leaves the history untouched for blank queries.
    pub fn add(&mut self, query: &str) -> Result<bool, StorageError> {
        if query.trim().is_empty() {
            return Ok(false);
        }

        self.entries.insert(0, query.to_string());
        debug!(query, "added query to history");
        self.persist()?;
        Ok(true)
    }

    /// Removes every entry equal to `query` and returns how many went.
    pub fn delete(&mut self, query: &str) -> Result<usize, StorageError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != query);
        let removed = before - self.entries.len();
        self.persist()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.persist()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn history_with(entries: &[&str]) -> QueryHistoryStore<MemoryStore> {
        let mut store = MemoryStore::new();
        let encoded = serde_json::to_string(entries).expect("encode entries");
        store.set(HISTORY_KEY, encoded).expect("memory store accepts writes");
        QueryHistoryStore::open(store).expect("open history")
    }

    #[test]
    fn first_load_is_empty() -> Result<(), StorageError> {
        let history = QueryHistoryStore::open(MemoryStore::new())?;
        assert!(history.is_empty());
        Ok(())
    }

    #[test]
    fn delete_removes_every_match() -> Result<(), StorageError> {
        let mut history = history_with(&["Move", "Movie", "Move", "Movement", "Move"]);
        let removed = history.delete("Move")?;
        assert_eq!(removed, 3);
        assert_eq!(history.entries(), ["Movie", "Movement"]);
        Ok(())
    }

    #[test]
    fn delete_matches_exactly() -> Result<(), StorageError> {
        let mut history = history_with(&["movie", "Movie", "movie "]);
        assert_eq!(history.delete("movie")?, 1);
        assert_eq!(history.entries(), ["Movie", "movie "]);
        Ok(())
    }

    #[test]
    fn every_mutation_rewrites_the_slot() -> Result<(), StorageError> {
        let mut history = QueryHistoryStore::open(MemoryStore::new())?;
        history.add("movie")?;
        history.add("dinosaur")?;
        let store = history.into_store();
        assert_eq!(
            store.get(HISTORY_KEY)?,
            Some(r#"["dinosaur","movie"]"#.to_string())
        );

        let mut history = QueryHistoryStore::open(store)?;
        history.clear()?;
        assert_eq!(history.into_store().get(HISTORY_KEY)?, Some("[]".to_string()));
        Ok(())
    }

    #[test]
    fn unreadable_slot_starts_empty() -> Result<(), StorageError> {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{broken".to_string())?;
        let history = QueryHistoryStore::open(store)?;
        assert!(history.is_empty());
        Ok(())
    }

    #[test]
    fn history_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let origin = "http://localhost:5000";

        let mut history = QueryHistoryStore::open(FileStore::for_origin(dir.path(), origin)?)?;
        history.add("movie")?;
        history.add("research")?;
        drop(history);

        let history = QueryHistoryStore::open(FileStore::for_origin(dir.path(), origin)?)?;
        assert_eq!(history.entries(), ["research", "movie"]);
        Ok(())
    }

    #[test]
    fn truncated_state_file_still_opens() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let origin = "http://localhost:5000";

        let mut history = QueryHistoryStore::open(FileStore::for_origin(dir.path(), origin)?)?;
        history.add("movie")?;
        let path = history.into_store().path().to_path_buf();
        let written = std::fs::read(&path)?;
        std::fs::write(&path, &written[..written.len() / 2])?;

        let mut history = QueryHistoryStore::open(FileStore::for_origin(dir.path(), origin)?)?;
        assert!(history.is_empty());
        history.add("dinosaur")?;

        let history = QueryHistoryStore::open(FileStore::for_origin(dir.path(), origin)?)?;
        assert_eq!(history.entries(), ["dinosaur"]);
        Ok(())
    }

    fn entries_strategy() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]{1,3}", 0..12)
    }

    proptest! {
        #[test]
        fn blank_queries_leave_history_unchanged(
            entries in entries_strategy(),
            blank in "[ \t\n]{0,4}",
        ) {
            let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
            let mut history = history_with(&refs);
            prop_assert!(!history.add(&blank).unwrap());
            prop_assert_eq!(history.entries(), entries.as_slice());
        }

        #[test]
        fn add_prepends_and_keeps_duplicates(
            entries in entries_strategy(),
            query in "[a-c]{1,3}",
        ) {
            let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
            let mut history = history_with(&refs);
            prop_assert!(history.add(&query).unwrap());
            prop_assert_eq!(history.len(), entries.len() + 1);
            prop_assert_eq!(history.get(0), Some(query.as_str()));
            prop_assert_eq!(&history.entries()[1..], entries.as_slice());
        }

        #[test]
        fn delete_drops_all_copies_and_keeps_order(
            entries in entries_strategy(),
            query in "[a-c]{1,3}",
        ) {
            let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
            let mut history = history_with(&refs);
            let copies = entries.iter().filter(|entry| **entry == query).count();

            let removed = history.delete(&query).unwrap();
            let expected: Vec<String> =
                entries.iter().filter(|entry| **entry != query).cloned().collect();

            prop_assert_eq!(removed, copies);
            prop_assert_eq!(history.entries(), expected.as_slice());
        }

        #[test]
        fn clear_always_empties(entries in entries_strategy()) {
            let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
            let mut history = history_with(&refs);
            history.clear().unwrap();
            prop_assert!(history.is_empty());
        }
    }
}
