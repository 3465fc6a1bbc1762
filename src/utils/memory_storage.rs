//! In-memory storage implementations for testing and embedding

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Storage("in-memory store lock poisoned".to_string())
}

/// In-memory journal for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    entries: Arc<RwLock<Vec<JournalEntry>>>,
}

impl MemoryJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal holding the given entries, in order
    pub fn with_entries(entries: Vec<JournalEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Append an entry after checking its double-entry invariants
    pub fn record(&self, entry: JournalEntry) -> LedgerResult<()> {
        entry.validate()?;
        self.entries.write().map_err(poisoned)?.push(entry);
        Ok(())
    }

    /// Number of recorded entries
    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// True when no entry has been recorded
    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

#[async_trait]
impl JournalSource for MemoryJournal {
    async fn fetch_entries(&self, filter: &LedgerFilter) -> LedgerResult<Vec<JournalEntry>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .iter()
            .filter(|entry| filter.matches_entry(entry))
            .cloned()
            .collect())
    }
}

/// In-memory key-value store
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> LedgerResult<Option<String>> {
        Ok(self.values.read().map_err(poisoned)?.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: String) -> LedgerResult<()> {
        self.values
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn entry(id: &str, day: u32, journal: &str) -> JournalEntry {
        JournalEntryBuilder::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            "Test".to_string(),
        )
        .journal(journal)
        .debit("521", "Banque", BigDecimal::from(100))
        .credit("701", "Ventes", BigDecimal::from(100))
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn test_memory_journal_filters_by_journal() {
        let journal = MemoryJournal::new();
        journal.record(entry("e1", 1, "VT")).unwrap();
        journal.record(entry("e2", 2, "BQ")).unwrap();
        assert_eq!(journal.len().unwrap(), 2);

        let fetched = journal
            .fetch_entries(&LedgerFilter::new().journal("BQ"))
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "e2");

        journal.clear().unwrap();
        assert!(journal.is_empty().unwrap());
    }

    #[test]
    fn test_memory_journal_rejects_unbalanced() {
        let journal = MemoryJournal::new();
        let mut bad = entry("e1", 1, "VT");
        bad.lines[1].credit = BigDecimal::from(90);
        assert!(journal.record(bad).is_err());
        assert!(journal.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_journal_reports_storage_error() {
        let journal = MemoryJournal::new();
        let shared = journal.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.entries.write().unwrap();
            panic!("writer died while holding the lock");
        })
        .join();

        assert!(matches!(journal.len(), Err(LedgerError::Storage(_))));
        assert!(matches!(journal.is_empty(), Err(LedgerError::Storage(_))));
        assert!(matches!(
            journal.record(entry("e1", 1, "VT")),
            Err(LedgerError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_key_value_store() {
        let mut store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v1".to_string()).await.unwrap();
        store.set("k", "v2".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }
}
