//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::depreciation::{ConformityReport, FixedAsset, GeneratedPostingEntry};
use crate::types::*;

/// Read side of the external journal store
///
/// The engine never writes journal entries. Implementations may return a
/// superset of the entries matching `filter`; the engine re-applies it.
#[async_trait]
pub trait JournalSource: Send + Sync {
    /// Fetch a snapshot of the entries matching a filter
    async fn fetch_entries(&self, filter: &LedgerFilter) -> LedgerResult<Vec<JournalEntry>>;
}

/// Minimal key-value store used for entry annotations
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value stored under a key
    async fn get(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Store a raw value under a key, replacing any previous value
    async fn set(&mut self, key: &str, value: String) -> LedgerResult<()>;
}

/// Trait for checking depreciation postings before they are submitted
pub trait PostingValidator: Send + Sync {
    /// Run every check and collect the violations
    fn validate_posting(
        &self,
        posting: &GeneratedPostingEntry,
        asset: &FixedAsset,
    ) -> ConformityReport;

    /// Same checks for hand-entered lines
    fn validate_lines(&self, lines: &[JournalLine], asset: &FixedAsset) -> ConformityReport;
}
