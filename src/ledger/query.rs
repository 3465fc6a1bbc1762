//! Ledger queries: lookups, statistics and full-text search

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::ledger::builder::LedgerBuilder;
use crate::ledger::export::{self, ExportFormat};
use crate::traits::JournalSource;
use crate::types::*;

/// Summary figures of a filtered journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Distinct accounts touched
    pub account_count: usize,
    /// Journal entries (not lines) passing the filter
    pub entry_count: usize,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// total_debit - total_credit
    pub balance: BigDecimal,
    /// Human-readable period, e.g. "Du 01/01/2024 au 31/01/2024"
    pub period: String,
}

/// One matching line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub account_code: String,
    pub account_name: String,
    /// Matched line; `balance` is not meaningful and left at zero
    pub entry: LedgerEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    /// Every matching line, in snapshot order, not deduplicated
    pub hits: Vec<SearchHit>,
    /// Distinct matched accounts, metadata only (zeroed amounts, no entries)
    pub accounts: Vec<AccountLedger>,
    pub elapsed: Duration,
}

/// Statistics over a snapshot
pub fn compute_stats(entries: &[JournalEntry], filter: &LedgerFilter) -> LedgerStats {
    let ledgers = LedgerBuilder::new(entries).build(filter);

    let entry_count = entries
        .iter()
        .filter(|entry| filter.matches_entry(entry))
        .filter(|entry| {
            !filter.has_account_range()
                || entry
                    .lines
                    .iter()
                    .any(|line| filter.matches_account(&line.account_code))
        })
        .count();

    let total_debit: BigDecimal = ledgers.values().map(|l| &l.total_debit).sum();
    let total_credit: BigDecimal = ledgers.values().map(|l| &l.total_credit).sum();
    let balance = &total_debit - &total_credit;

    LedgerStats {
        account_count: ledgers.len(),
        entry_count,
        total_debit,
        total_credit,
        balance,
        period: describe_period(filter.date_from, filter.date_to),
    }
}

/// Formats the date bounds of a filter for display
pub fn describe_period(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    const FMT: &str = "%d/%m/%Y";
    match (from, to) {
        (Some(from), Some(to)) => format!("Du {} au {}", from.format(FMT), to.format(FMT)),
        (Some(from), None) => format!("Depuis le {}", from.format(FMT)),
        (None, Some(to)) => format!("Jusqu'au {}", to.format(FMT)),
        (None, None) => "Toutes périodes".to_string(),
    }
}

/// Case-insensitive substring search over a snapshot
///
/// A line matches when the query occurs in its account code, account name,
/// line label, or in the label or reference of its entry. Lines outside
/// the filter's account range are skipped. A blank query matches nothing.
pub fn search_entries(entries: &[JournalEntry], query: &str, filter: &LedgerFilter) -> SearchResult {
    let started = Instant::now();
    let needle = query.trim().to_lowercase();

    let mut hits = Vec::new();
    let mut accounts: BTreeMap<String, AccountLedger> = BTreeMap::new();

    if !needle.is_empty() {
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        for entry in entries.iter().filter(|entry| filter.matches_entry(entry)) {
            let entry_matches = contains(&entry.label) || contains(&entry.reference);

            for line in &entry.lines {
                if !filter.matches_account(&line.account_code) {
                    continue;
                }
                let line_matches = entry_matches
                    || contains(&line.account_code)
                    || contains(&line.account_name)
                    || line.label.as_deref().is_some_and(contains);
                if !line_matches {
                    continue;
                }

                accounts
                    .entry(line.account_code.clone())
                    .or_insert_with(|| {
                        AccountLedger::empty(line.account_code.clone(), line.account_name.clone())
                    });

                hits.push(SearchHit {
                    account_code: line.account_code.clone(),
                    account_name: line.account_name.clone(),
                    entry: LedgerEntry::from_line(entry, line, BigDecimal::from(0)),
                });
            }
        }
    }

    let elapsed = started.elapsed();
    tracing::debug!(query, hits = hits.len(), ?elapsed, "ledger search");

    SearchResult {
        query: query.to_string(),
        hits,
        accounts: accounts.into_values().collect(),
        elapsed,
    }
}

/// Query facade over an external journal store
///
/// Each call fetches a fresh snapshot; nothing is cached between calls.
pub struct LedgerQueryService<S: JournalSource> {
    source: S,
    config: EngineConfig,
}

impl<S: JournalSource> LedgerQueryService<S> {
    /// Service with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    /// Service with an explicit configuration
    pub fn with_config(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    async fn snapshot(&self, filter: &LedgerFilter) -> LedgerResult<Vec<JournalEntry>> {
        self.source.fetch_entries(filter).await
    }

    /// Full general ledger
    pub async fn get_ledger(
        &self,
        filter: &LedgerFilter,
    ) -> LedgerResult<BTreeMap<String, AccountLedger>> {
        let entries = self.snapshot(filter).await?;
        Ok(LedgerBuilder::new(&entries).build(filter))
    }

    /// Ledger of one account
    pub async fn get_account_ledger(
        &self,
        account_code: &str,
        filter: &LedgerFilter,
    ) -> LedgerResult<AccountLedger> {
        let entries = self.snapshot(filter).await?;
        Ok(LedgerBuilder::new(&entries).build_account(account_code, filter))
    }

    /// Statistics of the filtered journal
    pub async fn get_stats(&self, filter: &LedgerFilter) -> LedgerResult<LedgerStats> {
        let entries = self.snapshot(filter).await?;
        Ok(compute_stats(&entries, filter))
    }

    /// Full-text search over the filtered journal
    pub async fn search(&self, query: &str, filter: &LedgerFilter) -> LedgerResult<SearchResult> {
        let entries = self.snapshot(filter).await?;
        Ok(search_entries(&entries, query, filter))
    }

    /// Serialize the ledger; only CSV is defined
    pub async fn export(&self, format: ExportFormat, filter: &LedgerFilter) -> LedgerResult<String> {
        if format != ExportFormat::Csv {
            return Err(LedgerError::UnsupportedFormat(format.to_string()));
        }
        let delimiter = self.config.csv_delimiter_byte()?;
        let ledgers = self.get_ledger(filter).await?;
        let csv = export::ledger_to_csv(&ledgers, delimiter)?;
        tracing::info!(accounts = ledgers.len(), bytes = csv.len(), "exported ledger to CSV");
        Ok(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryJournal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot() -> Vec<JournalEntry> {
        vec![
            JournalEntryBuilder::new("e1".to_string(), date(2024, 1, 5), "Facture Sonatel".to_string())
                .reference("FA-0042")
                .journal("VT")
                .line(
                    JournalLine::debit("411".to_string(), "Clients".to_string(), BigDecimal::from(1180))
                        .with_third_party("Sonatel"),
                )
                .credit("701", "Ventes de marchandises", BigDecimal::from(1000))
                .credit("443", "Etat, TVA facturée", BigDecimal::from(180))
                .build()
                .unwrap(),
            JournalEntryBuilder::new("e2".to_string(), date(2024, 2, 10), "Encaissement".to_string())
                .reference("RG-0007")
                .journal("BQ")
                .debit("521", "Banque", BigDecimal::from(1180))
                .line(
                    JournalLine::credit("411".to_string(), "Clients".to_string(), BigDecimal::from(1180))
                        .with_label("Règlement FA-0042"),
                )
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn test_stats_over_all_entries() {
        let stats = compute_stats(&snapshot(), &LedgerFilter::new());
        assert_eq!(stats.account_count, 4);
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_debit, BigDecimal::from(2360));
        assert_eq!(stats.total_credit, BigDecimal::from(2360));
        assert_eq!(stats.balance, BigDecimal::from(0));
        assert_eq!(stats.period, "Toutes périodes");
    }

    #[test]
    fn test_stats_with_account_range_and_dates() {
        let filter = LedgerFilter::new()
            .dates(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)))
            .accounts(Some("7".to_string()), None);
        let stats = compute_stats(&snapshot(), &filter);
        assert_eq!(stats.account_count, 1);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.total_credit, BigDecimal::from(1000));
        assert_eq!(stats.balance, BigDecimal::from(-1000));
        assert_eq!(stats.period, "Du 01/01/2024 au 31/01/2024");
    }

    #[test]
    fn test_stats_on_empty_snapshot() {
        let stats = compute_stats(&[], &LedgerFilter::new());
        assert_eq!(stats.account_count, 0);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.balance, BigDecimal::from(0));
    }

    #[test]
    fn test_describe_period_variants() {
        assert_eq!(describe_period(Some(date(2024, 3, 1)), None), "Depuis le 01/03/2024");
        assert_eq!(describe_period(None, Some(date(2024, 3, 31))), "Jusqu'au 31/03/2024");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let result = search_entries(&snapshot(), "fa-0042", &LedgerFilter::new());

        // Entry e1 matches on its reference (3 lines); e2 only on the
        // label of its 411 line.
        assert_eq!(result.hits.len(), 4);
        assert_eq!(result.hits[3].account_code, "411");
        assert_eq!(result.hits[3].entry.entry_id, "e2");

        let codes: Vec<&str> = result.accounts.iter().map(|a| a.account_code.as_str()).collect();
        assert_eq!(codes, vec!["411", "443", "701"]);
        assert!(result
            .accounts
            .iter()
            .all(|a| a.total_debit == BigDecimal::from(0) && a.entries.is_empty()));
    }

    #[test]
    fn test_search_by_account_name_and_blank_query() {
        let result = search_entries(&snapshot(), "BANQUE", &LedgerFilter::new());
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].account_code, "521");

        let blank = search_entries(&snapshot(), "   ", &LedgerFilter::new());
        assert!(blank.hits.is_empty());
        assert!(blank.accounts.is_empty());

        let none = search_entries(&snapshot(), "inexistant", &LedgerFilter::new());
        assert!(none.hits.is_empty());
    }

    #[test]
    fn test_search_respects_filter() {
        let result = search_entries(&snapshot(), "411", &LedgerFilter::new().journal("BQ"));
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].entry.journal_code, "BQ");
    }

    #[test]
    fn test_search_respects_account_range() {
        let filter = LedgerFilter::new().accounts(Some("6".to_string()), Some("7".to_string()));
        let result = search_entries(&snapshot(), "encaissement", &filter);
        assert!(result.hits.is_empty());
        assert!(result.accounts.is_empty());

        let clients_only = LedgerFilter::new().accounts(Some("411".to_string()), Some("411".to_string()));
        let result = search_entries(&snapshot(), "fa-0042", &clients_only);
        let codes: Vec<&str> = result.hits.iter().map(|h| h.account_code.as_str()).collect();
        assert_eq!(codes, vec!["411", "411"]);
        assert_eq!(result.accounts.len(), 1);
    }

    #[tokio::test]
    async fn test_service_reads_fresh_snapshots() {
        let journal = MemoryJournal::with_entries(snapshot());
        let service = LedgerQueryService::new(journal.clone());

        let before = service.get_account_ledger("411", &LedgerFilter::new()).await.unwrap();
        assert_eq!(before.closing_balance, BigDecimal::from(0));

        journal
            .record(
                JournalEntryBuilder::new("e3".to_string(), date(2024, 3, 1), "Avoir".to_string())
                    .debit("701", "Ventes", BigDecimal::from(100))
                    .credit("411", "Clients", BigDecimal::from(100))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let after = service.get_account_ledger("411", &LedgerFilter::new()).await.unwrap();
        assert_eq!(after.closing_balance, BigDecimal::from(-100));
        assert_eq!(after.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_service_rejects_undefined_export_formats() {
        let service = LedgerQueryService::new(MemoryJournal::with_entries(snapshot()));
        for format in [ExportFormat::Excel, ExportFormat::Pdf] {
            let result = service.export(format, &LedgerFilter::new()).await;
            assert!(matches!(result, Err(LedgerError::UnsupportedFormat(_))));
        }
        assert!(service.export(ExportFormat::Csv, &LedgerFilter::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_export_with_non_ascii_delimiter_is_config_error() {
        let config = EngineConfig {
            csv_delimiter: '§',
            ..EngineConfig::default()
        };
        let service = LedgerQueryService::with_config(MemoryJournal::with_entries(snapshot()), config);
        let result = service.export(ExportFormat::Csv, &LedgerFilter::new()).await;
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
