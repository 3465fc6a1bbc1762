//! General-ledger aggregation
//!
//! The ledger is a view over a journal snapshot: it is rebuilt on every call
//! and never updated in place. Lines are referenced by index into the
//! snapshot until the final ledger is materialized.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::types::*;

/// Position of a line inside the snapshot
#[derive(Debug, Clone, Copy)]
struct LineRef {
    entry: usize,
    line: usize,
}

/// Ordering key of the line an account label is taken from
type LabelKey<'a> = (NaiveDate, &'a str, usize);

#[derive(Default)]
struct Bucket<'a> {
    label: Option<(LabelKey<'a>, &'a str)>,
    total_debit: BigDecimal,
    total_credit: BigDecimal,
    lines: Vec<LineRef>,
}

impl<'a> Bucket<'a> {
    fn absorb(&mut self, at: LineRef, entry: &'a JournalEntry, line: &'a JournalLine) {
        self.total_debit += &line.debit;
        self.total_credit += &line.credit;
        self.lines.push(at);

        // Earliest (date, entry id, position) wins so the label does not
        // depend on snapshot order.
        if !line.account_name.trim().is_empty() {
            let key = (entry.date, entry.id.as_str(), at.line);
            if self.label.as_ref().is_none_or(|(best, _)| key < *best) {
                self.label = Some((key, line.account_name.as_str()));
            }
        }
    }
}

/// Builds per-account ledgers from a journal snapshot
#[derive(Debug, Clone, Copy)]
pub struct LedgerBuilder<'a> {
    entries: &'a [JournalEntry],
}

impl<'a> LedgerBuilder<'a> {
    /// Builder over a journal snapshot
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self { entries }
    }

    /// Aggregate every account touched by the filtered entries
    ///
    /// The account range of the filter applies to the aggregated accounts,
    /// not to individual lines. Accounts are keyed and ordered by code.
    pub fn build(&self, filter: &LedgerFilter) -> BTreeMap<String, AccountLedger> {
        let mut buckets: BTreeMap<&'a str, Bucket<'a>> = BTreeMap::new();

        for (entry_idx, entry) in self.filtered(filter) {
            for (line_idx, line) in entry.lines.iter().enumerate() {
                buckets
                    .entry(line.account_code.as_str())
                    .or_default()
                    .absorb(
                        LineRef {
                            entry: entry_idx,
                            line: line_idx,
                        },
                        entry,
                        line,
                    );
            }
        }

        let ledgers: BTreeMap<String, AccountLedger> = buckets
            .into_iter()
            .filter(|(code, _)| filter.matches_account(code))
            .map(|(code, bucket)| (code.to_string(), self.materialize(code, bucket)))
            .collect();

        tracing::debug!(
            snapshot = self.entries.len(),
            accounts = ledgers.len(),
            "built general ledger"
        );

        ledgers
    }

    /// Ledger of a single account, scanning only its lines
    ///
    /// Returns an empty ledger when no filtered line touches the account.
    pub fn build_account(&self, account_code: &str, filter: &LedgerFilter) -> AccountLedger {
        let mut bucket = Bucket::default();

        for (entry_idx, entry) in self.filtered(filter) {
            for (line_idx, line) in entry.lines.iter().enumerate() {
                if line.account_code == account_code {
                    bucket.absorb(
                        LineRef {
                            entry: entry_idx,
                            line: line_idx,
                        },
                        entry,
                        line,
                    );
                }
            }
        }

        self.materialize(account_code, bucket)
    }

    fn filtered<'f>(
        &self,
        filter: &'f LedgerFilter,
    ) -> impl Iterator<Item = (usize, &'a JournalEntry)> + 'f
    where
        'a: 'f,
    {
        let entries: &'a [JournalEntry] = self.entries;
        entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| filter.matches_entry(entry))
    }

    fn materialize(&self, account_code: &str, bucket: Bucket<'a>) -> AccountLedger {
        let Bucket {
            label,
            total_debit,
            total_credit,
            mut lines,
        } = bucket;

        // Stable: lines of the same day keep their snapshot order
        lines.sort_by_key(|at| self.entries[at.entry].date);

        let mut running = BigDecimal::from(0);
        let entries = lines
            .iter()
            .map(|at| {
                let entry = &self.entries[at.entry];
                let line = &entry.lines[at.line];
                running += &line.debit;
                running -= &line.credit;
                LedgerEntry::from_line(entry, line, running.clone())
            })
            .collect();

        let closing_balance = &total_debit - &total_credit;

        AccountLedger {
            account_code: account_code.to_string(),
            label: label.map(|(_, name)| name.to_string()).unwrap_or_default(),
            opening_balance: BigDecimal::from(0),
            total_debit,
            total_credit,
            closing_balance,
            entries,
        }
    }
}
