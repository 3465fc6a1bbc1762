//! Core types and data structures for the accounting engine

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::validation::validate_account_code;

/// Debit or credit side of a journal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit side
    Debit,
    /// Credit side
    Credit,
}

/// One line of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Chart-of-accounts code (e.g. "6812")
    pub account_code: String,
    /// Account name as recorded on the line
    pub account_name: String,
    /// Debit amount (zero for credit lines)
    pub debit: BigDecimal,
    /// Credit amount (zero for debit lines)
    pub credit: BigDecimal,
    /// Optional line-level label
    pub label: Option<String>,
    /// Optional third-party (customer, supplier) name
    pub third_party: Option<String>,
}

impl JournalLine {
    /// Create a new line with explicit debit and credit amounts
    pub fn new(
        account_code: String,
        account_name: String,
        debit: BigDecimal,
        credit: BigDecimal,
    ) -> Self {
        Self {
            account_code,
            account_name,
            debit,
            credit,
            label: None,
            third_party: None,
        }
    }

    /// Create a debit line
    pub fn debit(account_code: String, account_name: String, amount: BigDecimal) -> Self {
        Self::new(account_code, account_name, amount, BigDecimal::from(0))
    }

    /// Create a credit line
    pub fn credit(account_code: String, account_name: String, amount: BigDecimal) -> Self {
        Self::new(account_code, account_name, BigDecimal::from(0), amount)
    }

    /// Attach a line-level label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach a third-party name
    pub fn with_third_party(mut self, third_party: impl Into<String>) -> Self {
        self.third_party = Some(third_party.into());
        self
    }

    /// Side this line sits on. A line with a zero debit is a credit line.
    pub fn entry_type(&self) -> EntryType {
        if self.debit > BigDecimal::from(0) {
            EntryType::Debit
        } else {
            EntryType::Credit
        }
    }

    /// Net effect of the line on its account (debit - credit)
    pub fn net(&self) -> BigDecimal {
        &self.debit - &self.credit
    }
}

/// A journal entry as read from the external journal store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier for the entry
    pub id: String,
    /// Accounting date
    pub date: NaiveDate,
    /// Piece reference (invoice number, voucher number, ...)
    pub reference: String,
    /// Entry label
    pub label: String,
    /// Journal code (e.g. "AC", "VT", "OD")
    pub journal_code: String,
    /// Ordered lines of the entry
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Create a new entry with no lines
    pub fn new(
        id: String,
        date: NaiveDate,
        reference: String,
        label: String,
        journal_code: String,
    ) -> Self {
        Self {
            id,
            date,
            reference,
            label,
            journal_code,
            lines: Vec::new(),
        }
    }

    /// Add a line to the entry
    pub fn add_line(&mut self, line: JournalLine) {
        self.lines.push(line);
    }

    /// Calculate total debits
    pub fn total_debit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Calculate total credits
    pub fn total_credit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Check if the entry is balanced (debits = credits)
    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Validate the double-entry invariants of the entry
    pub fn validate(&self) -> LedgerResult<()> {
        if self.lines.len() < 2 {
            return Err(LedgerError::InvalidEntry(format!(
                "Entry '{}' must have at least two lines for double-entry bookkeeping",
                self.id
            )));
        }

        let zero = BigDecimal::from(0);
        for line in &self.lines {
            validate_account_code(&line.account_code)?;

            if line.debit < zero || line.credit < zero {
                return Err(LedgerError::InvalidEntry(format!(
                    "Entry '{}' has a negative amount on account {}",
                    self.id, line.account_code
                )));
            }

            if line.debit > zero && line.credit > zero {
                return Err(LedgerError::InvalidEntry(format!(
                    "Entry '{}' has a line on account {} carrying both a debit and a credit",
                    self.id, line.account_code
                )));
            }
        }

        if !self.is_balanced() {
            return Err(LedgerError::InvalidEntry(format!(
                "Entry '{}' is not balanced: debits = {}, credits = {}",
                self.id,
                self.total_debit(),
                self.total_credit()
            )));
        }

        Ok(())
    }
}

/// Builder for journal entries
#[derive(Debug)]
pub struct JournalEntryBuilder {
    entry: JournalEntry,
}

impl JournalEntryBuilder {
    /// Create a new builder
    pub fn new(id: String, date: NaiveDate, label: String) -> Self {
        Self {
            entry: JournalEntry::new(id, date, String::new(), label, String::new()),
        }
    }

    /// Set the piece reference
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.entry.reference = reference.into();
        self
    }

    /// Set the journal code
    pub fn journal(mut self, journal_code: impl Into<String>) -> Self {
        self.entry.journal_code = journal_code.into();
        self
    }

    /// Add a debit line
    pub fn debit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry.add_line(JournalLine::debit(
            account_code.into(),
            account_name.into(),
            amount,
        ));
        self
    }

    /// Add a credit line
    pub fn credit(
        mut self,
        account_code: impl Into<String>,
        account_name: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry.add_line(JournalLine::credit(
            account_code.into(),
            account_name.into(),
            amount,
        ));
        self
    }

    /// Add a fully specified line
    pub fn line(mut self, line: JournalLine) -> Self {
        self.entry.add_line(line);
        self
    }

    /// Build the entry, checking the double-entry invariants
    pub fn build(self) -> LedgerResult<JournalEntry> {
        self.entry.validate()?;
        Ok(self.entry)
    }
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Create a period for the given year and month (1-12)
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        let invalid = || LedgerError::InvalidInput(format!("invalid period {year:04}-{month:02}"));

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = (28..=31)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// Period containing the given date
    pub fn containing(date: NaiveDate) -> LedgerResult<Self> {
        Self::new(date.year(), date.month())
    }

    /// Calendar year
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Month number (1-12)
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.end
    }

    /// True when `date` falls within the month
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || LedgerError::InvalidInput(format!("malformed period '{s}', expected YYYY-MM"));

        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(malformed());
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Filter applied to a journal snapshot before aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
    /// Restrict to one journal
    pub journal_code: Option<String>,
    /// Inclusive lower account code bound (lexicographic)
    pub account_from: Option<String>,
    /// Inclusive upper account code bound (lexicographic)
    pub account_to: Option<String>,
}

impl LedgerFilter {
    /// Filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter covering one calendar month
    pub fn for_period(period: &Period) -> Self {
        Self::new().dates(Some(period.first_day()), Some(period.last_day()))
    }

    /// Set the inclusive date bounds
    pub fn dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Restrict to one journal
    pub fn journal(mut self, journal_code: impl Into<String>) -> Self {
        self.journal_code = Some(journal_code.into());
        self
    }

    /// Set the inclusive account code bounds
    pub fn accounts(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.account_from = from;
        self.account_to = to;
        self
    }

    /// Date and journal part of the filter
    pub fn matches_entry(&self, entry: &JournalEntry) -> bool {
        if let Some(from) = self.date_from {
            if entry.date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if entry.date > to {
                return false;
            }
        }
        self.journal_code
            .as_deref()
            .is_none_or(|code| entry.journal_code == code)
    }

    /// Account range part of the filter
    pub fn matches_account(&self, account_code: &str) -> bool {
        self.account_from
            .as_deref()
            .is_none_or(|from| account_code >= from)
            && self
                .account_to
                .as_deref()
                .is_none_or(|to| account_code <= to)
    }

    /// True when either account bound is set
    pub fn has_account_range(&self) -> bool {
        self.account_from.is_some() || self.account_to.is_some()
    }
}

/// One line of an account ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Id of the journal entry this line comes from
    pub entry_id: String,
    pub date: NaiveDate,
    /// Piece reference of the journal entry
    pub piece: String,
    /// Line label, falling back to the entry label
    pub label: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Running balance after this line
    pub balance: BigDecimal,
    pub journal_code: String,
    pub third_party: Option<String>,
}

impl LedgerEntry {
    pub(crate) fn from_line(entry: &JournalEntry, line: &JournalLine, balance: BigDecimal) -> Self {
        Self {
            entry_id: entry.id.clone(),
            date: entry.date,
            piece: entry.reference.clone(),
            label: line.label.clone().unwrap_or_else(|| entry.label.clone()),
            debit: line.debit.clone(),
            credit: line.credit.clone(),
            balance,
            journal_code: entry.journal_code.clone(),
            third_party: line.third_party.clone(),
        }
    }
}

/// Per-account view of the journal with running balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLedger {
    pub account_code: String,
    pub label: String,
    /// Always zero: no prior-period carry-forward
    pub opening_balance: BigDecimal,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// total_debit - total_credit
    pub closing_balance: BigDecimal,
    pub entries: Vec<LedgerEntry>,
}

impl AccountLedger {
    /// Ledger with zeroed financial fields and no entries
    pub fn empty(account_code: String, label: String) -> Self {
        Self {
            account_code,
            label,
            opening_balance: BigDecimal::from(0),
            total_debit: BigDecimal::from(0),
            total_credit: BigDecimal::from(0),
            closing_balance: BigDecimal::from(0),
            entries: Vec::new(),
        }
    }

    /// Balance after the last entry, or the opening balance when empty
    pub fn final_running_balance(&self) -> BigDecimal {
        self.entries
            .last()
            .map(|e| e.balance.clone())
            .unwrap_or_else(|| self.opening_balance.clone())
    }
}

/// Identity of the user performing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub user_name: String,
}

impl Actor {
    /// Create an actor from its id and display name
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

/// Errors that can occur in the accounting engine
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type LedgerResult<T> = Result<T, LedgerError>;
