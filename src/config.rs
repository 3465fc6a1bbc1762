//! Engine configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::{LedgerError, LedgerResult};
use crate::utils::money::default_tolerance;

/// Tunable constants of the ledger and depreciation engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places kept on computed dotations (0 for XOF/XAF)
    pub rounding_scale: i64,
    /// Accepted gap when comparing monetary totals
    pub tolerance: BigDecimal,
    /// SYSCOHADA class prefix of depreciation expense accounts
    pub expense_account_prefix: String,
    /// SYSCOHADA class prefix of accumulated depreciation accounts
    pub accumulated_account_prefix: String,
    /// Journal receiving generated depreciation postings
    pub depreciation_journal_code: String,
    /// Field separator of CSV exports
    pub csv_delimiter: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounding_scale: 0,
            tolerance: default_tolerance(),
            expense_account_prefix: "681".into(),
            accumulated_account_prefix: "28".into(),
            depreciation_journal_code: "OD".into(),
            csv_delimiter: ';',
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Check every field, reporting the first problem as `LedgerError::Config`
    pub fn validate(&self) -> LedgerResult<()> {
        if !(0..=6).contains(&self.rounding_scale) {
            return Err(LedgerError::Config(format!(
                "rounding_scale must be between 0 and 6, got {}",
                self.rounding_scale
            )));
        }

        if self.tolerance < BigDecimal::from(0) {
            return Err(LedgerError::Config(
                "tolerance cannot be negative".to_string(),
            ));
        }

        for (name, value) in [
            ("expense_account_prefix", &self.expense_account_prefix),
            ("accumulated_account_prefix", &self.accumulated_account_prefix),
            ("depreciation_journal_code", &self.depreciation_journal_code),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::Config(format!("{name} cannot be empty")));
            }
        }

        self.csv_delimiter_byte()?;

        Ok(())
    }

    /// Delimiter as the byte expected by the csv writer
    pub(crate) fn csv_delimiter_byte(&self) -> LedgerResult<u8> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && *byte != b'"')
            .ok_or_else(|| {
                LedgerError::Config(format!(
                    "csv_delimiter must be a single ASCII character other than a quote, got {:?}",
                    self.csv_delimiter
                ))
            })
    }
}
