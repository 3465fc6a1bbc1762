//! SYSCOHADA conformity checks for depreciation postings

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;
use crate::depreciation::asset::FixedAsset;
use crate::depreciation::posting::GeneratedPostingEntry;
use crate::traits::PostingValidator;
use crate::types::*;
use crate::utils::money::within_tolerance;

/// A rule broken by a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConformityViolation {
    /// Total debit differs from total credit
    UnbalancedEntry,
    /// No single debit line on a depreciation expense account
    MissingOrMisplacedExpenseLine,
    /// No single credit line on an accumulated depreciation account
    MissingOrMisplacedAccumulatedLine,
    /// The posting would take the net book value below the residual value
    ExceedsDepreciableBase,
}

impl ConformityViolation {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConformityViolation::UnbalancedEntry => "UNBALANCED_ENTRY",
            ConformityViolation::MissingOrMisplacedExpenseLine => {
                "MISSING_OR_MISPLACED_EXPENSE_LINE"
            }
            ConformityViolation::MissingOrMisplacedAccumulatedLine => {
                "MISSING_OR_MISPLACED_ACCUMULATED_LINE"
            }
            ConformityViolation::ExceedsDepreciableBase => "EXCEEDS_DEPRECIABLE_BASE",
        }
    }
}

impl fmt::Display for ConformityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a conformity check; lists every violation found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformityReport {
    pub valid: bool,
    pub errors: Vec<ConformityViolation>,
}

impl ConformityReport {
    fn from_errors(errors: Vec<ConformityViolation>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// True when the report lists `violation`
    pub fn has(&self, violation: ConformityViolation) -> bool {
        self.errors.contains(&violation)
    }
}

/// Checks postings against double-entry and chart-of-accounts rules
#[derive(Debug, Clone)]
pub struct ConformityValidator {
    expense_prefix: String,
    accumulated_prefix: String,
    tolerance: BigDecimal,
}

impl Default for ConformityValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ConformityValidator {
    /// Validator using the configured account prefixes and tolerance
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            expense_prefix: config.expense_account_prefix.clone(),
            accumulated_prefix: config.accumulated_account_prefix.clone(),
            tolerance: config.tolerance.clone(),
        }
    }

    /// Check a generated posting
    pub fn validate(&self, posting: &GeneratedPostingEntry, asset: &FixedAsset) -> ConformityReport {
        self.check(&posting.lines, asset, Some(&posting.piece))
    }

    fn check(&self, lines: &[JournalLine], asset: &FixedAsset, piece: Option<&str>) -> ConformityReport {
        let zero = BigDecimal::from(0);
        let mut errors = Vec::new();

        let total_debit: BigDecimal = lines.iter().map(|l| &l.debit).sum();
        let total_credit: BigDecimal = lines.iter().map(|l| &l.credit).sum();
        if !within_tolerance(&total_debit, &total_credit, &self.tolerance) {
            errors.push(ConformityViolation::UnbalancedEntry);
        }

        let expense_lines: Vec<&JournalLine> = lines
            .iter()
            .filter(|l| l.account_code.starts_with(&self.expense_prefix))
            .collect();
        let expense_ok = matches!(
            expense_lines.as_slice(),
            [line] if line.debit > zero && line.credit == zero
        );
        if !expense_ok {
            errors.push(ConformityViolation::MissingOrMisplacedExpenseLine);
        }

        let accumulated_lines: Vec<&JournalLine> = lines
            .iter()
            .filter(|l| l.account_code.starts_with(&self.accumulated_prefix))
            .collect();
        let accumulated_ok = matches!(
            accumulated_lines.as_slice(),
            [line] if line.credit > zero && line.debit == zero
        );
        if !accumulated_ok {
            errors.push(ConformityViolation::MissingOrMisplacedAccumulatedLine);
        }

        // Amount added to accumulated depreciation by this posting
        let posting_amount: BigDecimal = accumulated_lines
            .iter()
            .map(|l| &l.credit - &l.debit)
            .sum();
        let resulting_nbv =
            &asset.acquisition_value - &asset.accumulated_depreciation - &posting_amount;
        if &resulting_nbv + &self.tolerance < asset.residual_value {
            errors.push(ConformityViolation::ExceedsDepreciableBase);
        }

        let report = ConformityReport::from_errors(errors);
        if !report.valid {
            tracing::warn!(
                asset = %asset.code,
                piece = piece.unwrap_or("-"),
                errors = ?report.errors,
                "non-conforming depreciation posting"
            );
        }
        report
    }
}

impl PostingValidator for ConformityValidator {
    fn validate_posting(
        &self,
        posting: &GeneratedPostingEntry,
        asset: &FixedAsset,
    ) -> ConformityReport {
        self.validate(posting, asset)
    }

    fn validate_lines(&self, lines: &[JournalLine], asset: &FixedAsset) -> ConformityReport {
        self.check(lines, asset, None)
    }
}
