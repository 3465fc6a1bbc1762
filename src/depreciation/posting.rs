//! Monthly depreciation postings

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::depreciation::asset::FixedAsset;
use crate::depreciation::calculator::DepreciationCalculator;
use crate::depreciation::conformity::ConformityReport;
use crate::traits::PostingValidator;
use crate::types::*;

/// A depreciation posting proposed for one asset and one month
///
/// It only becomes a journal entry once the caller submits it to the
/// journal store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPostingEntry {
    /// Last calendar day of the period
    pub date: NaiveDate,
    pub journal_code: String,
    /// `AMORT-{period}-{asset code}`
    pub piece: String,
    pub label: String,
    /// Debit on the expense account, then credit on the accumulated
    /// depreciation account
    pub lines: Vec<JournalLine>,
    pub asset_id: String,
    pub period: Period,
    pub exercise_id: String,
    pub amount: BigDecimal,
}

impl GeneratedPostingEntry {
    /// Sum of the debit lines
    pub fn total_debit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    /// Sum of the credit lines
    pub fn total_credit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Convert into a journal entry for submission to the journal store
    pub fn into_journal_entry(self, id: String) -> LedgerResult<JournalEntry> {
        let entry = JournalEntry {
            id,
            date: self.date,
            reference: self.piece,
            label: self.label,
            journal_code: self.journal_code,
            lines: self.lines,
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// A generated posting together with its conformity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedPosting {
    pub posting: GeneratedPostingEntry,
    pub report: ConformityReport,
}

/// Deterministic piece reference of a depreciation posting
pub fn posting_piece(period: &Period, asset_code: &str) -> String {
    format!("AMORT-{period}-{asset_code}")
}

/// Turns monthly dotations into balanced two-line postings
#[derive(Debug, Clone)]
pub struct JournalEntryGenerator {
    calculator: DepreciationCalculator,
    journal_code: String,
    tolerance: BigDecimal,
}

impl Default for JournalEntryGenerator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl JournalEntryGenerator {
    /// Generator posting to the configured journal
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            calculator: DepreciationCalculator::new(config),
            journal_code: config.depreciation_journal_code.clone(),
            tolerance: config.tolerance.clone(),
        }
    }

    /// Posting of `asset` for `period`, or `None` when nothing is due
    ///
    /// Nothing is due before the acquisition month, once the net book value
    /// has reached the residual value, or when the dotation rounds to zero.
    /// The amount never exceeds what is left above the residual value.
    pub fn generate_posting(
        &self,
        asset: &FixedAsset,
        period: &Period,
        exercise_id: &str,
    ) -> LedgerResult<Option<GeneratedPostingEntry>> {
        if !asset.is_in_service(period) {
            tracing::debug!(asset = %asset.code, %period, "asset not in service yet");
            return Ok(None);
        }

        if asset.is_fully_depreciated(&self.tolerance) {
            tracing::debug!(asset = %asset.code, %period, "asset fully depreciated");
            return Ok(None);
        }

        let monthly = self.calculator.monthly(asset, period)?;
        let remaining = asset.net_book_value() - &asset.residual_value;
        let amount = if monthly > remaining { remaining } else { monthly };
        if amount <= BigDecimal::from(0) {
            tracing::debug!(asset = %asset.code, %period, "dotation rounds to zero");
            return Ok(None);
        }

        let label = format!("Dotation aux amortissements {} - {}", asset.label, period);
        let lines = vec![
            JournalLine::debit(
                asset.expense_account.clone(),
                "Dotations aux amortissements".to_string(),
                amount.clone(),
            )
            .with_label(label.clone()),
            JournalLine::credit(
                asset.accumulated_depreciation_account.clone(),
                format!("Amortissements {}", asset.label),
                amount.clone(),
            )
            .with_label(label.clone()),
        ];

        Ok(Some(GeneratedPostingEntry {
            date: period.last_day(),
            journal_code: self.journal_code.clone(),
            piece: posting_piece(period, &asset.code),
            label,
            lines,
            asset_id: asset.id.clone(),
            period: *period,
            exercise_id: exercise_id.to_string(),
            amount,
        }))
    }

    /// Postings of every asset that has something due for `period`
    ///
    /// Assets are handled independently; an invalid asset fails the batch.
    pub fn generate_batch_for_period(
        &self,
        assets: &[FixedAsset],
        period: &Period,
        exercise_id: &str,
    ) -> LedgerResult<Vec<GeneratedPostingEntry>> {
        let mut postings = Vec::new();
        for asset in assets {
            if let Some(posting) = self.generate_posting(asset, period, exercise_id)? {
                postings.push(posting);
            }
        }

        tracing::info!(
            %period,
            exercise_id,
            assets = assets.len(),
            postings = postings.len(),
            "generated depreciation batch"
        );

        Ok(postings)
    }

    /// Batch generation followed by a conformity check of each posting
    pub fn generate_checked_batch(
        &self,
        assets: &[FixedAsset],
        period: &Period,
        exercise_id: &str,
        validator: &dyn PostingValidator,
    ) -> LedgerResult<Vec<CheckedPosting>> {
        let mut checked = Vec::new();
        for asset in assets {
            if let Some(posting) = self.generate_posting(asset, period, exercise_id)? {
                let report = validator.validate_posting(&posting, asset);
                checked.push(CheckedPosting { posting, report });
            }
        }
        Ok(checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depreciation::conformity::ConformityValidator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn laptop() -> FixedAsset {
        FixedAsset::linear(
            "a-7".to_string(),
            "INF-07".to_string(),
            "Ordinateur portable".to_string(),
            date(2024, 2, 10),
            BigDecimal::from(1_200_000),
            3,
        )
        .with_accounts("6813", "2844", "2441")
    }

    #[test]
    fn test_posting_shape() {
        let period: Period = "2024-02".parse().unwrap();
        let posting = JournalEntryGenerator::default()
            .generate_posting(&laptop(), &period, "EX-2024")
            .unwrap()
            .unwrap();

        assert_eq!(posting.amount, BigDecimal::from(33_333));
        assert_eq!(posting.date, date(2024, 2, 29));
        assert_eq!(posting.piece, "AMORT-2024-02-INF-07");
        assert_eq!(posting.journal_code, "OD");
        assert_eq!(posting.exercise_id, "EX-2024");
        assert_eq!(posting.lines.len(), 2);

        let debit = &posting.lines[0];
        let credit = &posting.lines[1];
        assert_eq!(debit.account_code, "6813");
        assert_eq!(debit.debit, posting.amount);
        assert_eq!(debit.credit, BigDecimal::from(0));
        assert_eq!(credit.account_code, "2844");
        assert_eq!(credit.credit, posting.amount);
        assert_eq!(credit.debit, BigDecimal::from(0));
        assert_eq!(posting.total_debit(), posting.total_credit());
    }

    #[test]
    fn test_no_posting_before_acquisition_month() {
        let result = JournalEntryGenerator::default()
            .generate_posting(&laptop(), &"2024-01".parse().unwrap(), "EX-2024")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_no_posting_once_fully_depreciated() {
        let asset = laptop().with_accumulated_depreciation(BigDecimal::from(1_200_000));
        let result = JournalEntryGenerator::default()
            .generate_posting(&asset, &"2027-01".parse().unwrap(), "EX-2027")
            .unwrap();
        assert!(result.is_none());

        let with_residual = laptop()
            .with_residual_value(BigDecimal::from(200_000))
            .with_accumulated_depreciation(BigDecimal::from(1_000_000));
        let result = JournalEntryGenerator::default()
            .generate_posting(&with_residual, &"2027-01".parse().unwrap(), "EX-2027")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_last_posting_is_capped_at_remaining_value() {
        // 30 556 a month; only 20 000 left above the residual value
        let asset = laptop()
            .with_residual_value(BigDecimal::from(100_000))
            .with_accumulated_depreciation(BigDecimal::from(1_080_000));
        let posting = JournalEntryGenerator::default()
            .generate_posting(&asset, &"2027-01".parse().unwrap(), "EX-2027")
            .unwrap()
            .unwrap();

        assert_eq!(posting.amount, BigDecimal::from(20_000));
        assert_eq!(posting.lines[0].debit, posting.amount);
        assert_eq!(posting.lines[1].credit, posting.amount);
        assert!(ConformityValidator::default().validate(&posting, &asset).valid);
    }

    #[test]
    fn test_batch_skips_assets_with_nothing_due() {
        let assets = vec![
            laptop(),
            FixedAsset::linear(
                "a-8".to_string(),
                "VEH-02".to_string(),
                "Camionnette".to_string(),
                date(2024, 5, 2),
                BigDecimal::from(9_000_000),
                5,
            ),
        ];
        let period: Period = "2024-03".parse().unwrap();
        let postings = JournalEntryGenerator::default()
            .generate_batch_for_period(&assets, &period, "EX-2024")
            .unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].asset_id, "a-7");
    }

    #[test]
    fn test_batch_fails_fast_on_invalid_asset() {
        let mut broken = laptop();
        broken.useful_life_years = 0;
        let result = JournalEntryGenerator::default().generate_batch_for_period(
            &[laptop(), broken],
            &"2024-03".parse().unwrap(),
            "EX-2024",
        );
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_checked_batch_attaches_reports() {
        let checked = JournalEntryGenerator::default()
            .generate_checked_batch(
                &[laptop()],
                &"2024-04".parse().unwrap(),
                "EX-2024",
                &ConformityValidator::default(),
            )
            .unwrap();
        assert_eq!(checked.len(), 1);
        assert!(checked[0].report.valid);
    }

    #[test]
    fn test_into_journal_entry() {
        let posting = JournalEntryGenerator::default()
            .generate_posting(&laptop(), &"2024-03".parse().unwrap(), "EX-2024")
            .unwrap()
            .unwrap();
        let entry = posting.clone().into_journal_entry("je-1".to_string()).unwrap();
        assert_eq!(entry.reference, posting.piece);
        assert_eq!(entry.date, date(2024, 3, 31));
        assert!(entry.is_balanced());
    }
}
