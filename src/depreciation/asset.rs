//! Fixed assets as read from the external asset registry

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::*;
use crate::utils::validation::*;

/// Depreciation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepreciationMethod {
    /// Straight-line: equal annual dotations over the useful life
    Linear,
    /// Declining balance: a fixed rate applied to the net book value
    Declining,
}

impl fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepreciationMethod::Linear => f.write_str("linear"),
            DepreciationMethod::Declining => f.write_str("declining"),
        }
    }
}

impl FromStr for DepreciationMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "lineaire" | "linéaire" => Ok(DepreciationMethod::Linear),
            "declining" | "degressif" | "dégressif" => Ok(DepreciationMethod::Declining),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown depreciation method '{other}'"
            ))),
        }
    }
}

/// A depreciable fixed asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAsset {
    pub id: String,
    pub code: String,
    pub label: String,
    /// Depreciation expense account (class 681)
    pub expense_account: String,
    /// Accumulated depreciation account (class 28)
    pub accumulated_depreciation_account: String,
    /// Balance-sheet account of the asset (class 2)
    pub asset_account: String,
    pub acquisition_date: NaiveDate,
    pub acquisition_value: BigDecimal,
    pub useful_life_years: u32,
    /// Annual rate in percent, used by the declining method
    pub depreciation_rate: BigDecimal,
    pub method: DepreciationMethod,
    pub residual_value: BigDecimal,
    /// Depreciation already recorded to date
    pub accumulated_depreciation: BigDecimal,
}

impl FixedAsset {
    /// Create a straight-line asset with no residual value and no prior
    /// depreciation. Accounts default to office equipment (2444/28444/6813).
    pub fn linear(
        id: String,
        code: String,
        label: String,
        acquisition_date: NaiveDate,
        acquisition_value: BigDecimal,
        useful_life_years: u32,
    ) -> Self {
        Self {
            id,
            code,
            label,
            expense_account: "6813".to_string(),
            accumulated_depreciation_account: "28444".to_string(),
            asset_account: "2444".to_string(),
            acquisition_date,
            acquisition_value,
            useful_life_years,
            depreciation_rate: BigDecimal::from(0),
            method: DepreciationMethod::Linear,
            residual_value: BigDecimal::from(0),
            accumulated_depreciation: BigDecimal::from(0),
        }
    }

    /// Switch to the declining method with the given annual rate (percent)
    pub fn declining(mut self, rate_percent: BigDecimal) -> Self {
        self.method = DepreciationMethod::Declining;
        self.depreciation_rate = rate_percent;
        self
    }

    /// Set the expense, accumulated depreciation and asset accounts
    pub fn with_accounts(
        mut self,
        expense_account: impl Into<String>,
        accumulated_depreciation_account: impl Into<String>,
        asset_account: impl Into<String>,
    ) -> Self {
        self.expense_account = expense_account.into();
        self.accumulated_depreciation_account = accumulated_depreciation_account.into();
        self.asset_account = asset_account.into();
        self
    }

    /// Set the value expected at the end of the useful life
    pub fn with_residual_value(mut self, residual_value: BigDecimal) -> Self {
        self.residual_value = residual_value;
        self
    }

    /// Set the depreciation already recorded
    pub fn with_accumulated_depreciation(mut self, accumulated: BigDecimal) -> Self {
        self.accumulated_depreciation = accumulated;
        self
    }

    /// Acquisition value minus residual value
    pub fn depreciable_base(&self) -> BigDecimal {
        &self.acquisition_value - &self.residual_value
    }

    /// Acquisition value minus depreciation recorded to date
    pub fn net_book_value(&self) -> BigDecimal {
        &self.acquisition_value - &self.accumulated_depreciation
    }

    /// True once the net book value is within `tolerance` of the residual value
    pub fn is_fully_depreciated(&self, tolerance: &BigDecimal) -> bool {
        self.net_book_value() - &self.residual_value <= *tolerance
    }

    /// True when the asset was acquired on or before the last day of `period`
    pub fn is_in_service(&self, period: &Period) -> bool {
        self.acquisition_date <= period.last_day()
    }

    /// Check the numeric preconditions of the depreciation formulas
    pub fn validate(&self) -> LedgerResult<()> {
        let context = |e: LedgerError| match e {
            LedgerError::InvalidInput(msg) => {
                LedgerError::InvalidInput(format!("asset {}: {msg}", self.code))
            }
            other => other,
        };

        validate_positive_amount("acquisition value", &self.acquisition_value).map_err(context)?;
        validate_non_negative_amount("residual value", &self.residual_value).map_err(context)?;
        validate_non_negative_amount("accumulated depreciation", &self.accumulated_depreciation)
            .map_err(context)?;
        validate_useful_life(self.useful_life_years).map_err(context)?;

        if self.residual_value > self.acquisition_value {
            return Err(context(LedgerError::InvalidInput(format!(
                "residual value {} exceeds acquisition value {}",
                self.residual_value, self.acquisition_value
            ))));
        }

        if self.method == DepreciationMethod::Declining {
            validate_rate_percent(&self.depreciation_rate).map_err(context)?;
        }

        Ok(())
    }
}
