//! Amortization schedules over an asset's useful life

use bigdecimal::BigDecimal;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::depreciation::asset::{DepreciationMethod, FixedAsset};
use crate::depreciation::calculator::DepreciationCalculator;
use crate::types::*;
use crate::utils::money::round_amount;

/// One fiscal year of a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationScheduleLine {
    pub fiscal_year: i32,
    /// Amount the year's dotation is computed from
    pub depreciable_base: BigDecimal,
    pub dotation: BigDecimal,
    pub cumulative_depreciation: BigDecimal,
    pub net_book_value: BigDecimal,
}

/// Year-by-year depreciation plan of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub asset_id: String,
    pub method: DepreciationMethod,
    pub lines: Vec<AmortizationScheduleLine>,
}

impl AmortizationSchedule {
    /// Sum of every yearly dotation
    pub fn total_dotation(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.dotation).sum()
    }

    /// NBV after the last line, if any
    pub fn final_net_book_value(&self) -> Option<&BigDecimal> {
        self.lines.last().map(|l| &l.net_book_value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationScheduleGenerator {
    calculator: DepreciationCalculator,
}

impl AmortizationScheduleGenerator {
    /// Generator rounding to the configured scale
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            calculator: DepreciationCalculator::new(config),
        }
    }

    /// Build the schedule from acquisition, ignoring depreciation already
    /// recorded on the asset
    ///
    /// One line per fiscal year starting with the acquisition year, at most
    /// `useful_life_years` lines. Generation stops once the depreciable base
    /// is exhausted. A dotation never exceeds what remains, and the last
    /// year of the useful life takes the remainder so the final NBV equals
    /// the residual value.
    pub fn generate_schedule(&self, asset: &FixedAsset) -> LedgerResult<AmortizationSchedule> {
        asset.validate()?;

        let scale = self.calculator.rounding_scale();
        let zero = BigDecimal::from(0);
        let acquisition_value = round_amount(&asset.acquisition_value, scale);
        let residual_value = round_amount(&asset.residual_value, scale);
        let depreciable_base = &acquisition_value - &residual_value;
        let start_year = asset.acquisition_date.year();

        let mut lines = Vec::new();
        let mut cumulative = BigDecimal::from(0);

        for year_index in 0..asset.useful_life_years {
            let remaining = &depreciable_base - &cumulative;
            if remaining <= zero {
                break;
            }

            let annual = self.calculator.annual(asset, &cumulative)?;
            let is_last_year = year_index + 1 == asset.useful_life_years;
            let mut dotation = round_amount(&annual, scale);
            if is_last_year || dotation > remaining {
                dotation = remaining;
            }

            let year_base = match asset.method {
                DepreciationMethod::Linear => depreciable_base.clone(),
                DepreciationMethod::Declining => &acquisition_value - &cumulative,
            };

            cumulative += &dotation;
            lines.push(AmortizationScheduleLine {
                fiscal_year: start_year + year_index as i32,
                depreciable_base: year_base,
                dotation,
                cumulative_depreciation: cumulative.clone(),
                net_book_value: &acquisition_value - &cumulative,
            });
        }

        tracing::debug!(
            asset = %asset.code,
            years = lines.len(),
            total = %cumulative,
            "generated amortization schedule"
        );

        Ok(AmortizationSchedule {
            asset_id: asset.id.clone(),
            method: asset.method,
            lines,
        })
    }
}
