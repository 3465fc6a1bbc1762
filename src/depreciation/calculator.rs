//! Depreciation arithmetic

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::depreciation::asset::{DepreciationMethod, FixedAsset};
use crate::types::*;
use crate::utils::money::round_amount;
use crate::utils::validation::validate_useful_life;

const DAYS_PER_YEAR: f64 = 365.25;

/// Annual and monthly dotations for a single asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepreciationCalculator {
    rounding_scale: i64,
}

impl Default for DepreciationCalculator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DepreciationCalculator {
    /// Calculator rounding to the configured scale
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            rounding_scale: config.rounding_scale,
        }
    }

    /// Decimal places kept on monthly dotations
    pub fn rounding_scale(&self) -> i64 {
        self.rounding_scale
    }

    /// `(acquisition_value - residual_value) / useful_life_years`
    pub fn linear_annual(
        acquisition_value: &BigDecimal,
        useful_life_years: u32,
        residual_value: &BigDecimal,
    ) -> LedgerResult<BigDecimal> {
        validate_useful_life(useful_life_years)?;
        Ok((acquisition_value - residual_value) / BigDecimal::from(useful_life_years))
    }

    /// `(acquisition_value - accumulated_depreciation) * rate_percent / 100`
    pub fn declining_annual(
        acquisition_value: &BigDecimal,
        rate_percent: &BigDecimal,
        accumulated_depreciation: &BigDecimal,
    ) -> BigDecimal {
        (acquisition_value - accumulated_depreciation) * rate_percent / BigDecimal::from(100)
    }

    /// Unrounded annual dotation of `asset` given the depreciation
    /// accumulated so far
    pub fn annual(
        &self,
        asset: &FixedAsset,
        accumulated_depreciation: &BigDecimal,
    ) -> LedgerResult<BigDecimal> {
        match asset.method {
            DepreciationMethod::Linear => Self::linear_annual(
                &asset.acquisition_value,
                asset.useful_life_years,
                &asset.residual_value,
            ),
            DepreciationMethod::Declining => Ok(Self::declining_annual(
                &asset.acquisition_value,
                &asset.depreciation_rate,
                accumulated_depreciation,
            )),
        }
    }

    /// Dotation of one month, rounded half-up to the configured scale
    ///
    /// The declining method works from the depreciation recorded on the
    /// asset. The years elapsed since acquisition are computed for the log
    /// only; they do not enter the formula.
    pub fn monthly(&self, asset: &FixedAsset, period: &Period) -> LedgerResult<BigDecimal> {
        asset.validate()?;

        let annual = self.annual(asset, &asset.accumulated_depreciation)?;
        let monthly = round_amount(&(annual / BigDecimal::from(12)), self.rounding_scale);

        tracing::trace!(
            asset = %asset.code,
            %period,
            method = %asset.method,
            years_elapsed = Self::years_elapsed(asset.acquisition_date, period.last_day()),
            %monthly,
            "monthly dotation"
        );

        Ok(monthly)
    }

    /// Fractional years between two dates (365.25-day years)
    pub fn years_elapsed(acquisition_date: NaiveDate, period_date: NaiveDate) -> f64 {
        (period_date - acquisition_date).num_days() as f64 / DAYS_PER_YEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn server(value: i64, life: u32) -> FixedAsset {
        FixedAsset::linear(
            "a1".to_string(),
            "SRV-01".to_string(),
            "Serveur".to_string(),
            date(2024, 1, 1),
            BigDecimal::from(value),
            life,
        )
    }

    #[test]
    fn test_linear_annual() {
        let annual = DepreciationCalculator::linear_annual(
            &BigDecimal::from(100_000),
            5,
            &BigDecimal::from(0),
        )
        .unwrap();
        assert_eq!(annual, BigDecimal::from(20_000));

        let with_residual = DepreciationCalculator::linear_annual(
            &BigDecimal::from(100_000),
            5,
            &BigDecimal::from(10_000),
        )
        .unwrap();
        assert_eq!(with_residual, BigDecimal::from(18_000));
    }

    #[test]
    fn test_one_year_life_expenses_everything() {
        let annual = DepreciationCalculator::linear_annual(
            &BigDecimal::from(50_000),
            1,
            &BigDecimal::from(0),
        )
        .unwrap();
        assert_eq!(annual, BigDecimal::from(50_000));
    }

    #[test]
    fn test_zero_useful_life_is_invalid_input() {
        let result =
            DepreciationCalculator::linear_annual(&BigDecimal::from(100), 0, &BigDecimal::from(0));
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));

        let calc = DepreciationCalculator::default();
        let result = calc.monthly(&server(100_000, 0), &"2024-01".parse().unwrap());
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_declining_annual() {
        let annual = DepreciationCalculator::declining_annual(
            &BigDecimal::from(100_000),
            &BigDecimal::from(40),
            &BigDecimal::from(40_000),
        );
        assert_eq!(annual, BigDecimal::from(24_000));
    }

    #[test]
    fn test_monthly_rounding_follows_scale() {
        let asset = server(100_000, 5);
        let period: Period = "2024-06".parse().unwrap();

        let whole = DepreciationCalculator::default().monthly(&asset, &period).unwrap();
        assert_eq!(whole, BigDecimal::from(1667));

        let config = EngineConfig {
            rounding_scale: 2,
            ..EngineConfig::default()
        };
        let cents = DepreciationCalculator::new(&config)
            .monthly(&asset, &period)
            .unwrap();
        assert_eq!(cents, BigDecimal::from_str("1666.67").unwrap());
    }

    #[test]
    fn test_declining_monthly_ignores_elapsed_years() {
        // Pins current behaviour: only the accumulated depreciation moves
        // the declining dotation, not the distance from acquisition.
        let asset = server(120_000, 5)
            .declining(BigDecimal::from(40))
            .with_accumulated_depreciation(BigDecimal::from(48_000));
        let calc = DepreciationCalculator::default();

        let early = calc.monthly(&asset, &"2024-02".parse().unwrap()).unwrap();
        let late = calc.monthly(&asset, &"2027-11".parse().unwrap()).unwrap();
        assert_eq!(early, late);
        assert_eq!(early, BigDecimal::from(2400));
    }

    #[test]
    fn test_years_elapsed() {
        let years = DepreciationCalculator::years_elapsed(date(2020, 1, 1), date(2024, 1, 1));
        assert!((years - 1461.0 / 365.25).abs() < 1e-12);
        assert!((years - 4.0).abs() < 1e-9);
        assert!(DepreciationCalculator::years_elapsed(date(2024, 1, 1), date(2023, 1, 1)) < 0.0);
    }
}
