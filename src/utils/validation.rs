//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(field: &str, amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::InvalidInput(format!(
            "{field} must be positive, got {amount}"
        )))
    } else {
        Ok(())
    }
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(field: &str, amount: &BigDecimal) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::InvalidInput(format!(
            "{field} cannot be negative, got {amount}"
        )))
    } else {
        Ok(())
    }
}

/// Validate a useful life expressed in years
pub fn validate_useful_life(years: u32) -> LedgerResult<()> {
    if years == 0 {
        return Err(LedgerError::InvalidInput(
            "useful life must be at least one year".to_string(),
        ));
    }
    Ok(())
}

/// Validate a declining-balance rate, in percent
pub fn validate_rate_percent(rate: &BigDecimal) -> LedgerResult<()> {
    if *rate <= BigDecimal::from(0) || *rate > BigDecimal::from(100) {
        return Err(LedgerError::InvalidInput(format!(
            "depreciation rate must be in (0, 100], got {rate}"
        )));
    }
    Ok(())
}

/// Validate a chart-of-accounts code
pub fn validate_account_code(account_code: &str) -> LedgerResult<()> {
    if account_code.trim().is_empty() {
        return Err(LedgerError::InvalidInput(
            "account code cannot be empty".to_string(),
        ));
    }

    if account_code.len() > 20 {
        return Err(LedgerError::InvalidInput(format!(
            "account code '{account_code}' cannot exceed 20 characters"
        )));
    }

    // Auxiliary accounts may carry letters (e.g. "401ACME")
    if !account_code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LedgerError::InvalidInput(format!(
            "account code '{account_code}' can only contain ASCII letters and digits"
        )));
    }

    Ok(())
}

/// Validate the text of an annotation
pub fn validate_annotation_content(content: &str) -> LedgerResult<()> {
    if content.trim().is_empty() {
        return Err(LedgerError::InvalidInput(
            "annotation content cannot be empty".to_string(),
        ));
    }

    if content.len() > 2000 {
        return Err(LedgerError::InvalidInput(
            "annotation content cannot exceed 2000 characters".to_string(),
        ));
    }

    Ok(())
}
