//! # SYSCOHADA Core
//!
//! Accounting computation engine for SYSCOHADA bookkeeping: general-ledger
//! aggregation and fixed-asset depreciation.
//!
//! ## Features
//!
//! - **General ledger**: per-account ledgers with running balances, rebuilt
//!   from a journal snapshot on every query
//! - **Queries**: single-account lookup, statistics, full-text search, CSV export
//! - **Annotations**: per-entry notes stored in any key-value backend
//! - **Depreciation**: linear and declining-balance dotations, amortization
//!   schedules, monthly postings and their conformity checks
//!
//! Nothing is persisted: journal entries and assets come in, ledgers,
//! schedules and proposed postings come out.
//!
//! ## Quick Start
//!
//! ```rust
//! use syscohada_core::{FixedAsset, JournalEntryGenerator, ConformityValidator, Period};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let asset = FixedAsset::linear(
//!     "a1".to_string(),
//!     "VEH-01".to_string(),
//!     "Véhicule de livraison".to_string(),
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     BigDecimal::from(6_000_000),
//!     5,
//! );
//! let period: Period = "2024-01".parse().unwrap();
//! let posting = JournalEntryGenerator::default()
//!     .generate_posting(&asset, &period, "EX-2024")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(posting.amount, BigDecimal::from(100_000));
//! assert!(ConformityValidator::default().validate(&posting, &asset).valid);
//! ```

pub mod config;
pub mod depreciation;
pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::EngineConfig;
pub use depreciation::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
