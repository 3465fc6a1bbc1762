//! Fixed-asset depreciation: calculation, schedules, postings and checks

pub mod asset;
pub mod calculator;
pub mod conformity;
pub mod posting;
pub mod schedule;

pub use asset::*;
pub use calculator::*;
pub use conformity::*;
pub use posting::*;
pub use schedule::*;
