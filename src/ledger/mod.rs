//! General ledger: aggregation, queries, export and annotations

pub mod annotations;
pub mod builder;
pub mod export;
pub mod query;

pub use annotations::*;
pub use builder::*;
pub use export::*;
pub use query::*;
