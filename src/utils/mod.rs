//! Utility modules

pub mod memory_storage;
pub mod money;
pub mod validation;

pub use memory_storage::*;
pub use money::*;
pub use validation::*;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a global `tracing` subscriber, filtered by `RUST_LOG` and
/// defaulting to `syscohada_core=info`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("syscohada_core=info"));

        // Another subscriber may already be installed by the host application
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
    }
}
