#![doc(test(attr(deny(warnings))))]

//! Campaign Pacing keeps advertising campaigns inside their brand's daily and
//! monthly budgets and their dayparting windows. The engine lives in the
//! `pacing-*` crates; this crate wires them into a CLI.

pub mod cli;
pub mod errors;
pub mod utils;

pub use pacing_config as config;
pub use pacing_core as services;
pub use pacing_domain as domain;
pub use pacing_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Default `tracing` directive when neither `RUST_LOG` nor a config file provides one.
pub const DEFAULT_LOG_DIRECTIVE: &str = "campaign_pacing=info,pacing_core=info";

/// Initializes global tracing with the default directive.
pub fn init() {
    init_with_directive(DEFAULT_LOG_DIRECTIVE);
}

/// Initializes global tracing once; later calls are ignored.
pub fn init_with_directive(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("Campaign pacing tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
