#![doc(test(attr(deny(warnings))))]

//! Wizard Core implements the stepped-wizard engine behind administrative
//! data-entry flows: gated step navigation, dependent-selection cascades,
//! multi-select collections, and a diffable review step.
//!
//! The engine is a state machine with no IO of its own. User interaction and
//! server responses enter through [`core::wizard::WizardController`] methods;
//! network work the host must perform leaves as [`core::effect::Effect`]
//! values. This keeps every ordering guarantee (last-request-wins option
//! loads, probe invalidation, single submit) observable from plain
//! synchronous tests.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Wizard Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
