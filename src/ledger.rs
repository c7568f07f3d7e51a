// Thin re-export module: the state machine lives in `ledger/engine.rs`, with
// state layout, tier codes and shared validation split into siblings.

pub mod engine;
pub mod state;
pub mod tier;
pub mod validation;

pub use engine::*;
pub use state::*;
pub use tier::*;
