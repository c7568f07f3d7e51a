//! LoyaltyChain - A deterministic loyalty-point ledger with tiered staking
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`ledger`] - State machine, state layout, tiers and validation
//! - [`params`] - Supply ceiling, tier minimums and lockup period
//! - [`transaction`] - Calls as data, dispatch and replay
//!
//! ## Identity
//! - [`account`] - Opaque caller identities and the burn address
//!
//! ## State Handling
//! - [`snapshot`] - Versioned, root-checked state snapshots
//! - [`shared`] - Single-writer handle for multi-threaded hosts
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod ledger;
pub mod params;
pub mod transaction;

// ============================================================================
// Identity
// ============================================================================
pub mod account;

// ============================================================================
// State Handling
// ============================================================================
pub mod shared;
pub mod snapshot;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
