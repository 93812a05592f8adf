//! TokenFarm x QBM — Token Staking Ledger (Odra)
//!
//! This crate implements a role-gated staking ledger with oracle valuation.
//! - QBM: home token, mintable only by holders of the Minter role
//! - TokenFarm: allow-listed staking, per-token price feeds, stake valuation
//! - TestToken / MockV3Aggregator: companion contracts for local deployments

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

pub mod registry;
pub mod price_feed;
pub mod valuation;
pub mod tokens;
pub mod farm;
