//! Kani harnesses for the swap and collateral arithmetic
//!
//! Run with: cargo kani -p proofs-kani

#![cfg(kani)]

mod amm;
mod lending;
