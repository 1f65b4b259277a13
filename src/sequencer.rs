//! Serialized submission of operation sequences
//!
//! Callers on any thread hand a sequence to `submit`; the market lock is held
//! for the whole sequence so no other sequence interleaves with it.

use std::sync::{Mutex, MutexGuard};

use crate::market::{Market, Op, Outcome, SequenceError};

/// Single-writer front door to a shared market
#[derive(Debug)]
pub struct Sequencer {
    market: Mutex<Market>,
}

impl Sequencer {
    pub fn new(market: Market) -> Self {
        Self {
            market: Mutex::new(market),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Market> {
        match self.market.lock() {
            Ok(guard) => guard,
            Err(p) => p.into_inner(),
        }
    }

    /// Run `ops` as one atomic sequence
    pub fn submit(&self, ops: &[Op]) -> Result<Vec<Outcome>, SequenceError> {
        self.lock().execute(ops)
    }

    /// Run `f` with exclusive access to the market
    pub fn with_market<T>(&self, f: impl FnOnce(&mut Market) -> T) -> T {
        f(&mut self.lock())
    }

    /// Copy of the current committed state
    pub fn snapshot(&self) -> Market {
        self.lock().clone()
    }

    pub fn into_inner(self) -> Market {
        match self.market.into_inner() {
            Ok(market) => market,
            Err(p) => p.into_inner(),
        }
    }
}
