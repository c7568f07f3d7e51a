//! Single-writer handle for hosts that reach one ledger from several threads.

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::transaction::{CallEnvelope, Receipt};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle; every call holds the lock for its whole duration, so
/// no caller ever observes a half-applied operation.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self { inner: Arc::new(Mutex::new(ledger)) }
    }

    pub fn apply(&self, envelope: &CallEnvelope) -> Result<bool, LedgerError> {
        self.inner.lock().apply(envelope)
    }

    /// Applies a batch without letting other writers interleave.
    pub fn replay(&self, envelopes: &[CallEnvelope]) -> Vec<Receipt> {
        self.inner.lock().replay(envelopes)
    }

    /// Runs a read-only closure against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }

    /// Copy of the ledger at this instant, e.g. for snapshotting.
    pub fn snapshot(&self) -> Ledger {
        self.inner.lock().clone()
    }
}
