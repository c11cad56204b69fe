//! The in-memory ledger and the lock-guarded handle shared with handlers.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::chain::{check_extension, Rejection};
use crate::error::LedgerError;
use crate::model::{CheckoutEvent, HashedBlock};

/// Result of offering a block to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AppendOutcome {
    Appended { position: u64 },
    Rejected { reason: Rejection },
}

impl AppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, AppendOutcome::Appended { .. })
    }
}

/// Ordered, append-only block list. Index 0 is always genesis.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<HashedBlock>,
}

impl Ledger {
    /// Ledger holding only a freshly minted genesis block.
    pub fn new() -> Result<Self, LedgerError> {
        Ok(Self {
            blocks: vec![HashedBlock::genesis()?],
        })
    }

    pub fn blocks(&self) -> &[HashedBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: genesis is always present.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tail(&self) -> &HashedBlock {
        // `new` seeds genesis and nothing ever removes a block.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Build a successor of the tail carrying `payload` and offer it.
    pub fn append(&mut self, payload: CheckoutEvent) -> Result<AppendOutcome, LedgerError> {
        let candidate = HashedBlock::construct(self.tail(), payload)?;
        Ok(self.try_extend(candidate))
    }

    /// Push `candidate` iff it is a valid extension of the current tail.
    pub fn try_extend(&mut self, candidate: HashedBlock) -> AppendOutcome {
        match check_extension(&candidate, self.tail()) {
            Ok(()) => {
                let position = candidate.position();
                self.blocks.push(candidate);
                AppendOutcome::Appended { position }
            }
            Err(reason) => AppendOutcome::Rejected { reason },
        }
    }
}

/// Cloneable handle to one ledger. Appends hold the write lock from reading
/// the tail until the push, so no two candidates are built on the same tail.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn append(&self, payload: CheckoutEvent) -> Result<AppendOutcome, LedgerError> {
        self.inner.write().append(payload)
    }

    pub fn try_extend(&self, candidate: HashedBlock) -> AppendOutcome {
        self.inner.write().try_extend(candidate)
    }

    /// Copy of the current block list.
    pub fn snapshot(&self) -> Vec<HashedBlock> {
        self.inner.read().blocks().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn tail(&self) -> HashedBlock {
        self.inner.read().tail().clone()
    }
}
