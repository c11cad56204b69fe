//! Append-only, hash-linked ledger of book checkouts with an HTTP front end.
//!
//! Each [`HashedBlock`] carries a SHA-256 over its position, timestamp,
//! payload and predecessor hash. [`Ledger::append`] only keeps a block that
//! passes [`is_valid_extension`] against the current tail.

pub mod chain;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod report;
pub mod routes;

pub use chain::{check_extension, is_valid_extension, verify_chain, ChainFault, Rejection};
pub use config::{Config, LogFormat};
pub use error::{AppError, LedgerError};
pub use ledger::{AppendOutcome, Ledger, SharedLedger};
pub use model::{hash_concat, Book, CheckoutEvent, HashedBlock};
pub use routes::{create_router, AppState};
