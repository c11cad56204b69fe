//! Background task that dumps the chain to the log at startup.

use tokio::task::JoinHandle;

use crate::ledger::SharedLedger;
use crate::model::HashedBlock;

/// Spawn the reporter. It works on a snapshot and never touches the ledger
/// again, so it has no ordering with request handling.
pub fn spawn_chain_report(ledger: SharedLedger) -> JoinHandle<usize> {
    tokio::spawn(async move { report_blocks(&ledger.snapshot()) })
}

/// Log every block; returns how many were reported.
pub fn report_blocks(blocks: &[HashedBlock]) -> usize {
    for block in blocks {
        let data = serde_json::to_string_pretty(block.data())
            .unwrap_or_else(|e| format!("<unserializable payload: {e}>"));
        tracing::info!(
            position = block.position(),
            prev_hash = %block.prev_hash(),
            hash = %block.hash(),
            "block\n{data}"
        );
    }
    blocks.len()
}
