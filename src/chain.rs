//! Rules deciding whether a block may extend another, and whole-chain audits.

use serde::Serialize;
use thiserror::Error;

use crate::model::HashedBlock;

/// Why a candidate was refused as the successor of a block.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("prev_hash does not match the predecessor's hash")]
    Linkage,
    #[error("stored hash does not match the block's fields")]
    Integrity,
    #[error("position is not predecessor + 1")]
    Ordering,
}

/// Check linkage, integrity and ordering, stopping at the first failure.
pub fn check_extension(
    candidate: &HashedBlock,
    predecessor: &HashedBlock,
) -> Result<(), Rejection> {
    if predecessor.hash() != candidate.prev_hash() {
        return Err(Rejection::Linkage);
    }
    if !candidate.validate(candidate.hash()) {
        return Err(Rejection::Integrity);
    }
    if predecessor.position() + 1 != candidate.position() {
        return Err(Rejection::Ordering);
    }
    Ok(())
}

pub fn is_valid_extension(candidate: &HashedBlock, predecessor: &HashedBlock) -> bool {
    check_extension(candidate, predecessor).is_ok()
}

/// A problem found by [`verify_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainFault {
    /// Index in the block list.
    pub index: usize,
    pub reason: String,
}

/// Audit a full block list starting at genesis. Empty result means sound.
pub fn verify_chain(blocks: &[HashedBlock]) -> Vec<ChainFault> {
    let mut faults = vec![];

    let Some(genesis) = blocks.first() else {
        faults.push(ChainFault {
            index: 0,
            reason: "chain has no genesis block".into(),
        });
        return faults;
    };

    if genesis.position() != 0 {
        faults.push(ChainFault {
            index: 0,
            reason: format!("genesis position is {}", genesis.position()),
        });
    }
    if !genesis.prev_hash().is_empty() {
        faults.push(ChainFault {
            index: 0,
            reason: "genesis prev_hash should be empty".into(),
        });
    }
    if !genesis.validate(genesis.hash()) {
        faults.push(ChainFault {
            index: 0,
            reason: Rejection::Integrity.to_string(),
        });
    }

    for (i, pair) in blocks.windows(2).enumerate() {
        if let Err(rejection) = check_extension(&pair[1], &pair[0]) {
            faults.push(ChainFault {
                index: i + 1,
                reason: rejection.to_string(),
            });
        }
    }

    faults
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckoutEvent;
    use time::macros::datetime;

    fn two_blocks() -> (HashedBlock, HashedBlock) {
        let g = HashedBlock::genesis().unwrap();
        let b = HashedBlock::construct(&g, CheckoutEvent::new("abc", "alice", "2024-01-01"))
            .unwrap();
        (g, b)
    }

    #[test]
    fn accepts_proper_successor() {
        let (g, b) = two_blocks();
        assert!(is_valid_extension(&b, &g));
    }

    #[test]
    fn rejects_wrong_predecessor() {
        let (g, b) = two_blocks();
        let c = HashedBlock::construct(&b, CheckoutEvent::new("x", "bob", "2024-01-02")).unwrap();
        // c links to b, not g
        assert_eq!(check_extension(&c, &g), Err(Rejection::Linkage));
    }

    #[test]
    fn rejects_tampered_candidate() {
        let (g, mut b) = two_blocks();
        b.tamper_user("mallory");
        assert_eq!(check_extension(&b, &g), Err(Rejection::Integrity));
    }

    #[test]
    fn rejects_position_gap() {
        let (g, b) = two_blocks();
        let skipped = b.with_position(5);
        assert_eq!(check_extension(&skipped, &g), Err(Rejection::Ordering));
    }

    #[test]
    fn linkage_is_checked_first() {
        let (g, mut b) = two_blocks();
        let other = HashedBlock::genesis_at(datetime!(2000-01-01 00:00:00 UTC)).unwrap();
        assert_ne!(other.hash(), g.hash());
        b.tamper_user("mallory");
        assert_eq!(check_extension(&b, &other), Err(Rejection::Linkage));
    }

    #[test]
    fn verify_chain_reports_broken_link() {
        let (g, b) = two_blocks();
        let c = HashedBlock::construct(&b, CheckoutEvent::new("x", "bob", "2024-01-02")).unwrap();
        assert!(verify_chain(&[g.clone(), b, c.clone()]).is_empty());

        let faults = verify_chain(&[g, c]);
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].index, 1);
    }

    #[test]
    fn verify_chain_rejects_empty_and_non_genesis_start() {
        assert_eq!(verify_chain(&[]).len(), 1);
        let (_, b) = two_blocks();
        let faults = verify_chain(&[b]);
        assert!(faults.iter().any(|f| f.reason.contains("genesis position")));
        assert!(faults.iter().any(|f| f.reason.contains("prev_hash")));
    }
}
