//! Data model for checkout blocks: payloads, hashed blocks and the hash itself.

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{macros::format_description, OffsetDateTime};

use crate::error::LedgerError;

/// A book being checked out by a user. Embedded verbatim in a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutEvent {
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub checkout_date: String,
    #[serde(default)]
    pub is_genesis: bool,
}

impl CheckoutEvent {
    pub fn new(
        book_id: impl Into<String>,
        user: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            user: user.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }

    /// Marker payload carried by block 0.
    pub fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }
}

/// Book record handed out by `POST /new`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub isbn: String,
}

impl Book {
    /// Identifier derived from the ISBN and publish date (MD5, lowercase hex).
    pub fn mint_id(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.isbn.as_bytes());
        hasher.update(self.publish_date.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// One link of the chain. Fields are fixed at construction; `hash` covers
/// `(position, timestamp, data, prev_hash)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedBlock {
    /// 0 for genesis, predecessor + 1 otherwise.
    position: u64,
    data: CheckoutEvent,
    /// UTC, RFC 3339 with nine fractional digits.
    timestamp: String,
    /// SHA-256 hex of this block's hash input.
    hash: String,
    /// Hash of the predecessor (empty for genesis).
    prev_hash: String,
}

impl HashedBlock {
    /// Build the successor of `predecessor` stamped with the current time.
    pub fn construct(
        predecessor: &HashedBlock,
        payload: CheckoutEvent,
    ) -> Result<Self, LedgerError> {
        Self::construct_at(predecessor, payload, OffsetDateTime::now_utc())
    }

    /// Build the successor of `predecessor` stamped with `at`.
    pub fn construct_at(
        predecessor: &HashedBlock,
        payload: CheckoutEvent,
        at: OffsetDateTime,
    ) -> Result<Self, LedgerError> {
        Self::seal(
            predecessor.position + 1,
            payload,
            at,
            predecessor.hash.clone(),
        )
    }

    /// First block of a fresh ledger. Has no predecessor to link to.
    pub fn genesis() -> Result<Self, LedgerError> {
        Self::genesis_at(OffsetDateTime::now_utc())
    }

    pub fn genesis_at(at: OffsetDateTime) -> Result<Self, LedgerError> {
        Self::seal(0, CheckoutEvent::genesis(), at, String::new())
    }

    fn seal(
        position: u64,
        data: CheckoutEvent,
        at: OffsetDateTime,
        prev_hash: String,
    ) -> Result<Self, LedgerError> {
        let mut block = Self {
            position,
            data,
            timestamp: format_timestamp(at)?,
            hash: String::new(),
            prev_hash,
        };
        block.hash = block.recompute_hash()?;
        Ok(block)
    }

    /// Hash the block's current fields. Serialization failures are errors,
    /// never an empty segment in the hash input.
    pub fn recompute_hash(&self) -> Result<String, LedgerError> {
        let payload = serde_json::to_vec(&self.data)?;
        Ok(hash_concat(&[
            self.position.to_string().as_bytes(),
            self.timestamp.as_bytes(),
            &payload,
            self.prev_hash.as_bytes(),
        ]))
    }

    /// True iff recomputing the hash yields `claimed`.
    pub fn validate(&self, claimed: &str) -> bool {
        match self.recompute_hash() {
            Ok(h) => h == claimed,
            Err(_) => false,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn data(&self) -> &CheckoutEvent {
        &self.data
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }
}

#[cfg(test)]
impl HashedBlock {
    pub(crate) fn tamper_user(&mut self, user: &str) {
        self.data.user = user.into();
    }

    /// Copy moved to `position`, re-hashed so only ordering is wrong.
    pub(crate) fn with_position(&self, position: u64) -> Self {
        let mut block = self.clone();
        block.position = position;
        block.hash = block.recompute_hash().unwrap();
        block
    }
}

/// Hash inputs (concatenate as bytes, SHA-256) and return lowercase hex.
pub fn hash_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}

/// Fixed-precision UTC RFC 3339, e.g. `2024-01-01T08:30:00.000000000Z`.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, LedgerError> {
    let fmt = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
    );
    Ok(at.to_offset(time::UtcOffset::UTC).format(&fmt)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn checkout() -> CheckoutEvent {
        CheckoutEvent::new("abc", "alice", "2024-01-01")
    }

    #[test]
    fn genesis_is_self_consistent() {
        let g = HashedBlock::genesis().unwrap();
        assert_eq!(g.position(), 0);
        assert!(g.data().is_genesis);
        assert_eq!(g.prev_hash(), "");
        assert!(g.validate(g.hash()));
    }

    #[test]
    fn construct_links_to_predecessor() {
        let g = HashedBlock::genesis().unwrap();
        let b = HashedBlock::construct(&g, checkout()).unwrap();
        assert_eq!(b.position(), 1);
        assert_eq!(b.prev_hash(), g.hash());
        assert_eq!(b.recompute_hash().unwrap(), b.hash());
        assert_eq!(b.hash().len(), 64);
    }

    #[test]
    fn hash_is_deterministic_for_fixed_inputs() {
        let at = datetime!(2024-01-01 12:00:00 UTC);
        let g = HashedBlock::genesis_at(at).unwrap();
        let a = HashedBlock::construct_at(&g, checkout(), at).unwrap();
        let b = HashedBlock::construct_at(&g, checkout(), at).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), a.recompute_hash().unwrap());
    }

    #[test]
    fn timestamp_is_hash_material() {
        let g = HashedBlock::genesis_at(datetime!(2024-01-01 00:00:00 UTC)).unwrap();
        let a = HashedBlock::construct_at(&g, checkout(), datetime!(2024-01-01 10:00:00 UTC))
            .unwrap();
        let b = HashedBlock::construct_at(
            &g,
            checkout(),
            datetime!(2024-01-01 10:00:00.000000001 UTC),
        )
        .unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn tampered_payload_fails_validate() {
        let g = HashedBlock::genesis().unwrap();
        let mut b = HashedBlock::construct(&g, checkout()).unwrap();
        let claimed = b.hash().to_string();
        b.tamper_user("mallory");
        assert!(!b.validate(&claimed));
    }

    #[test]
    fn timestamp_has_fixed_precision() {
        let ts = format_timestamp(datetime!(2024-03-05 07:08:09 UTC)).unwrap();
        assert_eq!(ts, "2024-03-05T07:08:09.000000000Z");

        let shifted = format_timestamp(datetime!(2024-03-05 09:08:09.5 +02:00)).unwrap();
        assert_eq!(shifted, "2024-03-05T07:08:09.500000000Z");
    }

    #[test]
    fn block_json_uses_wire_names() {
        let g = HashedBlock::genesis().unwrap();
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["position"], 0);
        assert_eq!(v["data"]["is_genesis"], true);
        assert_eq!(v["prev_hash"], "");
        assert!(v["hash"].is_string());
        assert!(v["timestamp"].is_string());
    }

    #[test]
    fn book_id_is_md5_of_isbn_and_date() {
        let book = Book {
            isbn: "978".into(),
            publish_date: "2020".into(),
            ..Book::default()
        };
        let id = book.mint_id();
        assert_eq!(id.len(), 32);
        assert_eq!(id, book.mint_id());
        let other = Book {
            isbn: "979".into(),
            ..book.clone()
        };
        assert_ne!(id, other.mint_id());
    }
}
