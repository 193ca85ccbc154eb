//! Double SHA-256 as used for Dash content binding and transaction ids.

use sha2::{Digest, Sha256};

/// 256-bit hash output.
pub type Hash256 = [u8; 32];

/// SHA-256 applied twice; the first digest's raw bytes feed the second.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

/// Double SHA-256 as a lower-case hex digest.
pub fn double_sha256_hex(data: &[u8]) -> String {
    hex::encode(double_sha256(data))
}

/// Transaction-id display ordering: double SHA-256 with byte order reversed,
/// lower-case hex.
pub fn txid_hex(raw_tx: &[u8]) -> String {
    let mut digest = double_sha256(raw_tx);
    digest.reverse();
    hex::encode(digest)
}
