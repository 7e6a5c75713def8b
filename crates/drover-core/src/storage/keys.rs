//! Key encoding for RocksDB column families.
//!
//! All numeric values use big-endian encoding for correct lexicographic ordering.
//! Composite keys use `:` (0x3A) as separator.
//! Store key names are length-prefixed with a big-endian u16. Members are
//! always the trailing component, so they carry no length prefix.

use crate::error::{StorageError, StorageResult};

const SEPARATOR: u8 = b':';

const SIGN_BIT: u64 = 1 << 63;

/// Encode a variable-length string with a 2-byte big-endian length prefix.
/// Names longer than `u16::MAX` bytes are rejected.
fn encode_string(s: &str) -> StorageResult<Vec<u8>> {
    let len = u16::try_from(s.len()).map_err(|_| {
        StorageError::InvalidKey(format!("key name is {} bytes, max {}", s.len(), u16::MAX))
    })?;
    let mut buf = Vec::with_capacity(2 + s.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(buf)
}

/// Map an f64 to a u64 whose unsigned order matches the float order.
///
/// Positive values get the sign bit set; negative values are bit-inverted so
/// that more negative numbers sort lower. NaN must be rejected by the caller.
pub fn encode_score(score: f64) -> u64 {
    let bits = score.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits | SIGN_BIT
    }
}

/// Inverse of [`encode_score`].
pub fn decode_score(encoded: u64) -> f64 {
    if encoded & SIGN_BIT != 0 {
        f64::from_bits(encoded & !SIGN_BIT)
    } else {
        f64::from_bits(!encoded)
    }
}

/// Build a prefix covering every entry of the store key `key`: `{key}:`
pub fn key_prefix(key: &str) -> StorageResult<Vec<u8>> {
    let mut prefix = encode_string(key)?;
    prefix.push(SEPARATOR);
    Ok(prefix)
}

/// Build a set member key: `{key}:{member}`
///
/// Also used for the member → score index of sorted sets.
pub fn member_key(key: &str, member: &str) -> StorageResult<Vec<u8>> {
    let mut buf = key_prefix(key)?;
    buf.extend_from_slice(member.as_bytes());
    Ok(buf)
}

/// Build a sorted-set score key: `{key}:{score}:{member}`
///
/// Score-first layout enables "scan from lowest score" iteration.
pub fn score_key(key: &str, score: f64, member: &str) -> StorageResult<Vec<u8>> {
    let mut buf = score_prefix(key, score)?;
    buf.extend_from_slice(member.as_bytes());
    Ok(buf)
}

/// Build the seek position for the first entry with score >= `score`.
pub fn score_prefix(key: &str, score: f64) -> StorageResult<Vec<u8>> {
    let mut buf = key_prefix(key)?;
    buf.extend_from_slice(&encode_score(score).to_be_bytes());
    buf.push(SEPARATOR);
    Ok(buf)
}

/// Split a score key back into `(score, member)`, given its store key prefix length.
pub fn parse_score_key(raw: &[u8], prefix_len: usize) -> Option<(f64, &[u8])> {
    let rest = raw.get(prefix_len..)?;
    if rest.len() < 9 || rest[8] != SEPARATOR {
        return None;
    }
    let bytes: [u8; 8] = rest[..8].try_into().ok()?;
    Some((decode_score(u64::from_be_bytes(bytes)), &rest[9..]))
}
