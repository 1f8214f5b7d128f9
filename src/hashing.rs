//! Content hashing utility
//!
//! Ported from Kavita.Common/Hashing.cs. Computes a SHA-256 digest rendered
//! as 64 lower-case hex characters with no separators, over either a UTF-8
//! string or a byte stream. Used elsewhere in the system for
//! content-addressing and dedup (cache keys for cover images and archives).

use crate::error::{Result, TankobonError};
use sha2::{Digest, Sha256};
use std::io::Read;

/// Hash a string (UTF-8 encoded) to lower-case hex
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Hash a byte stream to lower-case hex, reading in chunks
pub fn sha256_hex_reader<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| TankobonError::FileIo(format!("Failed to read stream for hashing: {e}")))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
