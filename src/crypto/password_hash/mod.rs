//! Password hashing algorithms are intentionally slow and memory-hard, to make brute-force
//! attacks difficult. This module is the boundary to the underlying primitive: everything
//! above it treats the derivation as a black box that either fills the output buffer or
//! reports a failure.

use crate::error::Result;

pub mod argon2;

/// A password hashing primitive.
///
/// Implementations must be safe to invoke concurrently from multiple worker threads, and
/// must report failures through the returned error rather than by panicking.
pub trait PasswordHash {
    fn hash_password(&self, password: &[u8], salt: &[u8], output: &mut [u8]) -> Result<()>;
}
