//! Generation of random salts.

use std::fmt::Debug;

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use derive_more::{Deref, From};
use rand::{CryptoRng, RngCore, rngs::OsRng};
use tracing::instrument;

use crate::error::Result;

/// Salts shorter than this are rejected by [`crate::params::validate`].
pub const MIN_SALT_LENGTH_IN_BYTES: usize = 8;
pub const DEFAULT_SALT_LENGTH_IN_BYTES: usize = 16;

/// A salt, generated fresh for every hashed secret.
#[derive(Clone, Default, PartialEq, Eq, Deref, From)]
pub struct Salt(pub Vec<u8>);

impl From<&[u8]> for Salt {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Salt {
    fn from(value: &[u8; N]) -> Self {
        Self(value.to_vec())
    }
}

impl Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({})", STANDARD_NO_PAD.encode(&self.0))
    }
}

pub fn generate_salt_blocking(length: usize, mut csprng: impl CryptoRng + RngCore) -> Result<Salt> {
    let mut bytes = vec![0_u8; length];

    csprng.try_fill_bytes(&mut bytes)?;

    Ok(Salt(bytes))
}

/// Generates a salt of `length` bytes, [`DEFAULT_SALT_LENGTH_IN_BYTES`] by default, using the
/// entropy source of the operating system.
#[instrument]
pub async fn generate_salt(length: Option<usize>) -> Result<Salt> {
    let length = length.unwrap_or(DEFAULT_SALT_LENGTH_IN_BYTES);

    tokio::task::spawn_blocking(move || generate_salt_blocking(length, OsRng)).await?
}
