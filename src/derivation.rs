//! Hashing entry points. The derivation itself is memory-hard and may run for a long time,
//! so the asynchronous variants dispatch it to tokio's blocking thread pool.
//!
//! A dispatched derivation cannot be cancelled. Dropping the returned future abandons the
//! result, but the worker runs to completion.

use futures::{FutureExt, future::BoxFuture};
use tracing::{Instrument, debug, debug_span, instrument};

use crate::{
    crypto::password_hash::{
        PasswordHash,
        argon2::{Argon2Params, RAW_HASH_LENGTH_IN_BYTES},
    },
    encoding::{EncodedHash, HashParts, RawHash},
    error::Result,
    params::{HashOptions, validate},
    plaintext::Plaintext,
    salt::Salt,
};

#[instrument(skip_all, fields(?params))]
pub fn derive_blocking(
    plaintext: &Plaintext,
    salt: &Salt,
    params: &Argon2Params,
    output_length_in_bytes: usize,
) -> Result<RawHash> {
    let mut output = vec![0_u8; output_length_in_bytes];

    params.hash_password(plaintext, salt, &mut output)?;

    Ok(RawHash::from(output))
}

pub(crate) async fn derive_raw(
    plaintext: Plaintext,
    salt: Salt,
    params: Argon2Params,
    output_length_in_bytes: usize,
) -> Result<RawHash> {
    debug!(?params, "dispatching derivation to a blocking worker");

    let hash = tokio::task::spawn_blocking(move || {
        derive_blocking(&plaintext, &salt, &params, output_length_in_bytes)
    })
    .await??;

    debug!("derivation completed");

    Ok(hash)
}

/// Derives a hash on a blocking worker and encodes it.
/// `params` are passed to the primitive without any further validation.
pub async fn derive_async(
    plaintext: Plaintext,
    salt: Salt,
    params: Argon2Params,
) -> Result<EncodedHash> {
    let hash = derive_raw(plaintext, salt.clone(), params, RAW_HASH_LENGTH_IN_BYTES).await?;

    Ok(HashParts::new(&params, salt, hash).encode())
}

pub fn hash_blocking(
    plaintext: impl Into<Plaintext>,
    salt: impl Into<Salt>,
    options: &HashOptions,
) -> Result<EncodedHash> {
    let salt = salt.into();
    let params = validate(&salt, options)?.to_argon2_params();
    let hash = derive_blocking(
        &plaintext.into(),
        &salt,
        &params,
        RAW_HASH_LENGTH_IN_BYTES,
    )?;

    Ok(HashParts::new(&params, salt, hash).encode())
}

/// Hashes `plaintext` with `salt`.
///
/// The salt and options are validated before this function returns, so invalid input is
/// rejected by the first poll of the returned future, without dispatching any work.
pub fn hash(
    plaintext: impl Into<Plaintext>,
    salt: impl Into<Salt>,
    options: &HashOptions,
) -> BoxFuture<'static, Result<EncodedHash>> {
    let span = debug_span!("hash", ?options);
    let salt = salt.into();
    let plaintext = plaintext.into();
    let validated = span.in_scope(|| validate(&salt, options));

    async move {
        let params = validated?.to_argon2_params();

        derive_async(plaintext, salt, params).await
    }
    .instrument(span)
    .boxed()
}
