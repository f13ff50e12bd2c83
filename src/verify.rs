use futures::{FutureExt, future::BoxFuture};
use tracing::{Instrument, debug, debug_span};

use crate::{
    derivation::{derive_blocking, derive_raw},
    encoding::{HashParts, decode},
    error::Result,
    plaintext::Plaintext,
    utils::consttime::bytes_eq,
};

fn compare(parts: &HashParts, derived: &[u8]) -> bool {
    let matches = bytes_eq(derived, &parts.hash);

    debug!(matches, "compared derived hash");

    matches
}

pub fn verify_blocking(encoded: impl AsRef<str>, plaintext: impl Into<Plaintext>) -> Result<bool> {
    let parts = decode(encoded.as_ref())?;
    let derived = derive_blocking(
        &plaintext.into(),
        &parts.salt,
        &parts.params(),
        parts.hash.len(),
    )?;

    Ok(compare(&parts, &derived))
}

/// Checks whether `plaintext` hashes to `encoded`, using the parameters and salt embedded
/// in `encoded`.
///
/// Resolves to `Ok(false)` on a mismatch. Text that is not a valid encoded hash is rejected
/// by the first poll of the returned future, without dispatching any work.
pub fn verify(
    encoded: impl AsRef<str>,
    plaintext: impl Into<Plaintext>,
) -> BoxFuture<'static, Result<bool>> {
    let span = debug_span!("verify");
    let decoded = span.in_scope(|| decode(encoded.as_ref()));
    let plaintext = plaintext.into();

    async move {
        let parts = decoded?;
        let derived = derive_raw(
            plaintext,
            parts.salt.clone(),
            parts.params(),
            parts.hash.len(),
        )
        .await?;

        Ok(compare(&parts, &derived))
    }
    .instrument(span)
    .boxed()
}
