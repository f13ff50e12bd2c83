use std::ops::Deref;

use crate::utils::serde::Secret;

/// A secret to be hashed or verified.
///
/// Text is converted to bytes as UTF-8. The bytes are zeroized when dropped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Plaintext(Secret<Vec<u8>>);

impl Deref for Plaintext {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for Plaintext {
    fn from(value: Vec<u8>) -> Self {
        Self(Secret(value))
    }
}

impl From<&[u8]> for Plaintext {
    fn from(value: &[u8]) -> Self {
        Self::from(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Plaintext {
    fn from(value: &[u8; N]) -> Self {
        Self::from(value.to_vec())
    }
}

impl From<String> for Plaintext {
    fn from(value: String) -> Self {
        Self::from(value.into_bytes())
    }
}

impl From<&str> for Plaintext {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}
