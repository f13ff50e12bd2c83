use std::{borrow::Cow, collections::TryReserveError};

use derive_more::From;
use thiserror::Error;

use crate::params::{HashParamOutOfRangeError, HashParamTrait};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid salt, must be a buffer with {min} or more bytes, got {length}")]
    InvalidSalt { length: usize, min: usize },
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),
    #[error("Invalid hash, must be generated by Argon2: {0}")]
    InvalidHash(#[from] MalformedHashError),
    #[error("Derivation: {0}")]
    Derivation(#[from] DerivationError),
    #[error("Random source: {0}")]
    RandomSource(#[from] rand::Error),
    #[error("Tokio Join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether the error was raised by the parameter validator, before any work was scheduled.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSalt { .. } | Self::InvalidParameter(_))
    }
}

impl From<argon2::Error> for Error {
    fn from(value: argon2::Error) -> Self {
        Error::Derivation(value.into())
    }
}

/// A failure reported by the underlying primitive. Never retried.
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Argon2: {0}")]
    Argon2(#[from] argon2::Error),
    #[error("unable to allocate {blocks} memory blocks: {source}")]
    OutOfMemory {
        blocks: usize,
        #[source]
        source: TryReserveError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {label}, must be an integer between {min} and {max}, got {value}")]
pub struct InvalidParameterError {
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
    pub value: i64,
}

impl<P> From<HashParamOutOfRangeError<P>> for InvalidParameterError
where
    P: HashParamTrait,
{
    fn from(value: HashParamOutOfRangeError<P>) -> Self {
        InvalidParameterError {
            label: P::LABEL,
            min: P::MIN,
            max: P::MAX,
            value: value.0,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed hash: {0}")]
pub struct MalformedHashError(pub GenericError);

#[derive(Error, Debug, Clone, PartialEq, Eq, From)]
#[error("{0}")]
pub struct GenericError(pub Cow<'static, str>);

impl From<&'static str> for GenericError {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for GenericError {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl MalformedHashError {
    pub(crate) fn new(reason: impl Into<GenericError>) -> Self {
        Self(reason.into())
    }
}
