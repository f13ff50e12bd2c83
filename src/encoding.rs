//! The self-describing textual representation of a hash:
//!
//! ```text
//! $argon2{d|i}[$v=<version>]$m=<KiB>,t=<passes>,p=<lanes>$<base64 salt>$<base64 hash>
//! ```
//!
//! Salt and hash use the standard base64 alphabet without padding, so that the output is
//! interchangeable with other Argon2 implementations.

use std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
    sync::LazyLock,
};

use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::password_hash::argon2::{Argon2Params, VERSION_LEGACY, Variant},
    error::MalformedHashError,
    salt::{MIN_SALT_LENGTH_IN_BYTES, Salt},
    utils::serde::Secret,
};

static ENCODED_HASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\$argon2([di])(?:\$v=([0-9]+))?\$m=([0-9]+),t=([0-9]+),p=([0-9]+)\$([A-Za-z0-9+/]+)\$([A-Za-z0-9+/]+)$",
    )
    .unwrap()
});

/// The raw output of the primitive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawHash(pub(crate) Secret<Vec<u8>>);

impl Deref for RawHash {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for RawHash {
    fn from(value: Vec<u8>) -> Self {
        Self(Secret(value))
    }
}

/// The structured contents of an [`EncodedHash`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashParts {
    pub variant: Variant,
    /// Absent in hashes produced by implementations predating version 1.3.
    pub version: Option<u32>,
    /// Memory size in KiB.
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
    pub salt: Salt,
    pub hash: RawHash,
}

impl HashParts {
    pub fn new(params: &Argon2Params, salt: Salt, hash: RawHash) -> Self {
        Self {
            variant: params.variant,
            version: Some(params.version),
            m_cost: params.m_cost,
            t_cost: params.t_cost,
            p_cost: params.p_cost,
            salt,
            hash,
        }
    }

    /// The parameters to re-derive the hash with.
    pub fn params(&self) -> Argon2Params {
        Argon2Params {
            variant: self.variant,
            version: self.version.unwrap_or(VERSION_LEGACY),
            m_cost: self.m_cost,
            t_cost: self.t_cost,
            p_cost: self.p_cost,
        }
    }

    pub fn encode(&self) -> EncodedHash {
        encode(self)
    }
}

impl FromStr for HashParts {
    type Err = MalformedHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// A hash in its canonical textual form. Only ever holds text accepted by [`decode`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedHash(String);

impl EncodedHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<HashParts, MalformedHashError> {
        decode(&self.0)
    }
}

impl Deref for EncodedHash {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for EncodedHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for EncodedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for EncodedHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedHash({:?})", self.0)
    }
}

impl TryFrom<String> for EncodedHash {
    type Error = MalformedHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode(&value)?;
        Ok(Self(value))
    }
}

impl FromStr for EncodedHash {
    type Err = MalformedHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl From<EncodedHash> for String {
    fn from(value: EncodedHash) -> Self {
        value.0
    }
}

pub fn encode(parts: &HashParts) -> EncodedHash {
    let version = parts
        .version
        .map(|version| format!("$v={version}"))
        .unwrap_or_default();

    EncodedHash(format!(
        "${variant}{version}$m={m},t={t},p={p}${salt}${hash}",
        variant = parts.variant,
        m = parts.m_cost,
        t = parts.t_cost,
        p = parts.p_cost,
        salt = STANDARD_NO_PAD.encode(&*parts.salt),
        hash = STANDARD_NO_PAD.encode(&*parts.hash),
    ))
}

pub fn decode(encoded: &str) -> Result<HashParts, MalformedHashError> {
    let captures = ENCODED_HASH_RE
        .captures(encoded)
        .ok_or_else(|| MalformedHashError::new("text does not match the Argon2 hash format"))?;
    let variant = captures[1]
        .chars()
        .next()
        .and_then(Variant::from_discriminator)
        .ok_or_else(|| MalformedHashError::new("unknown variant"))?;
    let version = captures
        .get(2)
        .map(|version| parse_decimal("v", version.as_str()))
        .transpose()?;

    let parts = HashParts {
        variant,
        version,
        m_cost: parse_decimal("m", &captures[3])?,
        t_cost: parse_decimal("t", &captures[4])?,
        p_cost: parse_decimal("p", &captures[5])?,
        salt: Salt(parse_base64("salt", &captures[6])?),
        hash: RawHash::from(parse_base64("hash", &captures[7])?),
    };

    check_derivable(&parts)?;

    Ok(parts)
}

/// Rejects hashes that the primitive could never re-derive.
fn check_derivable(parts: &HashParts) -> Result<(), MalformedHashError> {
    if parts.salt.len() < MIN_SALT_LENGTH_IN_BYTES {
        return Err(MalformedHashError::new(format!(
            "salt must be at least {MIN_SALT_LENGTH_IN_BYTES} bytes, got {}",
            parts.salt.len()
        )));
    }

    // `Params::new` multiplies `p` by 8 unchecked.
    if !(::argon2::Params::MIN_P_COST..=::argon2::Params::MAX_P_COST).contains(&parts.p_cost) {
        return Err(MalformedHashError::new(format!(
            "unsupported `p` value: {}",
            parts.p_cost
        )));
    }

    ::argon2::Params::new(
        parts.m_cost,
        parts.t_cost,
        parts.p_cost,
        Some(parts.hash.len()),
    )
    .map_err(|error| MalformedHashError::new(format!("unsupported parameters: {error}")))?;
    ::argon2::Version::try_from(parts.version.unwrap_or(VERSION_LEGACY))
        .map_err(|error| MalformedHashError::new(format!("unsupported version: {error}")))?;

    Ok(())
}

fn parse_decimal(label: &str, digits: &str) -> Result<u32, MalformedHashError> {
    digits
        .parse()
        .map_err(|error| MalformedHashError::new(format!("invalid `{label}` value: {error}")))
}

fn parse_base64(label: &str, encoded: &str) -> Result<Vec<u8>, MalformedHashError> {
    STANDARD_NO_PAD
        .decode(encoded)
        .map_err(|error| MalformedHashError::new(format!("invalid {label}: {error}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::password_hash::argon2::VERSION_CURRENT;

    const REFERENCE: &str =
        "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA";

    fn parts(version: Option<u32>) -> HashParts {
        HashParts {
            variant: Variant::Argon2d,
            version,
            m_cost: 4096,
            t_cost: 3,
            p_cost: 2,
            salt: Salt::from(b"somesalt"),
            hash: RawHash::from(vec![0xAB; 32]),
        }
    }

    #[test]
    fn decodes_reference_hash() {
        let decoded = decode(REFERENCE).unwrap();

        assert_eq!(decoded.variant, Variant::Argon2i);
        assert_eq!(decoded.version, Some(VERSION_CURRENT));
        assert_eq!((decoded.m_cost, decoded.t_cost, decoded.p_cost), (65536, 2, 1));
        assert_eq!(&*decoded.salt, b"somesalt");
        assert_eq!(decoded.hash.len(), 32);
        assert_eq!(decoded.encode().as_str(), REFERENCE);
    }

    #[test]
    fn round_trips_versioned_and_legacy() {
        for version in [Some(VERSION_CURRENT), Some(VERSION_LEGACY), None] {
            let parts = parts(version);
            let encoded = encode(&parts);

            assert_eq!(encoded.as_str().contains("$v="), version.is_some());
            assert_eq!(decode(&encoded).unwrap(), parts);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(
            encode(&parts(None)).as_str(),
            "$argon2d$m=4096,t=3,p=2$c29tZXNhbHQ$q6urq6urq6urq6urq6urq6urq6urq6urq6urq6urq6s"
        );
        assert_eq!(encode(&parts(None)), encode(&parts(None)));
    }

    #[test]
    fn legacy_hash_is_rederived_with_version_1_0() {
        let legacy = decode("$argon2i$m=4096,t=3,p=1$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw").unwrap();

        assert_eq!(legacy.version, None);
        assert_eq!(legacy.params().version, VERSION_LEGACY);
    }

    #[test]
    fn rejects_malformed_text() {
        for malformed in [
            "",
            "not-a-valid-hash-string",
            "$argon2id$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2x$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2i$v=19$m=65536,t=2$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2i$v=19$t=2,m=65536,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ=$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNh_HQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ",
            "$argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9$extra",
            "$argon2i$v=19$m=+65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
            " $argon2i$v=19$m=65536,t=2,p=1$c29tZXNhbHQ$wWKIMhR9lyDFvRz9YTZweHKfbftvj+qf+YFY4NeBbtA",
        ] {
            assert!(decode(malformed).is_err(), "accepted {malformed:?}");
        }
    }

    #[test]
    fn rejects_values_the_grammar_cannot_represent() {
        // Matches the grammar, but overflows.
        assert!(decode("$argon2i$v=19$m=4294967296,t=2,p=1$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw").is_err());
        // Matches the grammar, but is not canonical base64.
        assert!(decode("$argon2i$v=19$m=4096,t=2,p=1$c29tZXNhbHR$q6urq6urq6urq6urq6urqw").is_err());
        assert!(decode("$argon2i$v=19$m=4096,t=2,p=1$c$q6urq6urq6urq6urq6urqw").is_err());
    }

    #[test]
    fn rejects_hashes_that_cannot_be_rederived() {
        for underivable in [
            // 3-byte salt.
            "$argon2i$v=19$m=4096,t=3,p=1$YWJj$q6urq6urq6urq6urq6urqw",
            // 2-byte raw hash.
            "$argon2i$v=19$m=4096,t=3,p=1$c29tZXNhbHQ$q6s",
            // 8 KiB cannot be split into 2 lanes.
            "$argon2i$v=19$m=8,t=1,p=2$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw",
            "$argon2i$v=19$m=4096,t=0,p=1$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw",
            "$argon2i$v=19$m=4096,t=3,p=0$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw",
            "$argon2i$v=19$m=4294967295,t=3,p=4294967295$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw",
            "$argon2i$v=20$m=4096,t=3,p=1$c29tZXNhbHQ$q6urq6urq6urq6urq6urqw",
        ] {
            assert!(decode(underivable).is_err(), "accepted {underivable:?}");
        }

        // The smallest hash the primitive accepts.
        assert!(decode("$argon2d$v=16$m=8,t=1,p=1$c29tZXNhbHQ$q6urqw").is_ok());
    }

    #[test]
    fn encoded_hash_is_validated_on_construction() {
        assert!(EncodedHash::from_str("not-a-valid-hash-string").is_err());
        assert!(serde_json::from_str::<EncodedHash>(r#""$argon2q$""#).is_err());

        let encoded: EncodedHash = serde_json::from_value(serde_json::json!(REFERENCE)).unwrap();

        assert_eq!(encoded.to_string(), REFERENCE);
        assert_eq!(serde_json::to_value(&encoded).unwrap(), serde_json::json!(REFERENCE));
    }
}
