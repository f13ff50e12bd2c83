use std::fmt::Display;

use ::argon2::{Argon2, Block};
use proptest::{
    arbitrary::{any, Arbitrary},
    prop_compose, prop_oneof,
    strategy::{BoxedStrategy, Just, Strategy},
};
use proptest_derive::Arbitrary;
use serde::{Deserialize, Serialize};

use crate::error::{DerivationError, Result};

use super::PasswordHash;

/// Version 1.0 of the algorithm, assumed for encoded hashes without a `v=` segment.
pub const VERSION_LEGACY: u32 = 0x10;
/// Version 1.3 of the algorithm, used for all newly produced hashes.
pub const VERSION_CURRENT: u32 = 0x13;
/// Length of the raw output of newly produced hashes.
pub const RAW_HASH_LENGTH_IN_BYTES: usize = 32;

#[derive(Arbitrary, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Data-dependent memory access. Faster, but vulnerable to side-channel attacks.
    Argon2d,
    /// Data-independent memory access.
    Argon2i,
}

impl Variant {
    /// The character following `argon2` in the encoded form.
    pub const fn discriminator(self) -> char {
        match self {
            Self::Argon2d => 'd',
            Self::Argon2i => 'i',
        }
    }

    pub const fn from_discriminator(discriminator: char) -> Option<Self> {
        match discriminator {
            'd' => Some(Self::Argon2d),
            'i' => Some(Self::Argon2i),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Argon2d => "argon2d",
            Self::Argon2i => "argon2i",
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Variant> for ::argon2::Algorithm {
    fn from(value: Variant) -> Self {
        match value {
            Variant::Argon2d => Self::Argon2d,
            Variant::Argon2i => Self::Argon2i,
        }
    }
}

/// Parameters passed to the primitive verbatim.
/// Unlike [`crate::params::HashOptions`], the memory cost is an absolute number of KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// The specific Argon2 algorithm to be used.
    pub variant: Variant,
    /// Version of the algorithm, see [`VERSION_CURRENT`] and [`VERSION_LEGACY`].
    pub version: u32,
    /// Memory size in 1 KiB blocks. At least 8\*`p_cost`.
    pub m_cost: u32,
    /// Number of iterations.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Argon2Params {
    fn instantiate(&self, output_length: usize) -> Result<Argon2<'static>> {
        let version = ::argon2::Version::try_from(self.version)?;
        let params =
            ::argon2::Params::new(self.m_cost, self.t_cost, self.p_cost, Some(output_length))?;

        Ok(Argon2::new(self.variant.into(), version, params))
    }
}

impl PasswordHash for Argon2Params {
    fn hash_password(&self, password: &[u8], salt: &[u8], output: &mut [u8]) -> Result<()> {
        let argon2 = self.instantiate(output.len())?;
        let block_count = argon2.params().block_count();
        let mut blocks = Vec::new();

        // Allocation failures must not abort the process.
        blocks
            .try_reserve_exact(block_count)
            .map_err(|source| DerivationError::OutOfMemory {
                blocks: block_count,
                source,
            })?;
        blocks.resize(block_count, Block::default());
        argon2.hash_password_into_with_memory(password, salt, output, &mut blocks)?;

        Ok(())
    }
}

prop_compose! {
    pub fn arb_argon2_params(log_max_cost: u32)(
        p_cost in 1_u32..=4,
        t_cost in 1_u32..=(1 << log_max_cost.min(2)),
    )(
        variant in any::<Variant>(),
        version in prop_oneof![Just(VERSION_LEGACY), Just(VERSION_CURRENT)],
        m_cost in (8 * p_cost)..=std::cmp::max(8 * p_cost, 1 << log_max_cost),
        t_cost in Just(t_cost),
        p_cost in Just(p_cost),
    ) -> Argon2Params {
        Argon2Params { variant, version, m_cost, t_cost, p_cost }
    }
}

impl Arbitrary for Argon2Params {
    type Parameters = ();
    type Strategy = BoxedStrategy<Argon2Params>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_argon2_params(6).boxed()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    fn params(m_cost: u32, p_cost: u32) -> Argon2Params {
        Argon2Params {
            variant: Variant::Argon2i,
            version: VERSION_CURRENT,
            m_cost,
            t_cost: 1,
            p_cost,
        }
    }

    #[test]
    fn discriminator_round_trips() {
        for variant in [Variant::Argon2d, Variant::Argon2i] {
            assert_eq!(
                Variant::from_discriminator(variant.discriminator()),
                Some(variant)
            );
            assert!(variant.name().ends_with(variant.discriminator()));
        }

        assert_eq!(Variant::from_discriminator('x'), None);
    }

    #[test]
    fn variants_produce_different_output() {
        let mut output_d = [0_u8; RAW_HASH_LENGTH_IN_BYTES];
        let mut output_i = [0_u8; RAW_HASH_LENGTH_IN_BYTES];
        let params_i = params(32, 1);
        let params_d = Argon2Params {
            variant: Variant::Argon2d,
            ..params_i
        };

        params_d
            .hash_password(b"password", b"somesalt", &mut output_d)
            .unwrap();
        params_i
            .hash_password(b"password", b"somesalt", &mut output_i)
            .unwrap();

        assert_ne!(output_d, output_i);
    }

    #[test]
    fn insufficient_memory_per_lane_is_reported() {
        let mut output = [0_u8; RAW_HASH_LENGTH_IN_BYTES];
        let result = params(8, 2).hash_password(b"password", b"somesalt", &mut output);

        assert!(matches!(
            result,
            Err(Error::Derivation(DerivationError::Argon2(_)))
        ));
    }

    #[test]
    fn unsupported_version_is_reported() {
        let mut output = [0_u8; RAW_HASH_LENGTH_IN_BYTES];
        let result = Argon2Params {
            version: 0x14,
            ..params(32, 1)
        }
        .hash_password(b"password", b"somesalt", &mut output);

        assert!(matches!(
            result,
            Err(Error::Derivation(DerivationError::Argon2(
                ::argon2::Error::VersionInvalid
            )))
        ));
    }
}
