//! Cost parameters accepted by [`crate::hash`], their limits, and the validation that runs
//! before any derivation work is scheduled.
//!
//! The limits are derived from the constraints compiled into the [`argon2`] crate. The memory
//! cost is expressed as the base 2 logarithm of the amount of memory in KiB.

use std::{
    fmt::{Debug, Display},
    marker::PhantomData,
};

use casey::pascal;
use proptest::{
    arbitrary::{any, Arbitrary},
    prop_compose,
    strategy::{BoxedStrategy, Just, Strategy},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    crypto::password_hash::argon2::{Argon2Params, VERSION_CURRENT, Variant},
    error::{Error, GenericError, InvalidParameterError, Result},
    salt::MIN_SALT_LENGTH_IN_BYTES,
};

pub trait HashParamTrait {
    /// The key of the parameter in [`HashOptions`] and in error messages.
    const LABEL: &'static str;
    // Better readability than `std::any::type_name`, because it does not contain the full path to the type.
    const TYPE_NAME: &'static str;
    const MIN: u32;
    const MAX: u32;
    const DEFAULT: u32;
}

#[derive(Error)]
pub struct HashParamOutOfRangeError<P: HashParamTrait>(pub i64, PhantomData<P>);

impl<P> Display for HashParamOutOfRangeError<P>
where
    P: HashParamTrait,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parameter {label:?} is set to the value {value:?} outside of the range {min:?}..={max:?}",
            label = P::LABEL,
            value = self.0,
            min = P::MIN,
            max = P::MAX,
        )
    }
}

impl<P> Debug for HashParamOutOfRangeError<P>
where
    P: HashParamTrait,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HashParamOutOfRangeError<{type_name}>({inner:?})",
            type_name = P::TYPE_NAME,
            inner = self.0
        )
    }
}

/// A parameter value known to lie within the [`Limit`] of `P`.
pub struct HashParam<P: HashParamTrait>(u32, PhantomData<P>);

impl<P> HashParam<P>
where
    P: HashParamTrait,
{
    pub fn try_from(value: i64) -> std::result::Result<Self, HashParamOutOfRangeError<P>> {
        if !Limit::of::<P>().contains(value) {
            return Err(HashParamOutOfRangeError(value, PhantomData));
        }

        Ok(Self(value as u32, PhantomData))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl<P> Serialize for HashParam<P>
where
    P: HashParamTrait,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<P> Clone for HashParam<P>
where
    P: HashParamTrait,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for HashParam<P> where P: HashParamTrait {}

impl<P> Debug for HashParam<P>
where
    P: HashParamTrait,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HashParam<{type_name}>({inner:?})",
            type_name = P::TYPE_NAME,
            inner = self.0
        )
    }
}

impl<P> PartialEq for HashParam<P>
where
    P: HashParamTrait,
{
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<P> Eq for HashParam<P> where P: HashParamTrait {}

macro_rules! define_hash_params {
    ($($label:ident($key:literal): $default:literal in $min:expr => $max:expr),+$(,)?) => {
        use stringify as Stringify;

        $(
            const _: () = const { assert!($min <= $default && $default <= $max); };
            pascal!(pub struct $label;);

            impl HashParamTrait for pascal!($label) {
                const LABEL: &'static str = $key;
                const TYPE_NAME: &'static str = pascal!(stringify!($label));
                const MIN: u32 = $min;
                const MAX: u32 = $max;
                const DEFAULT: u32 = $default;
            }
        )+
    };
}

define_hash_params! {
    time_cost("timeCost"): 3 in argon2::Params::MIN_T_COST => argon2::Params::MAX_T_COST,
    memory_cost("memoryCost"): 12 in ceil_log2(argon2::Params::MIN_M_COST) => argon2::Params::MAX_M_COST.ilog2(),
    parallelism("parallelism"): 1 in argon2::Params::MIN_P_COST => argon2::Params::MAX_P_COST,
}

const fn ceil_log2(value: u32) -> u32 {
    u32::BITS - (value - 1).leading_zeros()
}

/// An inclusive range of valid values for a single parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub min: u32,
    pub max: u32,
}

impl Limit {
    pub const fn of<P: HashParamTrait>() -> Self {
        Self {
            min: P::MIN,
            max: P::MAX,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min as i64..=self.max as i64).contains(&value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    pub time_cost: Limit,
    pub memory_cost: Limit,
    pub parallelism: Limit,
}

impl Limits {
    /// Pairs of option keys and their limits, in the order they are validated.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Limit)> {
        [
            (TimeCost::LABEL, self.time_cost),
            (MemoryCost::LABEL, self.memory_cost),
            (Parallelism::LABEL, self.parallelism),
        ]
        .into_iter()
    }
}

pub const LIMITS: Limits = Limits {
    time_cost: Limit::of::<TimeCost>(),
    memory_cost: Limit::of::<MemoryCost>(),
    parallelism: Limit::of::<Parallelism>(),
};

pub const DEFAULTS: HashOptions = HashOptions {
    time_cost: TimeCost::DEFAULT as i64,
    memory_cost: MemoryCost::DEFAULT as i64,
    parallelism: ParallelismOption::Fixed(Parallelism::DEFAULT as i64),
    argon2d: false,
};

/// The requested number of lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "ParallelismOptionSerde",
    into = "ParallelismOptionSerde"
)]
pub enum ParallelismOption {
    Fixed(i64),
    /// As many lanes as the host can run in parallel.
    Auto,
}

impl ParallelismOption {
    /// Resolves [`ParallelismOption::Auto`] to a concrete number of lanes.
    /// The result is not clamped into [`Limits::parallelism`].
    pub fn resolve(self) -> i64 {
        match self {
            Self::Fixed(lanes) => lanes,
            Self::Auto => available_parallelism(),
        }
    }
}

impl From<i64> for ParallelismOption {
    fn from(value: i64) -> Self {
        Self::Fixed(value)
    }
}

pub fn available_parallelism() -> i64 {
    match std::thread::available_parallelism() {
        Ok(lanes) => lanes.get() as i64,
        Err(error) => {
            warn!(%error, "unable to query the available parallelism, falling back to a single lane");
            1
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParallelismOptionSerde {
    Fixed(i64),
    Named(String),
}

const PARALLELISM_AUTO: &str = "auto";

impl TryFrom<ParallelismOptionSerde> for ParallelismOption {
    type Error = GenericError;

    fn try_from(value: ParallelismOptionSerde) -> std::result::Result<Self, Self::Error> {
        match value {
            ParallelismOptionSerde::Fixed(lanes) => Ok(Self::Fixed(lanes)),
            ParallelismOptionSerde::Named(name) if name == PARALLELISM_AUTO => Ok(Self::Auto),
            ParallelismOptionSerde::Named(name) => Err(GenericError::from(format!(
                "expected an integer or {PARALLELISM_AUTO:?}, got {name:?}"
            ))),
        }
    }
}

impl From<ParallelismOption> for ParallelismOptionSerde {
    fn from(value: ParallelismOption) -> Self {
        match value {
            ParallelismOption::Fixed(lanes) => Self::Fixed(lanes),
            ParallelismOption::Auto => Self::Named(PARALLELISM_AUTO.to_owned()),
        }
    }
}

/// Options of a hashing operation, as supplied by the caller.
///
/// Deserializes from an object with the keys `timeCost`, `memoryCost`, `parallelism` and
/// `argon2d`. Missing keys fall back to [`DEFAULTS`], unrecognized keys are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashOptions {
    /// Number of passes over the memory.
    pub time_cost: i64,
    /// Base 2 logarithm of the amount of memory in KiB.
    pub memory_cost: i64,
    pub parallelism: ParallelismOption,
    /// Selects [`Variant::Argon2d`] instead of [`Variant::Argon2i`].
    pub argon2d: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        DEFAULTS
    }
}

impl HashOptions {
    pub fn with_time_cost(self, time_cost: i64) -> Self {
        Self { time_cost, ..self }
    }

    pub fn with_memory_cost(self, memory_cost: i64) -> Self {
        Self {
            memory_cost,
            ..self
        }
    }

    pub fn with_parallelism(self, parallelism: impl Into<ParallelismOption>) -> Self {
        Self {
            parallelism: parallelism.into(),
            ..self
        }
    }

    pub fn with_variant(self, variant: Variant) -> Self {
        Self {
            argon2d: variant == Variant::Argon2d,
            ..self
        }
    }

    pub fn variant(&self) -> Variant {
        if self.argon2d {
            Variant::Argon2d
        } else {
            Variant::Argon2i
        }
    }
}

prop_compose! {
    /// Options cheap enough to hash many times over in tests.
    pub fn arb_hash_options(max_memory_cost: i64)(
        parallelism in 1_i64..=2,
    )(
        time_cost in 1_i64..=2,
        // At least 8 KiB of memory per lane.
        memory_cost in (parallelism + 2)..=std::cmp::max(parallelism + 2, max_memory_cost),
        parallelism in Just(parallelism),
        argon2d in any::<bool>(),
    ) -> HashOptions {
        HashOptions {
            time_cost,
            memory_cost,
            parallelism: ParallelismOption::Fixed(parallelism),
            argon2d,
        }
    }
}

impl Arbitrary for HashOptions {
    type Parameters = ();
    type Strategy = BoxedStrategy<HashOptions>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        arb_hash_options(8).boxed()
    }
}

/// Options that passed [`validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ValidatedOptions {
    pub time_cost: HashParam<TimeCost>,
    pub memory_cost: HashParam<MemoryCost>,
    pub parallelism: HashParam<Parallelism>,
    pub variant: Variant,
}

impl ValidatedOptions {
    pub fn memory_cost_in_kib(&self) -> u32 {
        1 << self.memory_cost.get()
    }

    pub fn to_argon2_params(&self) -> Argon2Params {
        Argon2Params {
            variant: self.variant,
            version: VERSION_CURRENT,
            m_cost: self.memory_cost_in_kib(),
            t_cost: self.time_cost.get(),
            p_cost: self.parallelism.get(),
        }
    }
}

/// Checks the salt length and every parameter listed in [`LIMITS`].
/// Never schedules any work; [`ParallelismOption::Auto`] is resolved beforehand.
pub fn validate(salt: &[u8], options: &HashOptions) -> Result<ValidatedOptions> {
    if salt.len() < MIN_SALT_LENGTH_IN_BYTES {
        return Err(Error::InvalidSalt {
            length: salt.len(),
            min: MIN_SALT_LENGTH_IN_BYTES,
        });
    }

    let parallelism = options.parallelism.resolve();

    Ok(ValidatedOptions {
        time_cost: HashParam::try_from(options.time_cost).map_err(InvalidParameterError::from)?,
        memory_cost: HashParam::try_from(options.memory_cost)
            .map_err(InvalidParameterError::from)?,
        parallelism: HashParam::try_from(parallelism).map_err(InvalidParameterError::from)?,
        variant: options.variant(),
    })
}
