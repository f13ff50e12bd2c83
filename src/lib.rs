//! Password hashing with Argon2.
//!
//! Hashes are produced in the self-describing textual format shared by Argon2
//! implementations, which embeds the variant, version, cost parameters and salt, so that
//! [`verify`] needs nothing but the encoded hash and the plaintext.
//!
//! ```no_run
//! # async fn example() -> argon2_hasher::Result<()> {
//! use argon2_hasher::{HashOptions, generate_salt, hash, verify};
//!
//! let salt = generate_salt(None).await?;
//! let encoded = hash("correct", salt, &HashOptions::default()).await?;
//!
//! assert!(verify(&encoded, "correct").await?);
//! assert!(!verify(&encoded, "wrong").await?);
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod derivation;
pub mod encoding;
pub mod error;
pub mod params;
pub mod plaintext;
pub mod salt;
pub mod utils;
pub mod verify;

pub use crypto::password_hash::argon2::{Argon2Params, Variant};
pub use derivation::{derive_async, hash, hash_blocking};
pub use encoding::{EncodedHash, HashParts, decode, encode};
pub use error::{Error, Result};
pub use params::{DEFAULTS, HashOptions, LIMITS, Limits, ParallelismOption, validate};
pub use plaintext::Plaintext;
pub use salt::{Salt, generate_salt, generate_salt_blocking};
pub use verify::{verify, verify_blocking};
