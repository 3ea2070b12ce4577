pub mod hash;
pub mod scheme;

pub use self::hash::{sha256_hex, sha256_hex_bytes, sha256_hex_prefix};
pub use self::scheme::{scheme_for, AsymmetricScheme, HashChainScheme, KeyScheme, SigningPayload};
