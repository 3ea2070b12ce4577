//! Key schemes
//!
//! Both wallet families implement [`KeyScheme`]. The scheme is selected once,
//! when a wallet is generated or imported, and travels with the wallet as its
//! [`SchemeId`] tag.
//!
//! ## Schemes
//! - `asymmetric` - secp256k1 keys, ECDSA over the message hash (nonce-less)
//! - `hash_chain` - hex secret, `pub = H(priv)`, keyed-hash signatures

pub mod asymmetric;
pub mod hash_chain;

pub use asymmetric::AsymmetricScheme;
pub use hash_chain::HashChainScheme;

use crate::core::domain::{Amount, SchemeId, Wallet};
use crate::core::errors::WalletError;

/// Number of hex characters kept from the public-key hash to form an address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// The fields a transaction signature commits to.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningPayload<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub amount: Amount,
    pub nonce: Option<u64>,
}

impl<'a> SigningPayload<'a> {
    pub fn new(from: &'a str, to: &'a str, amount: Amount, nonce: Option<u64>) -> Self {
        Self { from, to, amount, nonce }
    }

    /// `from->to:amount`, the message the asymmetric scheme hashes and signs.
    pub fn arrow_message(&self) -> String {
        format!("{}->{}:{}", self.from, self.to, self.amount.canonical())
    }

    /// `from ++ to ++ amount ++ nonce` with no delimiters; an absent nonce contributes nothing.
    pub fn concatenated(&self) -> String {
        let nonce = self.nonce.map(|n| n.to_string()).unwrap_or_default();
        format!("{}{}{}{}", self.from, self.to, self.amount.canonical(), nonce)
    }
}

/// Key generation, derivation and signing for one wallet family.
pub trait KeyScheme: Send + Sync {
    fn id(&self) -> SchemeId;

    /// Creates a fresh wallet from the OS CSPRNG.
    fn generate(&self) -> Result<Wallet, WalletError>;

    /// Rebuilds a wallet from private key material. `address` is only
    /// honored by schemes that accept an externally supplied address.
    fn import(&self, private_key: &str, address: Option<&str>) -> Result<Wallet, WalletError>;

    fn derive_public(&self, private_key: &str) -> Result<String, WalletError>;

    fn derive_address(&self, public_key: &str) -> Result<String, WalletError>;

    /// Signs `payload` with the wallet's keys and returns the signature as hex.
    fn sign(&self, wallet: &Wallet, payload: &SigningPayload<'_>) -> Result<String, WalletError>;

    /// Checks `signature` against `public_key` and `payload` only.
    fn verify(&self, public_key: &str, payload: &SigningPayload<'_>, signature: &str) -> bool;
}

static ASYMMETRIC: AsymmetricScheme = AsymmetricScheme;
static HASH_CHAIN: HashChainScheme = HashChainScheme;

/// Scheme implementation for a wallet tag.
pub fn scheme_for(id: SchemeId) -> &'static dyn KeyScheme {
    match id {
        SchemeId::Asymmetric => &ASYMMETRIC,
        SchemeId::HashChain => &HASH_CHAIN,
    }
}

pub(crate) fn ensure_scheme(wallet: &Wallet, expected: SchemeId) -> Result<(), WalletError> {
    if wallet.scheme != expected {
        return Err(WalletError::SigningFailure(format!(
            "wallet uses scheme {} but {} was asked to sign",
            wallet.scheme, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_forms() {
        let p = SigningPayload::new("alice", "bob", Amount::from(10), Some(5));
        assert_eq!(p.arrow_message(), "alice->bob:10.0");
        assert_eq!(p.concatenated(), "alicebob10.05");

        let nonceless = SigningPayload::new("alice", "bob", Amount::from(10), None);
        assert_eq!(nonceless.concatenated(), "alicebob10.0");
    }

    #[test]
    fn test_scheme_for_dispatch() {
        assert_eq!(scheme_for(SchemeId::Asymmetric).id(), SchemeId::Asymmetric);
        assert_eq!(scheme_for(SchemeId::HashChain).id(), SchemeId::HashChain);
    }
}
