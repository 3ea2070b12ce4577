//! Hash-chain wallets.
//!
//! `priv` is 64 lowercase hex characters, `pub = H(priv)` and
//! `address = H(pub)[..40]`, where `H` is hex SHA-256 over the UTF-8 text.
//! A signature is `H(H(pub) ++ from ++ to ++ amount ++ nonce)`: it only proves
//! the payload was not altered in transit, not who produced it.

use tracing::debug;
use zeroize::Zeroizing;

use super::{ensure_scheme, KeyScheme, SigningPayload, ADDRESS_HEX_LEN};
use crate::core::domain::{SchemeId, Wallet};
use crate::core::errors::WalletError;
use crate::crypto::hash::sha256_hex;
use crate::security::secret::random_secret_hex;

const PRIVATE_KEY_HEX_LEN: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct HashChainScheme;

impl HashChainScheme {
    fn normalize_private(private_key: &str) -> Result<Zeroizing<String>, WalletError> {
        let trimmed = private_key.trim();
        if trimmed.len() != PRIVATE_KEY_HEX_LEN {
            return Err(WalletError::InvalidKeyFormat(format!(
                "private key must be exactly {} hex characters, got {}",
                PRIVATE_KEY_HEX_LEN,
                trimmed.len()
            )));
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(WalletError::InvalidKeyFormat(
                "private key contains non-hex characters".into(),
            ));
        }
        Ok(Zeroizing::new(trimmed.to_ascii_lowercase()))
    }

    fn wallet_from_private(&self, private_key: Zeroizing<String>) -> Result<Wallet, WalletError> {
        let public_key = sha256_hex(&private_key);
        let address = self.derive_address(&public_key)?;
        Ok(Wallet::from_parts(SchemeId::HashChain, private_key, public_key, address))
    }

    fn keyed_hash(public_key: &str, payload: &SigningPayload<'_>) -> String {
        let key = sha256_hex(public_key);
        sha256_hex(&format!("{}{}", key, payload.concatenated()))
    }
}

impl KeyScheme for HashChainScheme {
    fn id(&self) -> SchemeId {
        SchemeId::HashChain
    }

    fn generate(&self) -> Result<Wallet, WalletError> {
        let wallet = self.wallet_from_private(random_secret_hex::<32>())?;
        debug!(address = %wallet.address, "Generated hash-chain wallet");
        Ok(wallet)
    }

    /// The address is always re-derived; a supplied address is ignored.
    fn import(&self, private_key: &str, _address: Option<&str>) -> Result<Wallet, WalletError> {
        let normalized = Self::normalize_private(private_key)?;
        self.wallet_from_private(normalized)
    }

    fn derive_public(&self, private_key: &str) -> Result<String, WalletError> {
        let normalized = Self::normalize_private(private_key)?;
        Ok(sha256_hex(&normalized))
    }

    fn derive_address(&self, public_key: &str) -> Result<String, WalletError> {
        if public_key.trim().is_empty() {
            return Err(WalletError::InvalidKeyFormat("public key is empty".into()));
        }
        let mut digest = sha256_hex(public_key.trim());
        digest.truncate(ADDRESS_HEX_LEN);
        Ok(digest)
    }

    fn sign(&self, wallet: &Wallet, payload: &SigningPayload<'_>) -> Result<String, WalletError> {
        ensure_scheme(wallet, SchemeId::HashChain)?;
        if payload.nonce.is_none() {
            return Err(WalletError::SigningFailure(
                "hash-chain signatures require a nonce".into(),
            ));
        }
        Ok(Self::keyed_hash(&wallet.public_key, payload))
    }

    fn verify(&self, public_key: &str, payload: &SigningPayload<'_>, signature: &str) -> bool {
        Self::keyed_hash(public_key, payload) == signature.trim().to_ascii_lowercase()
    }
}
