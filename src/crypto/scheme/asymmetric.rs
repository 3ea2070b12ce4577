//! secp256k1 wallets.
//!
//! Raw key encodings are used throughout: the private key is the 32-byte
//! scalar, the public key the 64-byte `x || y` point without the SEC1 tag
//! byte, and signatures the 64-byte `r || s` pair, all hex-encoded.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::OsRng;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{ensure_scheme, KeyScheme, SigningPayload, ADDRESS_HEX_LEN};
use crate::core::domain::{SchemeId, Wallet};
use crate::core::errors::WalletError;
use crate::crypto::hash::sha256_hex_bytes;

const PRIVATE_KEY_BYTES: usize = 32;
const PUBLIC_KEY_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsymmetricScheme;

impl AsymmetricScheme {
    fn signing_key_from_hex(private_key: &str) -> Result<SigningKey, WalletError> {
        let trimmed = private_key.trim();
        let bytes = Zeroizing::new(hex::decode(trimmed).map_err(|_| {
            WalletError::InvalidKeyFormat("private key is not valid hex".into())
        })?);
        if bytes.len() != PRIVATE_KEY_BYTES {
            return Err(WalletError::InvalidKeyFormat(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_BYTES,
                bytes.len()
            )));
        }
        SigningKey::from_slice(&bytes).map_err(|_| {
            WalletError::InvalidKeyFormat("private key is not a valid secp256k1 scalar".into())
        })
    }

    fn encode_public(verifying_key: &VerifyingKey) -> String {
        let point = verifying_key.as_affine().to_encoded_point(false);
        // Drop the 0x04 uncompressed tag.
        hex::encode(&point.as_bytes()[1..])
    }

    fn verifying_key_from_hex(public_key: &str) -> Result<VerifyingKey, WalletError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|_| WalletError::InvalidKeyFormat("public key is not valid hex".into()))?;
        let sec1 = match bytes.len() {
            PUBLIC_KEY_BYTES => {
                let mut tagged = Vec::with_capacity(PUBLIC_KEY_BYTES + 1);
                tagged.push(0x04);
                tagged.extend_from_slice(&bytes);
                tagged
            }
            65 if bytes[0] == 0x04 => bytes,
            n => {
                return Err(WalletError::InvalidKeyFormat(format!(
                    "public key must be {} bytes, got {}",
                    PUBLIC_KEY_BYTES, n
                )))
            }
        };
        VerifyingKey::from_sec1_bytes(&sec1)
            .map_err(|_| WalletError::InvalidKeyFormat("public key is not a curve point".into()))
    }

    /// Digest handed to ECDSA: SHA-1 over the raw bytes of `sha256(from->to:amount)`,
    /// which is what the node's verifier computes from the same message.
    fn message_prehash(payload: &SigningPayload<'_>) -> Vec<u8> {
        let msg_hash = Sha256::digest(payload.arrow_message().as_bytes());
        Sha1::digest(msg_hash).to_vec()
    }

    fn wallet_from_key(&self, signing_key: &SigningKey, address: Option<&str>) -> Result<Wallet, WalletError> {
        let private_key = Zeroizing::new(hex::encode(signing_key.to_bytes()));
        let public_key = Self::encode_public(signing_key.verifying_key());
        let derived = self.derive_address(&public_key)?;

        let address = match address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(given) => {
                if given != derived {
                    warn!(
                        supplied = %given,
                        derived = %derived,
                        "Imported address does not match the key's derived address; keeping the supplied address"
                    );
                }
                given.to_string()
            }
            None => derived,
        };

        Ok(Wallet::from_parts(SchemeId::Asymmetric, private_key, public_key, address))
    }
}

impl KeyScheme for AsymmetricScheme {
    fn id(&self) -> SchemeId {
        SchemeId::Asymmetric
    }

    fn generate(&self) -> Result<Wallet, WalletError> {
        let signing_key = SigningKey::random(&mut OsRng);
        let wallet = self.wallet_from_key(&signing_key, None)?;
        debug!(address = %wallet.address, "Generated secp256k1 wallet");
        Ok(wallet)
    }

    /// A supplied `address` is trusted as given, even when it differs from the
    /// key's derived address; the mismatch is only logged.
    fn import(&self, private_key: &str, address: Option<&str>) -> Result<Wallet, WalletError> {
        let signing_key = Self::signing_key_from_hex(private_key)?;
        self.wallet_from_key(&signing_key, address)
    }

    fn derive_public(&self, private_key: &str) -> Result<String, WalletError> {
        let signing_key = Self::signing_key_from_hex(private_key)?;
        Ok(Self::encode_public(signing_key.verifying_key()))
    }

    fn derive_address(&self, public_key: &str) -> Result<String, WalletError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|_| WalletError::InvalidKeyFormat("public key is not valid hex".into()))?;
        let mut digest = sha256_hex_bytes(&bytes);
        digest.truncate(ADDRESS_HEX_LEN);
        Ok(digest)
    }

    fn sign(&self, wallet: &Wallet, payload: &SigningPayload<'_>) -> Result<String, WalletError> {
        ensure_scheme(wallet, SchemeId::Asymmetric)?;
        let signing_key = Self::signing_key_from_hex(wallet.private_key())
            .map_err(|e| WalletError::SigningFailure(e.to_string()))?;
        let prehash = Self::message_prehash(payload);
        let signature: Signature = signing_key
            .sign_prehash(&prehash)
            .map_err(|e| WalletError::SigningFailure(format!("ECDSA signing failed: {}", e)))?;
        Ok(hex::encode(signature.to_bytes()))
    }

    fn verify(&self, public_key: &str, payload: &SigningPayload<'_>, signature: &str) -> bool {
        let Ok(verifying_key) = Self::verifying_key_from_hex(public_key) else {
            return false;
        };
        let Ok(sig_bytes) = hex::decode(signature.trim()) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&sig_bytes) else {
            return false;
        };
        // k256 only accepts low-S; the node's signer emits either half.
        let signature = signature.normalize_s().unwrap_or(signature);
        verifying_key
            .verify_prehash(&Self::message_prehash(payload), &signature)
            .is_ok()
    }
}
