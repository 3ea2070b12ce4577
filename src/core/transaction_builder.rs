//! Transaction construction
//!
//! Builds the canonical payload, signs it with the wallet's scheme and
//! assembles the exact body the node expects. No network I/O happens here.
//!
//! ## Flow
//! ```text
//! validate (wallet → recipient → amount)
//!    ↓
//! nonce (hash-chain only)
//!    ↓
//! KeyScheme::sign
//!    ↓
//! SignedTransaction { wire_body(), endpoint() }
//! ```

use serde::Serialize;
use tracing::info;

use crate::core::domain::{Amount, SchemeId, Wallet};
use crate::core::errors::WalletError;
use crate::core::nonce::NonceSource;
use crate::crypto::scheme::{scheme_for, SigningPayload};

/// A signed outbound transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    scheme: SchemeId,
    from: String,
    to: String,
    amount: Amount,
    nonce: Option<u64>,
    signature: String,
    public_key: String,
}

/// JSON body for the node's submission endpoints.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum WireBody<'a> {
    /// `POST /transfer`
    Transfer {
        from: &'a str,
        to: &'a str,
        amount: Amount,
        signature: &'a str,
        public_key: &'a str,
    },
    /// `POST /send`
    Send {
        from: &'a str,
        to: &'a str,
        amount: Amount,
        nonce: u64,
        public_key: &'a str,
        signature: &'a str,
    },
}

impl SignedTransaction {
    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The payload the signature commits to.
    pub fn signing_payload(&self) -> SigningPayload<'_> {
        SigningPayload::new(&self.from, &self.to, self.amount, self.nonce)
    }

    /// Node path this transaction is submitted to.
    pub fn endpoint(&self) -> &'static str {
        match self.nonce {
            Some(_) => "/send",
            None => "/transfer",
        }
    }

    /// Exactly the fields the node expects for this transaction's endpoint.
    pub fn wire_body(&self) -> WireBody<'_> {
        match self.nonce {
            Some(nonce) => WireBody::Send {
                from: &self.from,
                to: &self.to,
                amount: self.amount,
                nonce,
                public_key: &self.public_key,
                signature: &self.signature,
            },
            None => WireBody::Transfer {
                from: &self.from,
                to: &self.to,
                amount: self.amount,
                signature: &self.signature,
                public_key: &self.public_key,
            },
        }
    }
}

/// Pure transaction builder over an injected nonce source.
pub struct TransactionBuilder<'a> {
    nonce_source: &'a dyn NonceSource,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(nonce_source: &'a dyn NonceSource) -> Self {
        Self { nonce_source }
    }

    /// Validates, signs and assembles a transaction.
    ///
    /// # Errors
    /// - `NoActiveWallet` when `wallet` is `None`
    /// - `InvalidRecipient` for an empty recipient
    /// - `InvalidAmount` for zero or negative amounts
    /// - `SigningFailure` when the scheme cannot sign
    ///
    /// All validation happens before any signing.
    pub fn build(
        &self,
        wallet: Option<&Wallet>,
        recipient: &str,
        amount: Amount,
    ) -> Result<SignedTransaction, WalletError> {
        let wallet = wallet.ok_or(WalletError::NoActiveWallet)?;

        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(WalletError::InvalidRecipient("recipient address is empty".into()));
        }
        if !amount.is_positive() {
            return Err(WalletError::InvalidAmount(format!(
                "amount must be greater than zero, got {}",
                amount
            )));
        }

        // Asymmetric payloads carry no nonce: `from->to:amount` only.
        let nonce = match wallet.scheme {
            SchemeId::HashChain => Some(self.nonce_source.next_nonce()?),
            SchemeId::Asymmetric => None,
        };

        let payload = SigningPayload::new(&wallet.address, recipient, amount, nonce);
        let signature = scheme_for(wallet.scheme).sign(wallet, &payload)?;

        info!(
            from = %wallet.address,
            to = %recipient,
            amount = %amount,
            scheme = %wallet.scheme,
            "Transaction signed"
        );

        Ok(SignedTransaction {
            scheme: wallet.scheme,
            from: wallet.address.clone(),
            to: recipient.to_string(),
            amount,
            nonce,
            signature,
            public_key: wallet.public_key.clone(),
        })
    }

    /// Same as [`build`](Self::build) with the amount given as user text.
    pub fn build_from_str(
        &self,
        wallet: Option<&Wallet>,
        recipient: &str,
        amount: &str,
    ) -> Result<SignedTransaction, WalletError> {
        let amount: Amount = amount.parse()?;
        self.build(wallet, recipient, amount)
    }
}
