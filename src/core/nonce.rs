//! Nonce sources
//!
//! Hash-chain transactions carry a nonce seeded from the wall clock in
//! milliseconds. The source is injected so tests can pin it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::core::errors::WalletError;

/// Produces nonces for outbound transactions.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Result<u64, WalletError>;
}

/// Milliseconds since the Unix epoch, forced strictly increasing so two
/// transactions built within the same millisecond still differ.
#[derive(Debug, Default)]
pub struct TimeNonce {
    last: AtomicU64,
}

impl TimeNonce {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_millis() -> Result<u64, WalletError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WalletError::SigningFailure(format!("system clock before epoch: {}", e)))?;
        u64::try_from(elapsed.as_millis())
            .map_err(|_| WalletError::SigningFailure("system clock out of range".into()))
    }
}

impl NonceSource for TimeNonce {
    fn next_nonce(&self) -> Result<u64, WalletError> {
        let now = Self::now_millis()?;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > current {
                now
            } else {
                // ✅ overflow check
                current.checked_add(1).ok_or_else(|| {
                    WalletError::SigningFailure("nonce overflow".into())
                })?
            };
            match self.last.compare_exchange_weak(current, candidate, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => {
                    debug!(nonce = candidate, "Issued time nonce");
                    return Ok(candidate);
                }
                Err(observed) => current = observed,
            }
        }
    }
}

/// Always returns the same nonce. Used for deterministic construction.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub u64);

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> Result<u64, WalletError> {
        Ok(self.0)
    }
}
