use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::WalletError;
use crate::security::redaction::redact_key;
use crate::security::secret::SecretString;

/// Key-derivation and signing family a wallet belongs to.
///
/// Chosen once when the wallet is created or imported and persisted with the
/// wallet record; every later operation dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemeId {
    /// secp256k1 keypair, ECDSA signatures (scheme A).
    #[default]
    Asymmetric,
    /// Hash-chain keys, keyed-hash signatures (scheme B).
    HashChain,
}

impl SchemeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeId::Asymmetric => "asymmetric",
            SchemeId::HashChain => "hash_chain",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "asymmetric" | "secp256k1" | "ecdsa" => Ok(SchemeId::Asymmetric),
            "b" | "hash_chain" | "hash-chain" | "hashchain" => Ok(SchemeId::HashChain),
            other => Err(WalletError::ConfigError(format!("Unknown wallet scheme: {}", other))),
        }
    }
}

/// Decimal coin amount.
///
/// The canonical string form (see [`Amount::canonical`]) is what goes into
/// every signed payload and every derived transaction id, so it must match
/// the node's own formatting exactly. On the wire the amount is a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// The `f64` this amount travels as on the wire.
    pub fn as_f64(&self) -> f64 {
        self.0
            .to_string()
            .parse::<f64>()
            .ok()
            .or_else(|| self.0.to_f64())
            .unwrap_or_default()
    }

    /// The wire float rendered the way the node renders it when it rebuilds
    /// the signed message: shortest round-trip digits, a trailing `.0` for
    /// integral values, and exponent form below `1e-4` or from `1e16` up.
    /// `10` → `10.0`, `10.50` → `10.5`, `0.00001` → `1e-05`, `1e16` → `1e+16`.
    pub fn canonical(&self) -> String {
        float_repr(self.as_f64())
    }
}

fn float_repr(value: f64) -> String {
    // `{:e}` yields the shortest round-trip mantissa, e.g. `1.5e16` or `1e-5`.
    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or_default()),
        None => (sci.as_str(), 0),
    };
    if !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }
    let fixed = value.to_string();
    if fixed.contains('.') {
        fixed
    } else {
        format!("{}.0", fixed)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Amount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(WalletError::InvalidAmount("amount is empty".into()));
        }
        Decimal::from_str(trimmed)
            .map(Amount)
            .map_err(|e| WalletError::InvalidAmount(format!("'{}' is not a number: {}", trimmed, e)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts JSON numbers as well as numeric strings.
        <Decimal as Deserialize>::deserialize(deserializer).map(Amount)
    }
}

/// The single active wallet of this device.
///
/// `public_key` is always derived from `private_key` under `scheme`. The
/// address is derived from the public key, except for asymmetric imports
/// where the caller supplied an address explicitly.
#[derive(Clone)]
pub struct Wallet {
    pub scheme: SchemeId,
    pub address: String,
    pub public_key: String,
    private_key: SecretString,
}

impl Wallet {
    pub fn from_parts(
        scheme: SchemeId,
        private_key: SecretString,
        public_key: String,
        address: String,
    ) -> Self {
        Self { scheme, address, public_key, private_key }
    }

    /// Hex private key. Only signing and explicit user export should read this.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// Address shortened for display, e.g. `0f60da95...c18428`.
    pub fn short_address(&self) -> String {
        short_id(&self.address, 8, 6)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("scheme", &self.scheme)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &redact_key(&self.private_key))
            .finish()
    }
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.address == other.address
            && self.public_key == other.public_key
            && *self.private_key == *other.private_key
    }
}

/// `head...tail` shortening used for addresses and hashes in listings.
pub fn short_id(value: &str, head: usize, tail: usize) -> String {
    if value.len() <= head + tail || !value.is_ascii() {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

/// Formats `value` rounded to `dp` places with `,` thousands separators.
pub fn format_grouped(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp(dp);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_canonical_integral_gets_trailing_zero() {
        assert_eq!(Amount::new(dec("10")).canonical(), "10.0");
        assert_eq!(Amount::new(dec("10.000")).canonical(), "10.0");
    }

    #[test]
    fn test_canonical_strips_trailing_zeros() {
        assert_eq!(Amount::new(dec("10.50")).canonical(), "10.5");
        assert_eq!(Amount::new(dec("0.001")).canonical(), "0.001");
    }

    #[test]
    fn test_canonical_follows_wire_float_rendering() {
        assert_eq!(Amount::new(dec("0.00001")).canonical(), "1e-05");
        assert_eq!(Amount::new(dec("0.0001")).canonical(), "0.0001");
        assert_eq!(Amount::new(dec("10000000000000000")).canonical(), "1e+16");
        assert_eq!(Amount::new(dec("15000000000000000")).canonical(), "1.5e+16");
        assert_eq!(Amount::new(dec("1000000000000000")).canonical(), "1000000000000000.0");
        assert_eq!(Amount::new(dec("0.1234567890123456789")).canonical(), "0.12345678901234568");
    }

    #[test]
    fn test_canonical_matches_amount_sent_on_wire() {
        for text in ["0.00001", "0.1234567890123456789", "10000000000000000", "2.5", "7"] {
            let amount = Amount::new(dec(text));
            let wire: f64 = serde_json::from_str(&serde_json::to_string(&amount).unwrap()).unwrap();
            assert_eq!(float_repr(wire), amount.canonical(), "{}", text);
        }
    }

    #[test]
    fn test_amount_parse_rejects_garbage() {
        assert!(matches!("abc".parse::<Amount>(), Err(WalletError::InvalidAmount(_))));
        assert!(matches!("  ".parse::<Amount>(), Err(WalletError::InvalidAmount(_))));
        assert_eq!(" 2.5 ".parse::<Amount>().unwrap().canonical(), "2.5");
    }

    #[test]
    fn test_amount_json_number_roundtrip() {
        let a: Amount = serde_json::from_str("10").unwrap();
        assert_eq!(a.canonical(), "10.0");
        let b: Amount = serde_json::from_str("12.75").unwrap();
        assert_eq!(serde_json::to_string(&b).unwrap(), "12.75");
        let c: Amount = serde_json::from_str("\"3.5\"").unwrap();
        assert_eq!(c.canonical(), "3.5");
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("A".parse::<SchemeId>().unwrap(), SchemeId::Asymmetric);
        assert_eq!("hash-chain".parse::<SchemeId>().unwrap(), SchemeId::HashChain);
        assert!("rsa".parse::<SchemeId>().is_err());
    }

    #[test]
    fn test_wallet_debug_redacts_private_key() {
        let w = Wallet::from_parts(
            SchemeId::HashChain,
            Zeroizing::new("aa".repeat(32)),
            "pub".into(),
            "addr".into(),
        );
        let dbg = format!("{:?}", w);
        assert!(!dbg.contains(&"aa".repeat(32)));
        assert!(dbg.contains("addr"));
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(dec("1234567.891"), 2), "1,234,567.89");
        assert_eq!(format_grouped(dec("999"), 2), "999.00");
        assert_eq!(format_grouped(dec("0"), 2), "0.00");
        assert_eq!(format_grouped(dec("-1500.5"), 2), "-1,500.50");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdefXYZ", 8, 6), "01234567...defXYZ");
        assert_eq!(short_id("short", 8, 6), "short");
    }
}
