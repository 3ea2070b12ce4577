//! Small helpers and aliases for secret buffers that must be zeroized on drop.
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

/// Hex-encoded secret string which will be zeroed when dropped.
pub type SecretString = Zeroizing<String>;

/// Fill `N` bytes from the operating system CSPRNG and return them hex-encoded.
pub fn random_secret_hex<const N: usize>() -> SecretString {
    let mut bytes = Zeroizing::new([0u8; N]);
    OsRng.fill_bytes(bytes.as_mut());
    Zeroizing::new(hex::encode(bytes.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_hex_shape() {
        let a = random_secret_hex::<32>();
        let b = random_secret_hex::<32>();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(*a, *b);
    }
}
