// Simple helpers to avoid accidental printing of secrets in logs/tests.

/// Placeholder for a hex private key that keeps only its length.
pub fn redact_key(key_hex: &str) -> String {
    format!("<redacted key len={}>", key_hex.len())
}

/// Keep at most `max` characters of a node response for error messages.
pub fn truncate_body(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max).collect();
    format!("{}... ({} bytes)", head, s.len())
}
