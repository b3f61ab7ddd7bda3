//! Share-link secret generation and hashing.
//!
//! The plaintext secret exists only in the issuance response (and the CLI
//! printout); storage only ever sees the SHA-256 digest. Format:
//! 64 lowercase hex chars (256 random bits).

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Length of the plaintext secret in hex characters.
pub const SECRET_HEX_LEN: usize = 64;

/// Generate a fresh 256-bit secret as 64 lowercase hex chars.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 digest of the plaintext secret, lowercase hex. This is the storage
/// key for token lookup.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the buyer-facing share URL for a product and secret.
/// Pattern: `{base}/p/{product_id}?token={secret}`.
pub fn share_url(public_base_url: &str, product_id: uuid::Uuid, secret: &str) -> String {
    format!(
        "{}/p/{}?token={}",
        public_base_url.trim_end_matches('/'),
        product_id,
        secret
    )
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_64_hex_chars() {
        let s = generate_secret();
        assert_eq!(s.len(), SECRET_HEX_LEN);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_secrets_are_unique_across_calls() {
        // 256-bit collisions are cryptographically negligible; two draws
        // matching would mean a broken RNG.
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic_and_not_the_secret() {
        let s = generate_secret();
        let h1 = hash_secret(&s);
        let h2 = hash_secret(&s);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, s);
    }

    #[test]
    fn test_share_url_shape() {
        let pid = uuid::Uuid::parse_str("11111111-2222-3333-4444-555555555555").unwrap();
        let url = share_url("https://app.pitchivo.com/", pid, "deadbeef");
        assert_eq!(
            url,
            "https://app.pitchivo.com/p/11111111-2222-3333-4444-555555555555?token=deadbeef"
        );
    }
}
