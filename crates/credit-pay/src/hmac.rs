use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Derive the signing key for a merchant token: `hex(SHA256(token))`.
///
/// The gateway keys its HMAC with the ASCII hex text, not the raw digest,
/// so callers pass the returned string's bytes straight to [`compute_hmac`].
pub fn derive_secret_key(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Compute HMAC-SHA256 over `message` using `key`.
/// Returns the lowercase hex-encoded MAC.
pub fn compute_hmac(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded HMAC-SHA256 signature over `message`.
///
/// Comparison is constant-time. Hex of the wrong length or with non-hex
/// characters is compared against zeros rather than rejected early.
pub fn verify_hmac(key: &[u8], message: &[u8], signature: &str) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);

    let expected = hex::decode(signature.trim()).unwrap_or_else(|_| vec![0u8; 32]);
    mac.verify_slice(&expected).is_ok()
}
