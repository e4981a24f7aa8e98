//! Partner API key material. Generated exactly once at registration.

use rand::RngCore;

/// Readable lookup key, `pk_` + 16 random bytes hex.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("pk_{}", hex::encode(bytes))
}

/// Shared secret, 32 random bytes hex. Returned to the partner once, at
/// registration, and never echoed back afterwards.
pub fn generate_api_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
