//! Consent token generation.
//!
//! Tokens are the sole external reference to a grant, so they must be
//! unguessable: 32 bytes of OS randomness, URL-safe base64. Collision
//! probability in that space is negligible; no uniqueness retry loop.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::ConsentToken;

pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> ConsentToken;
}

/// Cryptographically random, URL-safe token generator.
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> ConsentToken {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        ConsentToken::new(URL_SAFE_NO_PAD.encode(bytes))
    }
}

/// Deterministic generator for tests.
pub struct SequenceTokenGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceTokenGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl TokenGenerator for SequenceTokenGenerator {
    fn generate(&self) -> ConsentToken {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ConsentToken::new(format!("{}-{}", self.prefix, n))
    }
}
