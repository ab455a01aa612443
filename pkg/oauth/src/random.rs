use base64::Engine as _;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use rand::Rng;

/// A source of cryptographically secure random values.
///
/// Use [`SecureRandom`] in production and `mock::MockRandom` in tests.
pub trait RandomSource: Send + Sync + 'static {
    /// Returns `num_bytes` random bytes encoded as base64-url without padding.
    fn base64_url(num_bytes: usize) -> String;
}

/// Thread-local CSPRNG from `rand`.
#[derive(Debug, Clone, Default)]
pub struct SecureRandom;

impl RandomSource for SecureRandom {
    fn base64_url(num_bytes: usize) -> String {
        let mut rng = rand::rng();
        let random_bytes: Vec<u8> = (0..num_bytes).map(|_| rng.random()).collect();
        BASE64_URL_SAFE_NO_PAD.encode(&random_bytes)
    }
}
