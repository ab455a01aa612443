//! A fixed RSA key pair for signing ID tokens in tests.
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, jwk::JwkSet};
use serde::Serialize;

/// Key id of the test signing key.
pub const TEST_KID: &str = "test-key";

const TEST_RSA_PRIVATE_KEY: &str = include_str!("testdata/rsa_private.pem");

const TEST_RSA_MODULUS: &str = "vXFVf5kzhVqyNEt-G_zyKIH0gufyZcsrxTtGEMPvqu5tLpLiMkfGFNeru93gLrf0qUfDMXHMxITK3_0s1vbDmqOMlioHuheFs4-oqc12dwb9_ygcwdJuVUhPTh3Bver8Gj7vT-xgoniXswG4SnuemPw-5lfNHu8Ddq2DlOtncCzEIhqnp5Xridzmxrppoj66UasoMbs5Exls6e34u82T3-8cjzRJt4Yr95oMYL8elFh2zW_HWcAzxJExcbNscZFFFLvvCPnXwSpIvwdQzM_l0QS8GUyRG5FFJsh-S7VEqXpqRRerLwC9JUYBLjGk8scg-XYN0jtDeJ80kztEUnf_Nw";

/// JWKS containing only the public half of the test key.
pub fn test_jwks() -> JwkSet {
    serde_json::from_value(serde_json::json!({
        "keys": [{
            "kty": "RSA",
            "kid": TEST_KID,
            "use": "sig",
            "alg": "RS256",
            "n": TEST_RSA_MODULUS,
            "e": "AQAB",
        }]
    }))
    .expect("valid test jwks")
}

/// Signs `claims` with the test key using RS256.
pub fn sign_rs256<T: Serialize>(claims: &T, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(TEST_RSA_PRIVATE_KEY.as_bytes()).expect("valid test key");
    encode(&header, claims, &key).expect("failed to sign test token")
}
