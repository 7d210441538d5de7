//! # Unsigned Tokens
//!
//! Builds compact tokens for tests. The signature segment is a placeholder:
//! the decoder never looks at it.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::Value;

const HEADER: &[u8] = br#"{"alg":"ES256K","typ":"JWT"}"#;

/// Encode `claims` as the payload of a compact `header.payload.signature`
/// token.
#[must_use]
pub fn encode(claims: &Value) -> String {
    let header = Base64UrlUnpadded::encode_string(HEADER);
    let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
    format!("{header}.{payload}.bm90LWEtc2lnbmF0dXJl")
}

/// A diploma credential for `subject`, as a university might issue it.
#[must_use]
pub fn diploma(subject: &str) -> String {
    encode(&serde_json::json!({
        "iss": "did:web:alphabeta.university",
        "sub": subject,
        "nbf": 1_700_000_000,
        "vc": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential", "DiplomaCredential"],
            "credentialSubject": {
                "id": subject,
                "degree": {"type": "BachelorDegree", "name": "Sistemas de Informação"}
            }
        }
    }))
}
