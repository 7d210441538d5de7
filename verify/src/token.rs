//! # Token Decoder
//!
//! Decodes the payload of compact signed credential tokens
//! (`header.payload.signature`) into their claims.
//!
//! Decoding is purely structural. The signature, expiry, and issuer are not
//! checked here: trust decisions belong to the verification backend, which
//! has already verified a presentation before it is reported as `verified`.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;
use crate::error::malformed;
use crate::types::VpToken;

/// Token claims: string keys with arbitrary JSON values.
pub type Claims = Map<String, Value>;

/// Decode the payload segment of a compact token into its claims.
///
/// An absent or empty token decodes to `None`; callers treat a missing
/// token as a no-op.
///
/// # Errors
///
/// Returns `Error::MalformedToken` if the token has fewer than two
/// `.`-separated segments, the payload is not valid base64url, or the payload
/// is not a JSON object.
pub fn decode(token: Option<&str>) -> Result<Option<Claims>, Error> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let mut segments = token.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(malformed!("expected at least 2 segments"));
    };

    // accept standard-alphabet and padded payloads as well as strict base64url
    let payload = payload.trim_end_matches('=').replace('+', "-").replace('/', "_");
    let bytes = Base64UrlUnpadded::decode_vec(&payload)
        .map_err(|e| malformed!("payload is not base64url: {}", e))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Ok(Some(claims)),
        Ok(_) => Err(malformed!("payload is not a JSON object")),
        Err(e) => Err(malformed!("payload is not JSON: {}", e)),
    }
}

/// How to treat malformed tokens when decoding a presentation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Report malformed tokens and keep decoding the rest.
    #[default]
    Lenient,

    /// Fail on the first malformed token.
    Strict,
}

/// A token that could not be decoded.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Malformed {
    /// Position of the token in the presentation.
    pub index: usize,

    /// Why decoding failed.
    pub reason: String,
}

/// A presentation decoded into credential claims.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Presentation {
    /// Decoded credential claims, in the order received. Duplicates are kept.
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<Claims>,

    /// Tokens that could not be decoded (lenient mode only).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub malformed: Vec<Malformed>,
}

impl VpToken {
    /// Decode every credential token in the presentation.
    ///
    /// Empty tokens are skipped.
    ///
    /// # Errors
    ///
    /// In `Strict` mode, returns `Error::MalformedToken` for the first token
    /// that cannot be decoded. `Lenient` mode does not fail.
    pub fn decode(&self, mode: DecodeMode) -> Result<Presentation, Error> {
        let mut presentation = Presentation::default();

        for (index, token) in self.verifiable_credential.iter().enumerate() {
            match decode(Some(token)) {
                Ok(Some(claims)) => presentation.verifiable_credential.push(claims),
                Ok(None) => {}
                Err(e) if mode == DecodeMode::Strict => {
                    return Err(malformed!("token {}: {}", index, e.description()));
                }
                Err(e) => {
                    tracing::warn!(index, "skipping malformed credential token: {}", e.description());
                    presentation.malformed.push(Malformed {
                        index,
                        reason: e.description().to_string(),
                    });
                }
            }
        }

        Ok(presentation)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn encode(claims: &Value) -> String {
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"ES256","typ":"JWT"}"#);
        let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_payload() {
        let claims = json!({
            "iss": "did:web:university.example",
            "vc": {"type": ["VerifiableCredential", "UniversityDegree"]},
            "nbf": 1_700_000_000
        });
        let decoded = decode(Some(&encode(&claims))).expect("should decode").expect("has claims");
        assert_eq!(Value::Object(decoded), claims);
    }

    #[test]
    fn absent_token() {
        assert_eq!(decode(None).expect("no error"), None);
        assert_eq!(decode(Some("")).expect("no error"), None);
    }

    #[test]
    fn single_segment() {
        assert!(matches!(decode(Some("onlyonepart")), Err(Error::MalformedToken(_))));
    }

    #[test]
    fn two_segments_suffice() {
        let payload = Base64UrlUnpadded::encode_string(br#"{"sub":"alice"}"#);
        let claims = decode(Some(&format!("e30.{payload}"))).expect("should decode").expect("claims");
        assert_eq!(claims["sub"], "alice");
    }

    #[test]
    fn bad_base64() {
        assert!(matches!(decode(Some("e30.!!!!.sig")), Err(Error::MalformedToken(_))));
    }

    #[test]
    fn not_an_object() {
        let payload = Base64UrlUnpadded::encode_string(b"[1,2,3]");
        assert!(matches!(decode(Some(&format!("e30.{payload}.x"))), Err(Error::MalformedToken(_))));
    }

    // Payloads containing several '-' and '_' characters decode correctly.
    #[test]
    fn every_url_safe_char() {
        let claims = json!({"name": "??????>>>>>>", "bytes": "\u{00fb}\u{00ff}\u{00fe}"});
        let token = encode(&claims);
        let payload = token.split('.').nth(1).unwrap();
        assert!(payload.matches(|c: char| c == '-' || c == '_').count() > 1);

        let decoded = decode(Some(&token)).expect("should decode").expect("claims");
        assert_eq!(Value::Object(decoded), claims);
    }

    #[test]
    fn padded_payload() {
        let payload = base64ct::Base64Url::encode_string(br#"{"a":1}"#);
        assert!(payload.ends_with('='));
        let claims = decode(Some(&format!("e30.{payload}.x"))).expect("should decode").expect("claims");
        assert_eq!(claims["a"], 1);
    }

    #[test]
    fn lenient_presentation() {
        let first = encode(&json!({"n": 1}));
        let vp: VpToken = [first.as_str(), "garbage", first.as_str()].into_iter().collect();

        let presentation = vp.decode(DecodeMode::Lenient).expect("lenient never fails");
        assert_eq!(presentation.verifiable_credential.len(), 2, "duplicates are kept");
        assert_eq!(presentation.malformed.len(), 1);
        assert_eq!(presentation.malformed[0].index, 1);
    }

    #[test]
    fn strict_presentation() {
        let vp: VpToken = [encode(&json!({"n": 1})), "garbage".to_string()].into_iter().collect();
        let err = vp.decode(DecodeMode::Strict).expect_err("should fail");
        assert!(matches!(err, Error::MalformedToken(d) if d.starts_with("token 1")));
    }
}
