//! # Token Status List
//!
//! The IETF/OAuth status list convention: 1, 2, 4, or 8 bits per referenced
//! token, packed and zlib-compressed into the `status_list` claim of a
//! status list token. The token is secured as a compact JWT
//! (`statuslist+jwt`) or as a CWT (`statuslist+cwt`, `COSE_Sign1`).
//!
//! [Token Status List](https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/)

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use coset::cbor::value::Value;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::bitstring::{BitsPerStatus, BitString};
use crate::cose;
use crate::error::{Error, Result};
use crate::jose;
use crate::provider::Signer;
use crate::service::ProofFormat;

/// Default number of entries in a token status list.
pub const DEFAULT_LIST_LENGTH: usize = 250_000;

/// Default status code width: 2 bits cover valid, invalid, and suspended.
pub const DEFAULT_BITS_PER_STATUS: BitsPerStatus = BitsPerStatus::Two;

/// The `typ` value of a status list token secured as a CWT.
pub const CWT_TYP: &str = "statuslist+cwt";

/// CWT claim key for the issuer.
const CWT_CLAIM_ISS: i64 = 1;
/// CWT claim key for the subject (the status list URI).
const CWT_CLAIM_SUB: i64 = 2;
/// CWT claim key for the expiry time.
const CWT_CLAIM_EXP: i64 = 4;
/// CWT claim key for the issued-at time.
const CWT_CLAIM_IAT: i64 = 6;
/// CWT claim key for the status list, per the Token Status List registry.
const CWT_CLAIM_STATUS_LIST: i64 = 65533;

/// Status codes for a token status list entry.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Serialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusOAuth {
    /// The referenced token is valid.
    #[default]
    Valid = 0x00,

    /// The referenced token is revoked.
    Invalid = 0x01,

    /// The referenced token is temporarily suspended.
    Suspended = 0x02,
}

/// The `status_list` claim of a status list token: the code width and the
/// compressed, encoded status values.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusListClaim {
    /// Number of bits per referenced token in the compressed byte array.
    pub bits: BitsPerStatus,

    /// The status values for all referenced tokens, as a base64url-encoded
    /// zlib-compressed byte array.
    pub lst: String,
}

impl StatusListClaim {
    /// Build the claim from an in-memory status list.
    ///
    /// # Errors
    ///
    /// Returns an error if compression fails.
    pub fn from_list(list: &BitString) -> Result<Self> {
        Ok(Self {
            bits: list.bits_per_status(),
            lst: Base64UrlUnpadded::encode_string(&list.compress()?),
        })
    }

    /// Expand the claim back into an in-memory status list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `lst` is not base64url zlib data.
    pub fn to_list(&self) -> Result<BitString> {
        let compressed = Base64UrlUnpadded::decode_vec(&self.lst)
            .map_err(|e| Error::Validation(format!("status list is not valid base64url: {e}")))?;
        BitString::decompress(&compressed, self.bits)
    }
}

/// Claims of a status list token secured as a JWT.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StatusListClaims {
    /// The token issuer.
    pub iss: String,

    /// The URI of the status list token.
    pub sub: String,

    /// The time of issue.
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,

    /// The time at which the token expires.
    #[serde(with = "ts_seconds_option")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exp: Option<DateTime<Utc>>,

    /// The status list itself.
    pub status_list: StatusListClaim,
}

/// A freshly signed status list token plus its encoded list.
#[derive(Clone, Debug)]
pub struct SignedList {
    /// The signed envelope: a compact JWT, or a base64url-encoded
    /// `COSE_Sign1` for the CWT form.
    pub status_list_credential: String,

    /// The base64url-encoded compressed status values.
    pub encoded_list: String,
}

/// A status list recovered from a signed status list token. Decoding does
/// not verify the signature.
#[derive(Clone, Debug)]
pub struct DecodedToken {
    /// The expanded status list.
    pub list: BitString,

    /// The base64url-encoded compressed status values, as carried by the
    /// token.
    pub encoded_list: String,

    /// The token issuer.
    pub issuer: String,

    /// The status list URI.
    pub id: String,

    /// The token expiry, when declared.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Produce a status list token secured as a compact JWT.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the signing capability fails, propagated
/// unchanged.
pub async fn create_signed_jwt(
    list: &BitString, issuer: &str, id: &str, expires_at: Option<DateTime<Utc>>,
    signer: &impl Signer,
) -> Result<SignedList> {
    tracing::debug!("token::create_signed_jwt");

    let status_list = StatusListClaim::from_list(list)?;
    let encoded_list = status_list.lst.clone();

    let claims = StatusListClaims {
        iss: issuer.into(),
        sub: id.into(),
        iat: Utc::now(),
        exp: expires_at,
        status_list,
    };
    let jwt = jose::encode(jose::Type::StatusList, &claims, signer).await?;

    Ok(SignedList {
        status_list_credential: jwt,
        encoded_list,
    })
}

/// Recover the status list from a compact status list JWT, without
/// verifying the signature.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the token is malformed or is not a
/// `statuslist+jwt`.
pub fn decode_status_list_jwt(token: &str) -> Result<DecodedToken> {
    let jwt: jose::Jwt<StatusListClaims> = jose::decode(token)?;
    if jwt.header.typ != jose::Type::StatusList {
        return Err(Error::Validation("token is not a status list JWT".into()));
    }

    let list = jwt.claims.status_list.to_list()?;
    Ok(DecodedToken {
        list,
        encoded_list: jwt.claims.status_list.lst,
        issuer: jwt.claims.iss,
        id: jwt.claims.sub,
        expires_at: jwt.claims.exp,
    })
}

/// Produce a status list token secured as a CWT (`COSE_Sign1`), returned as
/// a base64url-encoded string.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the signing capability fails, propagated
/// unchanged.
pub async fn create_signed_cwt(
    list: &BitString, issuer: &str, id: &str, expires_at: Option<DateTime<Utc>>,
    signer: &impl Signer,
) -> Result<SignedList> {
    tracing::debug!("token::create_signed_cwt");

    let compressed = list.compress()?;

    let mut claims: Vec<(Value, Value)> = vec![
        (Value::Integer(CWT_CLAIM_ISS.into()), Value::Text(issuer.into())),
        (Value::Integer(CWT_CLAIM_SUB.into()), Value::Text(id.into())),
        (Value::Integer(CWT_CLAIM_IAT.into()), Value::Integer(Utc::now().timestamp().into())),
    ];
    if let Some(expires) = expires_at {
        claims.push((
            Value::Integer(CWT_CLAIM_EXP.into()),
            Value::Integer(expires.timestamp().into()),
        ));
    }
    claims.push((
        Value::Integer(CWT_CLAIM_STATUS_LIST.into()),
        Value::Map(vec![
            (
                Value::Text("bits".into()),
                Value::Integer(i64::from(list.bits_per_status().bits()).into()),
            ),
            (Value::Text("lst".into()), Value::Bytes(compressed.clone())),
        ]),
    ));

    let payload = cose::to_vec(&Value::Map(claims))
        .map_err(|e| Error::Validation(format!("failed to serialize CWT claims: {e}")))?;
    let cose_sign_1 = cose::sign1(payload, CWT_TYP, signer).await?;
    let bytes = cose::sign1_to_vec(cose_sign_1)?;

    Ok(SignedList {
        status_list_credential: Base64UrlUnpadded::encode_string(&bytes),
        encoded_list: Base64UrlUnpadded::encode_string(&compressed),
    })
}

/// Recover the status list from a base64url-encoded status list CWT,
/// without verifying the signature.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the input is not a well-formed CWT or
/// its claim map lacks the status list.
pub fn decode_status_list_cwt(credential: &str) -> Result<DecodedToken> {
    let bytes = Base64UrlUnpadded::decode_vec(credential)
        .map_err(|e| Error::Validation(format!("CWT is not valid base64url: {e}")))?;
    let cose_sign_1 = cose::parse_sign1(&bytes)?;

    let payload =
        cose_sign_1.payload.ok_or_else(|| Error::Validation("CWT has no payload".into()))?;
    let value: Value = cose::from_slice(&payload)
        .map_err(|e| Error::Validation(format!("CWT payload is not valid CBOR: {e}")))?;
    let Value::Map(entries) = value else {
        return Err(Error::Validation("CWT payload is not a claim map".into()));
    };

    let issuer = claim(&entries, CWT_CLAIM_ISS)
        .and_then(Value::as_text)
        .ok_or_else(|| Error::Validation("CWT has no iss claim".into()))?
        .to_string();
    let id = claim(&entries, CWT_CLAIM_SUB)
        .and_then(Value::as_text)
        .ok_or_else(|| Error::Validation("CWT has no sub claim".into()))?
        .to_string();
    let expires_at = claim(&entries, CWT_CLAIM_EXP)
        .and_then(Value::as_integer)
        .and_then(|i| i64::try_from(i).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let Some(Value::Map(status_list)) = claim(&entries, CWT_CLAIM_STATUS_LIST) else {
        return Err(Error::Validation("CWT has no status_list claim".into()));
    };

    let bits = status_list
        .iter()
        .find_map(|(k, v)| (k.as_text() == Some("bits")).then_some(v))
        .and_then(Value::as_integer)
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| Error::Validation("status_list claim has no bits".into()))?;
    let bits = match bits {
        1 => BitsPerStatus::One,
        2 => BitsPerStatus::Two,
        4 => BitsPerStatus::Four,
        8 => BitsPerStatus::Eight,
        other => {
            return Err(Error::Validation(format!("invalid bits value {other} in status_list")))
        }
    };

    let compressed = status_list
        .iter()
        .find_map(|(k, v)| (k.as_text() == Some("lst")).then_some(v))
        .and_then(Value::as_bytes)
        .ok_or_else(|| Error::Validation("status_list claim has no lst".into()))?;

    let list = BitString::decompress(compressed, bits)?;

    Ok(DecodedToken {
        list,
        encoded_list: Base64UrlUnpadded::encode_string(compressed),
        issuer,
        id,
        expires_at,
    })
}

fn claim<'a>(entries: &'a [(Value, Value)], key: i64) -> Option<&'a Value> {
    entries
        .iter()
        .find_map(|(k, v)| (k.as_integer() == Some(key.into())).then_some(v))
}

/// Classify an opaque status list credential string by structural shape:
/// three dot-separated base64url segments with a JSON header make a JWT;
/// base64url bytes parsing as `COSE_Sign1` make a CWT.
///
/// This is a heuristic over the string's shape, not a declared type field.
/// Input that fits neither shape fails hard with no fallback guess.
///
/// # Errors
///
/// Returns [`Error::UnrecognizedEnvelope`] when the input cannot be
/// classified.
pub fn determine_proof_format(credential: &str) -> Result<ProofFormat> {
    if credential.is_empty() {
        return Err(Error::UnrecognizedEnvelope("empty credential string".into()));
    }

    let parts: Vec<&str> = credential.split('.').collect();
    if parts.len() == 3 {
        let header_is_json = Base64UrlUnpadded::decode_vec(parts[0])
            .ok()
            .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
            .is_some_and(|header| header.get("alg").is_some());
        if header_is_json {
            return Ok(ProofFormat::Jwt);
        }
        return Err(Error::UnrecognizedEnvelope(
            "three-segment input without a JOSE header".into(),
        ));
    }

    let Ok(bytes) = Base64UrlUnpadded::decode_vec(credential) else {
        return Err(Error::UnrecognizedEnvelope(
            "input is neither a compact JWT nor base64url CBOR".into(),
        ));
    };
    if cose::parse_sign1(&bytes).is_ok() {
        return Ok(ProofFormat::Cbor);
    }

    Err(Error::UnrecognizedEnvelope("bytes do not parse as COSE_Sign1".into()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct NullSigner;

    impl Signer for NullSigner {
        async fn try_sign(&self, _msg: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(vec![0; 64])
        }

        async fn public_key(&self) -> anyhow::Result<Vec<u8>> {
            Ok(vec![0; 32])
        }

        fn algorithm(&self) -> crate::provider::Algorithm {
            crate::provider::Algorithm::EdDSA
        }

        fn verification_method(&self) -> String {
            "did:example:issuer#key-1".into()
        }
    }

    #[test]
    fn status_list_claim_roundtrip() {
        let mut list = BitString::new(1000, BitsPerStatus::Two);
        list.set(5, StatusOAuth::Suspended as u8).unwrap();

        let claim = StatusListClaim::from_list(&list).expect("should encode");
        assert_eq!(claim.bits, BitsPerStatus::Two);

        let expanded = claim.to_list().expect("should decode");
        assert_eq!(expanded, list);
    }

    #[test]
    fn claims_serialize_to_registered_names() {
        let list = BitString::new(8, BitsPerStatus::One);
        let claims = StatusListClaims {
            iss: "did:example:issuer".into(),
            sub: "https://example.com/statuslists/1".into(),
            iat: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            exp: None,
            status_list: StatusListClaim::from_list(&list).unwrap(),
        };

        let json = serde_json::to_value(&claims).expect("should serialize");
        assert_eq!(json["iss"], json!("did:example:issuer"));
        assert_eq!(json["sub"], json!("https://example.com/statuslists/1"));
        assert_eq!(json["iat"], json!(1_700_000_000));
        assert_eq!(json["status_list"]["bits"], json!(1));
        assert!(json.get("exp").is_none());
    }

    #[tokio::test]
    async fn jwt_roundtrip() {
        let mut list = BitString::new(1000, BitsPerStatus::Two);
        list.set(4, StatusOAuth::Invalid as u8).unwrap();

        let signed = create_signed_jwt(
            &list,
            "did:example:issuer",
            "https://example.com/statuslists/1",
            None,
            &NullSigner,
        )
        .await
        .expect("should sign");

        let decoded = decode_status_list_jwt(&signed.status_list_credential).expect("should decode");
        assert_eq!(decoded.issuer, "did:example:issuer");
        assert_eq!(decoded.id, "https://example.com/statuslists/1");
        assert_eq!(decoded.encoded_list, signed.encoded_list);
        assert_eq!(decoded.list.get(4).unwrap(), StatusOAuth::Invalid as u8);
        assert_eq!(decoded.list.get(3).unwrap(), StatusOAuth::Valid as u8);
    }

    #[tokio::test]
    async fn cwt_roundtrip() {
        let mut list = BitString::new(1000, BitsPerStatus::Two);
        list.set(5, StatusOAuth::Suspended as u8).unwrap();
        let expires = DateTime::from_timestamp(1_735_689_600, 0).unwrap();

        let signed = create_signed_cwt(
            &list,
            "did:example:issuer",
            "https://example.com/statuslists/1",
            Some(expires),
            &NullSigner,
        )
        .await
        .expect("should sign");

        let decoded = decode_status_list_cwt(&signed.status_list_credential).expect("should decode");
        assert_eq!(decoded.issuer, "did:example:issuer");
        assert_eq!(decoded.id, "https://example.com/statuslists/1");
        assert_eq!(decoded.expires_at, Some(expires));
        assert_eq!(decoded.list.get(5).unwrap(), StatusOAuth::Suspended as u8);
        assert_eq!(decoded.list.get(4).unwrap(), StatusOAuth::Valid as u8);
    }

    #[tokio::test]
    async fn detect_formats() {
        let list = BitString::new(8, BitsPerStatus::One);

        let jwt = create_signed_jwt(&list, "did:example:issuer", "id", None, &NullSigner)
            .await
            .unwrap();
        assert!(matches!(
            determine_proof_format(&jwt.status_list_credential),
            Ok(ProofFormat::Jwt)
        ));

        let cwt = create_signed_cwt(&list, "did:example:issuer", "id", None, &NullSigner)
            .await
            .unwrap();
        assert!(matches!(
            determine_proof_format(&cwt.status_list_credential),
            Ok(ProofFormat::Cbor)
        ));
    }

    #[test]
    fn detect_rejects_malformed() {
        // empty input
        assert!(matches!(
            determine_proof_format(""),
            Err(Error::UnrecognizedEnvelope(_))
        ));
        // two dotted segments
        assert!(matches!(
            determine_proof_format("eyJhbGciOiJFZERTQSJ9.eyJzdWIiOiJ4In0"),
            Err(Error::UnrecognizedEnvelope(_))
        ));
        // four dotted segments
        assert!(matches!(
            determine_proof_format("a.b.c.d"),
            Err(Error::UnrecognizedEnvelope(_))
        ));
        // three segments but the header is not JSON
        assert!(matches!(
            determine_proof_format("AAAA.BBBB.CCCC"),
            Err(Error::UnrecognizedEnvelope(_))
        ));
        // base64url bytes that are not COSE_Sign1
        assert!(matches!(
            determine_proof_format(&Base64UrlUnpadded::encode_string(b"not cose")),
            Err(Error::UnrecognizedEnvelope(_))
        ));
        // not base64url at all
        assert!(matches!(
            determine_proof_format("!!not-base64!!"),
            Err(Error::UnrecognizedEnvelope(_))
        ));
    }
}
