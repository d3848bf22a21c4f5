//! # StatusList2021
//!
//! The W3C bitstring status list convention: one bit per credential,
//! gzip-compressed and base64url-encoded into the `encodedList` claim of a
//! `StatusList2021Credential`. The credential may be secured as a JWT or
//! with an embedded data-integrity proof.
//!
//! The bitstring must be at least 16KB uncompressed to preserve herd
//! privacy, giving the default length of 131,072 entries.
//!
//! [StatusList2021](https://www.w3.org/TR/2023/WD-vc-status-list-20230427/)

use std::fmt::Display;
use std::io::{Read, Write};

use base64ct::{Base64UrlUnpadded, Encoding};
use bitvec::order::{BitOrder, Lsb0, Msb0};
use bitvec::vec::BitVec;
use chrono::Utc;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::bitstring::{BitsPerStatus, BitString};
use crate::core::{Kind, Quota};
use crate::error::{Error, Result};
use crate::jose;
use crate::model::{
    CredentialSubject, Issuer, Proof, StatusPurpose, VcClaims, VerifiableCredential,
};
use crate::provider::Signer;
use crate::service::ProofFormat;

/// Default number of entries in a StatusList2021 bitstring, the spec
/// minimum of 16KB of single-bit values.
pub const DEFAULT_LIST_LENGTH: usize = 131_072;

/// Status codes for a StatusList2021 entry.
#[derive(Clone, Copy, Debug, Default, Deserialize_repr, Serialize_repr, PartialEq, Eq)]
#[repr(u8)]
pub enum Status2021 {
    /// The credential is valid.
    #[default]
    Valid = 0,

    /// The credential has the status named by the list's purpose (revoked or
    /// suspended).
    Invalid = 1,
}

/// The end of the bit array that index 0 maps to.
///
/// The direction is written into the status list credential alongside the
/// encoded list and read back on decode, so a list cannot be corrupted by a
/// caller supplying a different direction on update than at creation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum IndexingDirection {
    /// Index 0 is the least significant bit of the first byte.
    #[default]
    #[serde(rename = "rightToLeft")]
    RightToLeft,

    /// Index 0 is the most significant bit of the first byte.
    #[serde(rename = "leftToRight")]
    LeftToRight,
}

impl Display for IndexingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RightToLeft => write!(f, "rightToLeft"),
            Self::LeftToRight => write!(f, "leftToRight"),
        }
    }
}

/// Generate the compressed, encoded form of a status bitstring: one bit per
/// entry, gzip-compressed, base64url-encoded without padding.
///
/// # Errors
///
/// Returns [`Error::Validation`] if compression fails.
pub fn compress(list: &BitString, direction: IndexingDirection) -> Result<String> {
    let packed = match direction {
        IndexingDirection::RightToLeft => pack::<Lsb0>(list),
        IndexingDirection::LeftToRight => pack::<Msb0>(list),
    };

    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&packed)
        .map_err(|e| Error::Validation(format!("failed to compress bitstring: {e}")))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::Validation(format!("failed to compress bitstring: {e}")))?;

    Ok(Base64UrlUnpadded::encode_string(&compressed))
}

/// Expand an `encodedList` back into a status bitstring. Inverse of
/// [`compress`] for the same direction; the list length is derived from the
/// expanded byte count.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the input is not base64url-encoded gzip
/// data.
pub fn expand(encoded: &str, direction: IndexingDirection) -> Result<BitString> {
    let compressed = Base64UrlUnpadded::decode_vec(encoded)
        .map_err(|e| Error::Validation(format!("encoded list is not valid base64url: {e}")))?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut packed = Vec::new();
    decoder
        .read_to_end(&mut packed)
        .map_err(|e| Error::Validation(format!("encoded list is not valid gzip data: {e}")))?;

    match direction {
        IndexingDirection::RightToLeft => unpack::<Lsb0>(&packed),
        IndexingDirection::LeftToRight => unpack::<Msb0>(&packed),
    }
}

fn pack<O: BitOrder>(list: &BitString) -> Vec<u8> {
    let mut bits = BitVec::<u8, O>::repeat(false, list.len());
    for (i, &code) in list.statuses().iter().enumerate() {
        if code != 0 {
            bits.set(i, true);
        }
    }
    bits.into_vec()
}

fn unpack<O: BitOrder>(packed: &[u8]) -> Result<BitString> {
    let bits = BitVec::<u8, O>::from_slice(packed);
    let statuses = bits.iter().map(|b| u8::from(*b)).collect();
    BitString::from_statuses(statuses, BitsPerStatus::One)
}

/// A status list recovered from a `StatusList2021Credential`.
#[derive(Clone, Debug)]
pub struct Decoded2021 {
    /// The compressed, encoded bitstring as carried by the credential.
    pub encoded_list: String,

    /// The expanded status bitstring.
    pub list: BitString,

    /// The credential issuer.
    pub issuer: String,

    /// The status list credential identifier.
    pub id: String,

    /// The purpose declared for the list.
    pub status_purpose: StatusPurpose,

    /// The bit order the list was encoded with.
    pub indexing_direction: IndexingDirection,
}

/// Build an (unsigned) `StatusList2021Credential` carrying the encoded list.
///
/// The indexing direction is recorded in the credential subject so decode
/// does not depend on out-of-band convention.
///
/// # Errors
///
/// Returns [`Error::Validation`] if mandatory credential fields are missing.
pub fn to_credential(
    encoded_list: &str, issuer: &Kind<Issuer>, id: &str, purpose: StatusPurpose,
    direction: IndexingDirection,
) -> Result<VerifiableCredential> {
    let mut claims = serde_json::Map::new();
    claims.insert("type".into(), Value::String("StatusList2021".into()));
    claims.insert("statusPurpose".into(), Value::String(purpose.to_string()));
    claims.insert("encodedList".into(), Value::String(encoded_list.into()));
    claims.insert("indexingDirection".into(), Value::String(direction.to_string()));

    VerifiableCredential::builder()
        .id(id)
        .add_type("StatusList2021Credential")
        .issuer(issuer.clone())
        .add_subject(CredentialSubject {
            id: Some(format!("{id}#list")),
            claims,
        })
        .build()
        .map_err(|e| Error::Validation(format!("failed to build status list credential: {e}")))
}

/// Recover the status list from a `StatusList2021Credential`, whether
/// supplied as a credential object or decoded from a JWT's `vc` claim.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the credential does not carry a
/// well-formed `encodedList` subject.
pub fn from_credential(vc: &VerifiableCredential) -> Result<Decoded2021> {
    let subject = match &vc.credential_subject {
        Quota::One(subject) => subject,
        Quota::Many(subjects) => subjects
            .first()
            .ok_or_else(|| Error::Validation("credential has no subject".into()))?,
    };

    let encoded_list = subject
        .claims
        .get("encodedList")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Validation("credential subject has no encodedList".into()))?
        .to_string();

    let status_purpose = subject
        .claims
        .get("statusPurpose")
        .map_or(Ok(StatusPurpose::Revocation), |v| {
            serde_json::from_value(v.clone())
                .map_err(|e| Error::Validation(format!("invalid statusPurpose: {e}")))
        })?;

    let indexing_direction = subject
        .claims
        .get("indexingDirection")
        .map_or(Ok(IndexingDirection::RightToLeft), |v| {
            serde_json::from_value(v.clone())
                .map_err(|e| Error::Validation(format!("invalid indexingDirection: {e}")))
        })?;

    let list = expand(&encoded_list, indexing_direction)?;

    Ok(Decoded2021 {
        encoded_list,
        list,
        issuer: vc.issuer.id().to_string(),
        id: vc.id.clone(),
        status_purpose,
        indexing_direction,
    })
}

/// Sign a `StatusList2021Credential` in the requested proof format: a
/// compact JWT (`jwt`) or an embedded data-integrity proof (`lds`).
///
/// # Errors
///
/// Returns [`Error::Validation`] for a proof format with no StatusList2021
/// representation, or [`Error::Provider`] when signing fails.
pub async fn sign(
    vc: VerifiableCredential, format: ProofFormat, signer: &impl Signer,
) -> Result<Kind<VerifiableCredential>> {
    match format {
        ProofFormat::Jwt => {
            let claims = VcClaims::from(vc);
            let jwt = jose::encode(jose::Type::Credential, &claims, signer).await?;
            Ok(Kind::String(jwt))
        }
        ProofFormat::Lds => {
            let mut vc = vc;
            let payload = serde_json::to_vec(&vc)
                .map_err(|e| Error::Validation(format!("failed to serialize credential: {e}")))?;
            let sig = signer.try_sign(&payload).await?;

            vc.proof = Some(Quota::One(Proof {
                type_: "DataIntegrityProof".into(),
                cryptosuite: Some("eddsa-jcs-2022".into()),
                proof_purpose: "assertionMethod".into(),
                verification_method: signer.verification_method(),
                created: Some(Utc::now()),
                proof_value: format!("u{}", Base64UrlUnpadded::encode_string(&sig)),
            }));
            Ok(Kind::Object(vc))
        }
        ProofFormat::Cbor => {
            Err(Error::Validation("proof format 'cbor' is not supported for StatusList2021".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_list_roundtrip() {
        let mut list = BitString::new(DEFAULT_LIST_LENGTH, BitsPerStatus::One);
        list.set(0, 1).unwrap();
        list.set(94_567, 1).unwrap();

        for direction in [IndexingDirection::RightToLeft, IndexingDirection::LeftToRight] {
            let encoded = compress(&list, direction).expect("should compress");
            let expanded = expand(&encoded, direction).expect("should expand");
            assert_eq!(expanded, list, "direction {direction}");
        }
    }

    #[test]
    fn directions_differ_on_the_wire() {
        let mut list = BitString::new(8, BitsPerStatus::One);
        list.set(0, 1).unwrap();

        let rtl = compress(&list, IndexingDirection::RightToLeft).unwrap();
        let ltr = compress(&list, IndexingDirection::LeftToRight).unwrap();
        assert_ne!(rtl, ltr);
    }

    #[test]
    fn mostly_empty_list_compresses_small() {
        let list = BitString::new(DEFAULT_LIST_LENGTH, BitsPerStatus::One);
        let encoded = compress(&list, IndexingDirection::RightToLeft).unwrap();
        assert!(encoded.len() < 200, "16KB of zeros should gzip to a handful of bytes");
    }

    #[test]
    fn credential_roundtrip() {
        let list = BitString::new(1000, BitsPerStatus::One);
        let encoded = compress(&list, IndexingDirection::RightToLeft).unwrap();

        let vc = to_credential(
            &encoded,
            &Kind::String("did:example:issuer".into()),
            "https://example.com/status/1",
            StatusPurpose::Revocation,
            IndexingDirection::RightToLeft,
        )
        .expect("should build");

        let decoded = from_credential(&vc).expect("should decode");
        assert_eq!(decoded.encoded_list, encoded);
        assert_eq!(decoded.issuer, "did:example:issuer");
        assert_eq!(decoded.id, "https://example.com/status/1");
        assert_eq!(decoded.status_purpose, StatusPurpose::Revocation);
        assert_eq!(decoded.indexing_direction, IndexingDirection::RightToLeft);
        assert_eq!(decoded.list.len(), 1000);
    }
}
