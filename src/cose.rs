//! # CBOR / COSE
//!
//! CBOR serialization helpers and `COSE_Sign1` assembly for CWT-secured
//! status list tokens, per [RFC 9052].
//!
//! [RFC 9052]: https://www.rfc-editor.org/rfc/rfc9052

use anyhow::anyhow;
use coset::cbor::value::Value;
use coset::{iana, CborSerializable, CoseSign1, CoseSign1Builder, HeaderBuilder, TaggedCborSerializable};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::provider::{Algorithm, Signer};

/// COSE header parameter label for the `typ` (type) parameter, per RFC 9596.
pub const HEADER_TYP: i64 = 16;

/// Serialize a value to a CBOR byte vector.
///
/// # Errors
///
/// Returns an error when the value cannot be represented as CBOR.
pub fn to_vec<T>(value: &T) -> anyhow::Result<Vec<u8>>
where
    T: Serialize,
{
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)?;
    Ok(buf)
}

/// Deserialize a value from a CBOR byte slice.
///
/// # Errors
///
/// Returns an error when the bytes are not valid CBOR for the target type.
pub fn from_slice<T>(slice: &[u8]) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    ciborium::from_reader(slice).map_err(|e| anyhow!("failed to deserialize CBOR: {e}"))
}

/// Build and sign a `COSE_Sign1` over the given payload.
///
/// The protected header carries the signer's algorithm and the `typ`
/// parameter; the unprotected header carries the key ID (the signer's
/// verification method). The signature is computed over the `Sig_structure`
/// serialization.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the signing capability fails, propagated
/// unchanged.
pub async fn sign1(payload: Vec<u8>, typ: &str, signer: &impl Signer) -> Result<CoseSign1> {
    tracing::debug!("cose::sign1");

    let algorithm = match signer.algorithm() {
        Algorithm::EdDSA => iana::Algorithm::EdDSA,
        Algorithm::Es256K => iana::Algorithm::ES256K,
    };

    let protected = HeaderBuilder::new()
        .algorithm(algorithm)
        .value(HEADER_TYP, Value::Text(typ.into()))
        .build();
    let unprotected =
        HeaderBuilder::new().key_id(signer.verification_method().into_bytes()).build();

    let mut cose_sign_1 = CoseSign1Builder::new()
        .protected(protected)
        .unprotected(unprotected)
        .payload(payload)
        .build();

    let tbs = coset::sig_structure_data(
        coset::SignatureContext::CoseSign1,
        cose_sign_1.protected.clone(),
        None,
        &[],
        cose_sign_1.payload.as_deref().unwrap_or_default(),
    );
    cose_sign_1.signature = signer.try_sign(&tbs).await?;

    Ok(cose_sign_1)
}

/// Serialize a `COSE_Sign1` to bytes.
///
/// # Errors
///
/// Returns [`Error::Validation`] when serialization fails.
pub fn sign1_to_vec(cose_sign_1: CoseSign1) -> Result<Vec<u8>> {
    cose_sign_1
        .to_vec()
        .map_err(|e| Error::Validation(format!("failed to serialize COSE_Sign1: {e}")))
}

/// Parse a `COSE_Sign1` from bytes, accepting both the bare structure and
/// the tag-18 wrapped form.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the bytes parse as neither.
pub fn parse_sign1(bytes: &[u8]) -> Result<CoseSign1> {
    CoseSign1::from_slice(bytes)
        .or_else(|_| CoseSign1::from_tagged_slice(bytes))
        .map_err(|e| Error::Validation(format!("failed to parse COSE_Sign1: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbor_roundtrip() {
        let value = Value::Map(vec![
            (Value::Integer(1.into()), Value::Text("did:example:issuer".into())),
            (Value::Integer(2.into()), Value::Bytes(vec![0x01, 0x02])),
        ]);
        let bytes = to_vec(&value).expect("should serialize");
        let decoded: Value = from_slice(&bytes).expect("should deserialize");
        assert_eq!(decoded, value);
    }
}
