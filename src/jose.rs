//! # JOSE
//!
//! Compact JWS encoding for status list credentials, per [RFC 7515]. The
//! header is built from the signer's algorithm and verification method; the
//! decode path deliberately does not verify; signature verification is the
//! separate [`crate::provider::Verifier`] capability.
//!
//! [RFC 7515]: https://www.rfc-editor.org/rfc/rfc7515

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::{Algorithm, Signer};

/// Represents a decoded JWT: header plus claims. The signature has not been
/// checked.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Jwt<T> {
    /// The JWT header.
    pub header: Header,

    /// The JWT claims.
    pub claims: T,
}

/// Represents the JWT header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// Digital signature algorithm identifier as per IANA "JSON Web
    /// Signature and Encryption Algorithms" registry.
    pub alg: Algorithm,

    /// The media type of the JWS, used to distinguish status list tokens
    /// from credential JWTs.
    pub typ: Type,

    /// Key ID: a reference to the key used to sign the JWT. For DID-bound
    /// credentials, a DID URL identifying a verification method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// The JWT `typ` header value.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Type {
    /// A credential secured as a JWT (`vc` claim).
    #[default]
    #[serde(rename = "jwt", alias = "JWT")]
    Credential,

    /// A status list token per the Token Status List specification.
    #[serde(rename = "statuslist+jwt")]
    StatusList,
}

/// Encode the provided claims and sign, returning the compact JWS form.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the signing capability fails; the
/// failure is propagated unchanged. Serialization failures surface as
/// [`Error::Validation`].
pub async fn encode<T>(typ: Type, claims: &T, signer: &impl Signer) -> Result<String>
where
    T: Serialize + Send + Sync,
{
    tracing::debug!("jose::encode");

    let header = Header {
        alg: signer.algorithm(),
        typ,
        kid: Some(signer.verification_method()),
    };

    let header = Base64UrlUnpadded::encode_string(
        &serde_json::to_vec(&header)
            .map_err(|e| Error::Validation(format!("failed to serialize header: {e}")))?,
    );
    let claims = Base64UrlUnpadded::encode_string(
        &serde_json::to_vec(claims)
            .map_err(|e| Error::Validation(format!("failed to serialize claims: {e}")))?,
    );
    let payload = format!("{header}.{claims}");

    let sig = signer.try_sign(payload.as_bytes()).await?;
    let sig_enc = Base64UrlUnpadded::encode_string(&sig);

    Ok(format!("{payload}.{sig_enc}"))
}

/// Decode a compact JWS into header and claims, without verifying the
/// signature.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the token is not three base64url
/// segments or a segment does not deserialize.
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<Jwt<T>> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(Error::Validation("invalid Compact JWS format".into()));
    }

    let decoded = Base64UrlUnpadded::decode_vec(parts[0])
        .map_err(|e| Error::Validation(format!("issue decoding header: {e}")))?;
    let header: Header = serde_json::from_slice(&decoded)
        .map_err(|e| Error::Validation(format!("issue deserializing header: {e}")))?;

    let decoded = Base64UrlUnpadded::decode_vec(parts[1])
        .map_err(|e| Error::Validation(format!("issue decoding claims: {e}")))?;
    let claims = serde_json::from_slice(&decoded)
        .map_err(|e| Error::Validation(format!("issue deserializing claims: {e}")))?;

    Ok(Jwt { header, claims })
}
