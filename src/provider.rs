//! # Providers
//!
//! Capabilities consumed by status list operations. Implementers supply the
//! cryptographic and persistence functionality; this crate owns no key
//! material and keeps no registry of lists.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// Digital signature algorithm identifier, as per the IANA "JSON Web
/// Signature and Encryption Algorithms" registry.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Edwards-curve digital signature (Ed25519).
    #[default]
    EdDSA,

    /// ECDSA using secp256k1 and SHA-256.
    #[serde(rename = "ES256K")]
    Es256K,
}

/// Signer is used by implementers to provide signing functionality for
/// status list credential issuance.
///
/// Key selection is captured in the `Signer` value itself: resolve a signer
/// for an issuer identity (and key reference, where applicable) before
/// calling into this crate, then pass the capability per operation.
pub trait Signer: Send + Sync {
    /// Attempt to sign the message, returning the raw signature bytes.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// The public key of the key pair used in signing. The possibility of key
    /// rotation means this key should only be referenced at the point of
    /// signing.
    fn public_key(&self) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;

    /// The algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;

    /// The verification method a verifier should use to verify the signer's
    /// signature. Typically a DID URL + `#` + verification key ID.
    fn verification_method(&self) -> String;
}

/// Outcome of verifying a signed status list envelope.
#[derive(Clone, Debug)]
pub struct Verification {
    /// `true` when the envelope's signature verifies against the resolved
    /// key material.
    pub verified: bool,

    /// The envelope payload, as parsed JSON.
    pub payload: serde_json::Value,
}

/// Verifier proxies signature verification of a signed envelope. Decoding a
/// status list does not imply verification: callers needing trust invoke
/// this capability explicitly, before or alongside decoding.
pub trait Verifier: Send + Sync {
    /// Verify the envelope's signature, resolving key material as needed,
    /// and return the payload plus validity.
    fn verify(&self, envelope: &str) -> impl Future<Output = anyhow::Result<Verification>> + Send;
}

/// `ListStore` supplies list and index bookkeeping for status entry
/// assignment.
///
/// Implementations must guarantee that an index is handed out at most once
/// per list under concurrent allocation, typically with an atomic increment
/// or reservation on the backing store.
pub trait ListStore: Send + Sync {
    /// The identifier of the store's default status list.
    fn default_list(&self) -> impl Future<Output = anyhow::Result<String>> + Send;

    /// Reserve the next free index on the given list.
    fn allocate_index(&self, list_id: &str) -> impl Future<Output = anyhow::Result<usize>> + Send;
}
