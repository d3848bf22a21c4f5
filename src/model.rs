//! # Credential Data Model
//!
//! The subset of the W3C [Verifiable Credentials Data Model] needed to carry
//! a status list payload: the credential envelope, its subject claims, the
//! per-credential status entry, and the embedded proof used by
//! data-integrity-secured lists.
//!
//! [Verifiable Credentials Data Model]: https://www.w3.org/TR/vc-data-model

use std::fmt::Display;

use anyhow::bail;
use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Kind, Quota};

/// `VerifiableCredential` represents a naive implementation of the W3C
/// Verifiable Credential data model, sufficient to express a status list
/// credential and to write status entries onto issued credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiableCredential {
    /// The @context property is used to map property URIs into short-form
    /// aliases. An ordered set where the first item is
    /// `"https://www.w3.org/2018/credentials/v1"`.
    #[serde(rename = "@context")]
    pub context: Vec<Kind<Value>>,

    /// The credential's URI.
    pub id: String,

    /// Uniquely identifies the type of the credential: the set of claims it
    /// contains.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// A URI or object with an `id` property identifying the issuer.
    pub issuer: Kind<Issuer>,

    /// An RFC 3339 date-time from which the credential is valid.
    pub issuance_date: DateTime<Utc>,

    /// A set of objects containing claims about credential subject(s).
    pub credential_subject: Quota<CredentialSubject>,

    /// One or more cryptographic proofs that can be used to detect tampering
    /// and verify authorship of the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Quota<Proof>>,

    /// An RFC 3339 date-time after which the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Used to determine the status of the credential, such as whether it is
    /// suspended or revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,
}

impl VerifiableCredential {
    /// Returns a new [`VcBuilder`], which can be used to build a
    /// [`VerifiableCredential`].
    #[must_use]
    pub fn builder() -> VcBuilder {
        VcBuilder::new()
    }
}

/// Issuer identifies the issuer of the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Issuer {
    /// The issuer URI. If dereferenced, it should result in a
    /// machine-readable document that can be used to verify the credential.
    pub id: String,
}

impl Kind<Issuer> {
    /// The issuer identifier, regardless of representation.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::String(id) => id,
            Self::Object(issuer) => &issuer.id,
        }
    }
}

/// `CredentialSubject` holds claims about the subject(s) referenced by the
/// credential. For a status list credential, the claims carry the encoded
/// list and its interpretation parameters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// A URI that uniquely identifies the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

/// `CredentialStatus` points at the machine-readable status of a credential,
/// such as whether it is suspended or revoked. For list-based statuses the
/// entry carries the list identifier and the credential's slot in the list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialStatus {
    /// A URI where credential status information can be retrieved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The status method used to provide the status of the credential, e.g.
    /// `"StatusList2021Entry"`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The purpose of the referenced status list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<StatusPurpose>,

    /// The credential's slot in the referenced status list, expressed as a
    /// string per the StatusList2021 convention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_index: Option<String>,

    /// Identifier of the status list credential holding this credential's
    /// status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_credential: Option<String>,
}

/// The purpose a status list serves for the credentials it covers.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusPurpose {
    /// The list tracks revocation: a set status is permanent.
    #[default]
    Revocation,

    /// The list tracks suspension: a set status may be cleared again.
    Suspension,
}

impl Display for StatusPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Revocation => write!(f, "revocation"),
            Self::Suspension => write!(f, "suspension"),
        }
    }
}

/// An embedded data-integrity proof. Enveloping proofs (JOSE, COSE) wrap the
/// credential instead and do not use this structure.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Proof {
    /// The specific proof type, e.g. `"DataIntegrityProof"`. Determines the
    /// other fields required to secure and verify the proof.
    #[serde(rename = "type")]
    pub type_: String,

    /// Identifies the cryptographic suite used to generate the proof, e.g.
    /// `"eddsa-rdfc-2022"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,

    /// The reason for the proof. Acts as a safeguard to prevent the proof
    /// from being misused.
    pub proof_purpose: String,

    /// Used to verify the proof. For example, a link to a public key used by
    /// a verifier during verification.
    pub verification_method: String,

    /// The date-time the proof was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// The data needed to verify the proof, as a multibase-encoded binary
    /// value.
    pub proof_value: String,
}

/// Claims of a credential secured as a JWT (`jwt_vc_json` convention): the
/// credential rides in the `vc` claim with registered claims alongside.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VcClaims {
    /// The credential issuer.
    pub iss: String,

    /// The credential identifier.
    pub sub: String,

    /// The time of issue.
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,

    /// The credential itself.
    pub vc: VerifiableCredential,
}

impl From<VerifiableCredential> for VcClaims {
    fn from(vc: VerifiableCredential) -> Self {
        Self {
            iss: vc.issuer.id().to_string(),
            sub: vc.id.clone(),
            iat: vc.issuance_date,
            vc,
        }
    }
}

/// [`VcBuilder`] is used to build a [`VerifiableCredential`].
#[derive(Clone, Debug, Default)]
pub struct VcBuilder {
    vc: VerifiableCredential,
}

impl VcBuilder {
    /// Returns a new [`VcBuilder`].
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("VcBuilder::new");

        let mut builder = Self::default();

        // sensible defaults
        builder.vc.context.push(Kind::String("https://www.w3.org/2018/credentials/v1".into()));
        builder.vc.type_.push("VerifiableCredential".into());
        builder.vc.issuance_date = chrono::Utc::now();

        builder
    }

    /// Adds a `@context` entry.
    #[must_use]
    pub fn add_context(mut self, context: Kind<Value>) -> Self {
        self.vc.context.push(context);
        self
    }

    /// Sets the `id` property.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vc.id = id.into();
        self
    }

    /// Adds a `type` entry.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        self.vc.type_.push(type_.into());
        self
    }

    /// Sets the `issuer` property.
    #[must_use]
    pub fn issuer(mut self, issuer: Kind<Issuer>) -> Self {
        self.vc.issuer = issuer;
        self
    }

    /// Adds one or more `credential_subject` properties.
    #[must_use]
    pub fn add_subject(mut self, subj: CredentialSubject) -> Self {
        let one_set = match self.vc.credential_subject {
            Quota::One(one) => {
                if one == CredentialSubject::default() {
                    Quota::One(subj)
                } else {
                    Quota::Many(vec![one, subj])
                }
            }
            Quota::Many(mut set) => {
                set.push(subj);
                Quota::Many(set)
            }
        };

        self.vc.credential_subject = one_set;
        self
    }

    /// Sets the `expiration_date` property.
    #[must_use]
    pub fn expiration_date(mut self, expires: DateTime<Utc>) -> Self {
        self.vc.expiration_date = Some(expires);
        self
    }

    /// Turns this builder into a [`VerifiableCredential`].
    ///
    /// # Errors
    ///
    /// Fails if any of the credential's mandatory fields are not set.
    pub fn build(self) -> anyhow::Result<VerifiableCredential> {
        tracing::debug!("VcBuilder::build");

        if self.vc.id.is_empty() {
            bail!("no id set");
        }
        if self.vc.type_.len() < 2 {
            bail!("no type set");
        }
        if self.vc.issuer.id().is_empty() {
            bail!("no issuer set");
        }
        if let Quota::One(subj) = &self.vc.credential_subject {
            if *subj == CredentialSubject::default() {
                bail!("no credential_subject set");
            }
        }

        Ok(self.vc)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builder_defaults() {
        let vc = VerifiableCredential::builder()
            .id("https://example.com/status/1")
            .add_type("StatusList2021Credential")
            .issuer(Kind::String("did:example:issuer".into()))
            .add_subject(CredentialSubject {
                id: Some("https://example.com/status/1#list".into()),
                claims: json!({"type": "StatusList2021"})
                    .as_object()
                    .map_or_else(Map::default, Clone::clone),
            })
            .build()
            .expect("should build");

        let vc_json = serde_json::to_value(&vc).expect("should serialize");
        assert_eq!(
            *vc_json.get("@context").expect("@context should be set"),
            json!(["https://www.w3.org/2018/credentials/v1"])
        );
        assert_eq!(
            *vc_json.get("type").expect("type should be set"),
            json!(["VerifiableCredential", "StatusList2021Credential"])
        );
        assert_eq!(
            *vc_json.get("issuer").expect("issuer should be set"),
            json!("did:example:issuer")
        );
    }

    #[test]
    fn builder_requires_subject() {
        let result = VerifiableCredential::builder()
            .id("https://example.com/status/1")
            .add_type("StatusList2021Credential")
            .issuer(Kind::String("did:example:issuer".into()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn status_entry_serialization() {
        let status = CredentialStatus {
            id: Some("https://example.com/status/1#94567".into()),
            type_: "StatusList2021Entry".into(),
            status_purpose: Some(StatusPurpose::Revocation),
            status_list_index: Some("94567".into()),
            status_list_credential: Some("https://example.com/status/1".into()),
        };

        let json = serde_json::to_value(&status).expect("should serialize");
        assert_eq!(
            json,
            json!({
                "id": "https://example.com/status/1#94567",
                "type": "StatusList2021Entry",
                "statusPurpose": "revocation",
                "statusListIndex": "94567",
                "statusListCredential": "https://example.com/status/1"
            })
        );

        let roundtripped: CredentialStatus =
            serde_json::from_value(json).expect("should deserialize");
        assert_eq!(roundtripped, status);
    }
}
