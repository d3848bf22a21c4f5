//! # Status List Service
//!
//! Stateless orchestration of status list operations: create a list, update
//! a single index, check a single index, and derive list details from an
//! opaque credential. Operations dispatch on [`StatusListType`] and validate
//! that the requested proof format exists for that type.
//!
//! Every operation decodes fully from its input, mutates a local copy, and
//! re-encodes: no state is shared between calls. Concurrent updates to the
//! same logical list are therefore last-writer-wins at the envelope level:
//! each caller re-signs a whole new envelope from the credential it supplied
//! and no merge takes place. Callers needing linearizable updates across
//! concurrent writers must serialize externally, for example with a
//! single-writer queue per list id or optimistic concurrency on the store
//! holding the current encoded list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bitstring::{BitsPerStatus, BitString};
use crate::core::Kind;
use crate::error::{Error, Result};
use crate::jose;
use crate::list2021::{self, IndexingDirection};
use crate::model::{CredentialStatus, Issuer, StatusPurpose, VcClaims, VerifiableCredential};
use crate::provider::{ListStore, Signer};
use crate::token;

/// The status list conventions supported by the service.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum StatusListType {
    /// W3C bitstring status list: 1 bit per credential, gzip + base64url,
    /// embedded in a verifiable credential.
    #[default]
    StatusList2021,

    /// IETF/OAuth token status list: 1–8 bits per credential, zlib, carried
    /// in a JWT or CWT claim.
    OAuthStatusList,
}

/// Proof formats a status list credential can be secured with.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProofFormat {
    /// Compact JWT.
    #[default]
    Jwt,

    /// Embedded data-integrity (linked-data) proof. `StatusList2021` only.
    Lds,

    /// CWT / `COSE_Sign1`. `OAuthStatusList` only.
    Cbor,
}

/// A signed status list credential: a compact string (JWT or base64url CWT)
/// or a credential object carrying an embedded proof.
pub type StatusCredential = Kind<VerifiableCredential>;

/// The driver managing a status list on the caller's store. External
/// bookkeeping only, not derivable from the credential itself.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum StatusListDriverType {
    /// Relational store managed by the agent.
    #[serde(rename = "agent_typeorm")]
    AgentTypeOrm,

    /// Key-value store managed by the agent.
    #[serde(rename = "agent_kv_store")]
    AgentKvStore,

    /// Filesystem store managed by the agent.
    #[serde(rename = "agent_filesystem")]
    AgentFilesystem,

    /// List published from a repository.
    #[serde(rename = "github")]
    Github,
}

/// When the caller's store assigns credential ids for status entries.
/// External bookkeeping only.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusListCredentialIdMode {
    /// Ids are assigned at issuance.
    Issuance,

    /// Ids are never assigned.
    Never,
}

/// StatusList2021-specific list options.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusList2021Options {
    /// The end of the bit array that index 0 maps to.
    pub indexing_direction: Option<IndexingDirection>,

    /// The purpose the list serves. Defaults to revocation.
    pub status_purpose: Option<StatusPurpose>,
}

/// Token-status-list-specific list options.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthStatusListOptions {
    /// Status code width. Defaults to 2 bits.
    pub bits_per_status: Option<BitsPerStatus>,

    /// Expiry to declare on the signed token.
    pub expires_at: Option<DateTime<Utc>>,
}

/// StatusList2021-specific details of a created or updated list.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusList2021Details {
    /// The bit order the list is encoded with.
    pub indexing_direction: IndexingDirection,

    /// The purpose the list serves.
    pub status_purpose: StatusPurpose,
}

/// Token-status-list-specific details of a created or updated list.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStatusListDetails {
    /// Status code width.
    pub bits_per_status: BitsPerStatus,

    /// Expiry declared on the signed token, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// An immutable snapshot of a status list as of one create or update
/// operation. Every update produces a new snapshot with a fresh encoded
/// list and signed credential.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusListDetails {
    /// The status list credential identifier (URI).
    pub id: String,

    /// The list issuer.
    pub issuer: Kind<Issuer>,

    /// The status list convention in use.
    #[serde(rename = "type")]
    pub list_type: StatusListType,

    /// The proof format securing the credential.
    pub proof_format: ProofFormat,

    /// The compressed, encoded status values.
    pub encoded_list: String,

    /// The signed status list credential.
    pub status_list_credential: StatusCredential,

    /// Number of entries in the list.
    pub length: usize,

    /// Present when `type` is `StatusList2021`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_2021: Option<StatusList2021Details>,

    /// Present when `type` is `OAuthStatusList`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_status_list: Option<OAuthStatusListDetails>,

    /// Caller-supplied correlation identifier, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Caller-supplied driver type, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_type: Option<StatusListDriverType>,

    /// Caller-supplied credential id mode, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id_mode: Option<StatusListCredentialIdMode>,
}

/// Request to create a new status list.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequest {
    /// The status list convention to create.
    #[serde(rename = "type")]
    pub list_type: StatusListType,

    /// The credential identifier (URI) for the new list.
    pub id: String,

    /// The list issuer.
    pub issuer: Kind<Issuer>,

    /// Number of entries. Defaults per convention: 131,072 for
    /// `StatusList2021`, 250,000 for `OAuthStatusList`.
    pub length: Option<usize>,

    /// Proof format. Defaults to `jwt`.
    pub proof_format: Option<ProofFormat>,

    /// Correlation identifier for the caller's bookkeeping.
    pub correlation_id: Option<String>,

    /// Required when `type` is `StatusList2021`.
    pub status_list_2021: Option<StatusList2021Options>,

    /// Required when `type` is `OAuthStatusList`.
    pub oauth_status_list: Option<OAuthStatusListOptions>,
}

/// Request to update a single index of an existing signed status list.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// The existing signed status list credential. The list type and proof
    /// format are detected from the credential itself.
    pub status_list_credential: StatusCredential,

    /// The index to update.
    pub status_list_index: usize,

    /// The new status code for the index.
    pub value: u8,
}

/// Request to update a single index starting from a raw encoded list. The
/// caller supplies the trust context (issuer and id) explicitly; there is
/// no signature to verify going in.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateFromEncodedRequest {
    /// The status list convention the encoded list was produced with.
    #[serde(rename = "type")]
    pub list_type: StatusListType,

    /// The compressed, encoded status values to start from.
    pub encoded_list: String,

    /// The index to update.
    pub status_list_index: usize,

    /// The new status code for the index.
    pub value: u8,

    /// The credential identifier (URI) for the re-signed list.
    pub id: String,

    /// The list issuer.
    pub issuer: Kind<Issuer>,

    /// Proof format for the re-signed credential. Defaults to `jwt`.
    pub proof_format: Option<ProofFormat>,

    /// Correlation identifier for the caller's bookkeeping.
    pub correlation_id: Option<String>,

    /// Required when `type` is `StatusList2021`.
    pub status_list_2021: Option<StatusList2021Options>,

    /// Required when `type` is `OAuthStatusList`.
    pub oauth_status_list: Option<OAuthStatusListOptions>,
}

/// Request to read the status code at a single index.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    /// The signed status list credential to read from.
    pub status_list_credential: StatusCredential,

    /// The index to read.
    pub status_list_index: usize,
}

/// Caller-supplied bookkeeping to attach to derived list details.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailsOptions {
    /// Correlation identifier for the caller's bookkeeping.
    pub correlation_id: Option<String>,

    /// The driver managing the list on the caller's store.
    pub driver_type: Option<StatusListDriverType>,

    /// When the caller's store assigns credential ids.
    pub credential_id_mode: Option<StatusListCredentialIdMode>,
}

/// Request to wrap an existing encoded list into a signed
/// `StatusList2021Credential` without mutating it.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToCredentialRequest {
    /// The list issuer.
    pub issuer: Kind<Issuer>,

    /// The credential identifier (URI).
    pub id: String,

    /// The compressed, encoded status values.
    pub encoded_list: String,

    /// The purpose the list serves.
    pub status_purpose: StatusPurpose,

    /// Proof format. Defaults to `jwt`.
    pub proof_format: Option<ProofFormat>,

    /// The bit order the list was encoded with. Defaults to `rightToLeft`.
    pub indexing_direction: Option<IndexingDirection>,
}

/// Request to ensure a credential carries a status entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddStatusRequest {
    /// The credential to decorate.
    pub credential: VerifiableCredential,

    /// Explicit status list to use. When absent, the store's default list
    /// is used.
    pub status_list_id: Option<String>,

    /// Explicit index to use. When absent, the store allocates the next
    /// free index.
    pub status_list_index: Option<usize>,

    /// The purpose of the referenced list. Defaults to revocation.
    pub status_purpose: Option<StatusPurpose>,
}

/// Create a new status list: a zero-filled list of the requested length,
/// encoded and signed in the requested proof format.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the type-specific options are missing,
/// [`Error::InvalidProofFormat`] when `lds` is requested for an OAuth list,
/// or [`Error::Provider`] when signing fails.
pub async fn create_status_list(
    request: CreateRequest, signer: &impl Signer,
) -> Result<StatusListDetails> {
    tracing::debug!("service::create_status_list");

    let proof_format = request.proof_format.unwrap_or_default();

    match request.list_type {
        StatusListType::OAuthStatusList => {
            let Some(options) = request.oauth_status_list else {
                return Err(Error::Validation(
                    "OAuthStatusList options are required for type OAuthStatusList".into(),
                ));
            };

            let length = request.length.unwrap_or(token::DEFAULT_LIST_LENGTH);
            let bits = options.bits_per_status.unwrap_or(token::DEFAULT_BITS_PER_STATUS);
            let list = BitString::new(length, bits);

            let signed = match proof_format {
                ProofFormat::Jwt => {
                    token::create_signed_jwt(
                        &list,
                        request.issuer.id(),
                        &request.id,
                        options.expires_at,
                        signer,
                    )
                    .await?
                }
                ProofFormat::Cbor => {
                    token::create_signed_cwt(
                        &list,
                        request.issuer.id(),
                        &request.id,
                        options.expires_at,
                        signer,
                    )
                    .await?
                }
                ProofFormat::Lds => return Err(Error::InvalidProofFormat("lds".into())),
            };

            Ok(StatusListDetails {
                id: request.id,
                issuer: request.issuer,
                list_type: StatusListType::OAuthStatusList,
                proof_format,
                encoded_list: signed.encoded_list,
                status_list_credential: Kind::String(signed.status_list_credential),
                length,
                status_list_2021: None,
                oauth_status_list: Some(OAuthStatusListDetails {
                    bits_per_status: bits,
                    expires_at: options.expires_at,
                }),
                correlation_id: request.correlation_id,
                driver_type: None,
                credential_id_mode: None,
            })
        }
        StatusListType::StatusList2021 => {
            let Some(options) = request.status_list_2021 else {
                return Err(Error::Validation(
                    "StatusList2021 options are required for type StatusList2021".into(),
                ));
            };

            let length = request.length.unwrap_or(list2021::DEFAULT_LIST_LENGTH);
            let direction = options.indexing_direction.unwrap_or_default();
            let purpose = options.status_purpose.unwrap_or_default();

            let list = BitString::new(length, BitsPerStatus::One);
            let encoded_list = list2021::compress(&list, direction)?;
            let vc = list2021::to_credential(
                &encoded_list,
                &request.issuer,
                &request.id,
                purpose,
                direction,
            )?;
            let credential = list2021::sign(vc, proof_format, signer).await?;

            Ok(StatusListDetails {
                id: request.id,
                issuer: request.issuer,
                list_type: StatusListType::StatusList2021,
                proof_format,
                encoded_list,
                status_list_credential: credential,
                length,
                status_list_2021: Some(StatusList2021Details {
                    indexing_direction: direction,
                    status_purpose: purpose,
                }),
                oauth_status_list: None,
                correlation_id: request.correlation_id,
                driver_type: None,
                credential_id_mode: None,
            })
        }
    }
}

/// Update a single index of an existing signed status list. The list type
/// and proof format are auto-detected from the supplied credential; the
/// updated list is re-encoded and re-signed.
///
/// # Errors
///
/// Returns [`Error::Range`] when the index is outside the list,
/// [`Error::UnrecognizedEnvelope`] when the credential cannot be classified,
/// or [`Error::Provider`] when re-signing fails.
pub async fn update_status_list_index(
    request: UpdateRequest, signer: &impl Signer,
) -> Result<StatusListDetails> {
    tracing::debug!("service::update_status_list_index");

    let mut decoded = decode_credential(&request.status_list_credential)?;
    decoded.list.set(request.status_list_index, request.value)?;

    resign(decoded, signer).await
}

/// Update a single index starting from a raw encoded list plus explicit
/// issuer and id, then sign the result. No signature is verified going in;
/// the caller supplies the trust context.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the type-specific options are missing
/// or the encoded list is malformed, [`Error::Range`] when the index is
/// outside the list, or [`Error::Provider`] when signing fails.
pub async fn update_status_list_from_encoded_list(
    request: UpdateFromEncodedRequest, signer: &impl Signer,
) -> Result<StatusListDetails> {
    tracing::debug!("service::update_status_list_from_encoded_list");

    let proof_format = request.proof_format.unwrap_or_default();

    match request.list_type {
        StatusListType::StatusList2021 => {
            let Some(options) = request.status_list_2021 else {
                return Err(Error::Validation(
                    "StatusList2021 options are required for type StatusList2021".into(),
                ));
            };

            let direction = options.indexing_direction.unwrap_or_default();
            let mut list = list2021::expand(&request.encoded_list, direction)?;
            list.set(request.status_list_index, request.value)?;

            resign(
                Decoded {
                    list_type: StatusListType::StatusList2021,
                    proof_format,
                    list,
                    encoded_list: request.encoded_list,
                    issuer: request.issuer,
                    id: request.id,
                    status_purpose: options.status_purpose,
                    indexing_direction: Some(direction),
                    expires_at: None,
                    correlation_id: request.correlation_id,
                },
                signer,
            )
            .await
        }
        StatusListType::OAuthStatusList => {
            let Some(options) = request.oauth_status_list else {
                return Err(Error::Validation(
                    "OAuthStatusList options are required for type OAuthStatusList".into(),
                ));
            };
            if proof_format == ProofFormat::Lds {
                return Err(Error::InvalidProofFormat("lds".into()));
            }

            let bits = options.bits_per_status.unwrap_or(token::DEFAULT_BITS_PER_STATUS);
            let claim = token::StatusListClaim {
                bits,
                lst: request.encoded_list.clone(),
            };
            let mut list = claim.to_list()?;
            list.set(request.status_list_index, request.value)?;

            resign(
                Decoded {
                    list_type: StatusListType::OAuthStatusList,
                    proof_format,
                    list,
                    encoded_list: request.encoded_list,
                    issuer: request.issuer,
                    id: request.id,
                    status_purpose: None,
                    indexing_direction: None,
                    expires_at: options.expires_at,
                    correlation_id: request.correlation_id,
                },
                signer,
            )
            .await
        }
    }
}

/// Read the status code at a single index. Decode-only: nothing is mutated
/// and nothing is re-signed.
///
/// # Errors
///
/// Returns [`Error::Range`] when the index is outside the list, or
/// [`Error::UnrecognizedEnvelope`] when the credential cannot be classified.
pub fn check_status_index(request: &CheckRequest) -> Result<u8> {
    tracing::debug!("service::check_status_index");

    let decoded = decode_credential(&request.status_list_credential)?;
    decoded.list.get(request.status_list_index)
}

/// Derive status list details from an opaque signed credential, attaching
/// the caller's bookkeeping fields. The signature is not verified.
///
/// # Errors
///
/// Returns [`Error::UnrecognizedEnvelope`] or [`Error::Validation`] when the
/// credential cannot be classified or decoded.
pub fn status_list_details(
    credential: &StatusCredential, options: DetailsOptions,
) -> Result<StatusListDetails> {
    tracing::debug!("service::status_list_details");

    let decoded = decode_credential(credential)?;
    let mut details = decoded.into_details(credential.clone());
    details.correlation_id = options.correlation_id;
    details.driver_type = options.driver_type;
    details.credential_id_mode = options.credential_id_mode;
    Ok(details)
}

/// Wrap an existing encoded list into a signed `StatusList2021Credential`
/// without mutating any index.
///
/// # Errors
///
/// Returns [`Error::Validation`] when the encoded list is malformed, or
/// [`Error::Provider`] when signing fails.
pub async fn status_list_2021_to_credential(
    request: ToCredentialRequest, signer: &impl Signer,
) -> Result<StatusCredential> {
    tracing::debug!("service::status_list_2021_to_credential");

    let direction = request.indexing_direction.unwrap_or_default();
    // confirm the supplied list expands before signing it
    list2021::expand(&request.encoded_list, direction)?;

    let vc = list2021::to_credential(
        &request.encoded_list,
        &request.issuer,
        &request.id,
        request.status_purpose,
        direction,
    )?;
    list2021::sign(vc, request.proof_format.unwrap_or_default(), signer).await
}

/// Ensure a credential carries a status entry, allocating a list and index
/// through the store when needed.
///
/// Idempotent: a credential whose `credentialStatus.statusListCredential` is
/// already populated passes through untouched.
///
/// # Errors
///
/// Returns [`Error::Provider`] when the store fails to supply a list or
/// index.
pub async fn add_status_to_credential(
    request: AddStatusRequest, store: &impl ListStore,
) -> Result<VerifiableCredential> {
    tracing::debug!("service::add_status_to_credential");

    let mut credential = request.credential;
    if let Some(status) = &credential.credential_status {
        if status.status_list_credential.is_some() {
            return Ok(credential);
        }
    }

    let list_id = match request.status_list_id {
        Some(id) => id,
        None => store.default_list().await?,
    };
    let index = match request.status_list_index {
        Some(index) => index,
        None => store.allocate_index(&list_id).await?,
    };

    credential.credential_status = Some(CredentialStatus {
        id: Some(format!("{list_id}#{index}")),
        type_: "StatusList2021Entry".into(),
        status_purpose: Some(request.status_purpose.unwrap_or_default()),
        status_list_index: Some(index.to_string()),
        status_list_credential: Some(list_id),
    });

    Ok(credential)
}

/// A status list fully decoded from a signed credential, ready to mutate
/// and re-sign.
struct Decoded {
    list_type: StatusListType,
    proof_format: ProofFormat,
    list: BitString,
    encoded_list: String,
    issuer: Kind<Issuer>,
    id: String,
    status_purpose: Option<StatusPurpose>,
    indexing_direction: Option<IndexingDirection>,
    expires_at: Option<DateTime<Utc>>,
    correlation_id: Option<String>,
}

impl Decoded {
    fn into_details(self, credential: StatusCredential) -> StatusListDetails {
        let (status_list_2021, oauth_status_list) = match self.list_type {
            StatusListType::StatusList2021 => (
                Some(StatusList2021Details {
                    indexing_direction: self.indexing_direction.unwrap_or_default(),
                    status_purpose: self.status_purpose.unwrap_or_default(),
                }),
                None,
            ),
            StatusListType::OAuthStatusList => (
                None,
                Some(OAuthStatusListDetails {
                    bits_per_status: self.list.bits_per_status(),
                    expires_at: self.expires_at,
                }),
            ),
        };

        StatusListDetails {
            id: self.id,
            issuer: self.issuer,
            list_type: self.list_type,
            proof_format: self.proof_format,
            encoded_list: self.encoded_list,
            status_list_credential: credential,
            length: self.list.len(),
            status_list_2021,
            oauth_status_list,
            correlation_id: self.correlation_id,
            driver_type: None,
            credential_id_mode: None,
        }
    }
}

/// Decode an opaque status list credential, classifying its envelope and
/// recovering the in-memory list. No signature verification takes place.
fn decode_credential(credential: &StatusCredential) -> Result<Decoded> {
    match credential {
        Kind::Object(vc) => {
            let decoded = list2021::from_credential(vc)?;
            Ok(Decoded {
                list_type: StatusListType::StatusList2021,
                proof_format: ProofFormat::Lds,
                list: decoded.list,
                encoded_list: decoded.encoded_list,
                issuer: Kind::String(decoded.issuer),
                id: decoded.id,
                status_purpose: Some(decoded.status_purpose),
                indexing_direction: Some(decoded.indexing_direction),
                expires_at: None,
                correlation_id: None,
            })
        }
        Kind::String(compact) => match token::determine_proof_format(compact)? {
            ProofFormat::Cbor => {
                let decoded = token::decode_status_list_cwt(compact)?;
                Ok(Decoded {
                    list_type: StatusListType::OAuthStatusList,
                    proof_format: ProofFormat::Cbor,
                    list: decoded.list,
                    encoded_list: decoded.encoded_list,
                    issuer: Kind::String(decoded.issuer),
                    id: decoded.id,
                    status_purpose: None,
                    indexing_direction: None,
                    expires_at: decoded.expires_at,
                    correlation_id: None,
                })
            }
            ProofFormat::Jwt => {
                let jwt: jose::Jwt<serde_json::Value> = jose::decode(compact)?;
                if jwt.header.typ == jose::Type::StatusList {
                    let decoded = token::decode_status_list_jwt(compact)?;
                    Ok(Decoded {
                        list_type: StatusListType::OAuthStatusList,
                        proof_format: ProofFormat::Jwt,
                        list: decoded.list,
                        encoded_list: decoded.encoded_list,
                        issuer: Kind::String(decoded.issuer),
                        id: decoded.id,
                        status_purpose: None,
                        indexing_direction: None,
                        expires_at: decoded.expires_at,
                        correlation_id: None,
                    })
                } else {
                    let claims: VcClaims = serde_json::from_value(jwt.claims).map_err(|e| {
                        Error::Validation(format!("JWT does not carry a credential: {e}"))
                    })?;
                    let decoded = list2021::from_credential(&claims.vc)?;
                    Ok(Decoded {
                        list_type: StatusListType::StatusList2021,
                        proof_format: ProofFormat::Jwt,
                        list: decoded.list,
                        encoded_list: decoded.encoded_list,
                        issuer: Kind::String(decoded.issuer),
                        id: decoded.id,
                        status_purpose: Some(decoded.status_purpose),
                        indexing_direction: Some(decoded.indexing_direction),
                        expires_at: None,
                        correlation_id: None,
                    })
                }
            }
            ProofFormat::Lds => {
                Err(Error::UnrecognizedEnvelope("compact string classified as lds".into()))
            }
        },
    }
}

/// Re-encode and re-sign a decoded (and possibly mutated) list in its
/// original type and proof format.
async fn resign(decoded: Decoded, signer: &impl Signer) -> Result<StatusListDetails> {
    match decoded.list_type {
        StatusListType::OAuthStatusList => {
            let signed = match decoded.proof_format {
                ProofFormat::Jwt => {
                    token::create_signed_jwt(
                        &decoded.list,
                        decoded.issuer.id(),
                        &decoded.id,
                        decoded.expires_at,
                        signer,
                    )
                    .await?
                }
                ProofFormat::Cbor => {
                    token::create_signed_cwt(
                        &decoded.list,
                        decoded.issuer.id(),
                        &decoded.id,
                        decoded.expires_at,
                        signer,
                    )
                    .await?
                }
                ProofFormat::Lds => return Err(Error::InvalidProofFormat("lds".into())),
            };

            let credential = Kind::String(signed.status_list_credential);
            let decoded = Decoded {
                encoded_list: signed.encoded_list,
                ..decoded
            };
            Ok(decoded.into_details(credential))
        }
        StatusListType::StatusList2021 => {
            let direction = decoded.indexing_direction.unwrap_or_default();
            let purpose = decoded.status_purpose.unwrap_or_default();

            let encoded_list = list2021::compress(&decoded.list, direction)?;
            let vc = list2021::to_credential(
                &encoded_list,
                &decoded.issuer,
                &decoded.id,
                purpose,
                direction,
            )?;
            let credential = list2021::sign(vc, decoded.proof_format, signer).await?;

            let decoded = Decoded { encoded_list, ..decoded };
            Ok(decoded.into_details(credential))
        }
    }
}
