//! An API for managing Verifiable Credential status lists: the compressed,
//! bit-packed revocation and suspension lists published by credential
//! issuers and consumed by verifiers.
//!
//! Two deployed conventions are supported, dispatched by
//! [`service::StatusListType`]:
//!
//! * [StatusList2021]: one bit per credential, gzip + base64url, embedded
//!   in a verifiable credential secured as a JWT or with a data-integrity
//!   proof.
//! * [Token Status List]: 1, 2, 4, or 8 bits per credential, zlib, carried
//!   in the `status_list` claim of a JWT or CWT.
//!
//! Cryptographic signing, verification, and index bookkeeping are consumed
//! as capabilities (see [`provider`]); this crate owns no key material and
//! keeps no registry of lists.
//!
//! [StatusList2021]: https://www.w3.org/TR/2023/WD-vc-status-list-20230427/
//! [Token Status List]: https://datatracker.ietf.org/doc/draft-ietf-oauth-status-list/

pub mod bitstring;
pub mod core;
pub mod cose;
pub mod error;
pub mod jose;
pub mod list2021;
pub mod model;
pub mod provider;
pub mod service;
pub mod token;

pub use crate::core::{Kind, Quota};
pub use crate::error::Error;
