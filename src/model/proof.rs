//! # Embedded Proofs
//!
//! The embedded proof block attached to a signed credential or presentation,
//! per [VC Data Integrity]. Proof generation and verification are delegated
//! to the [`crate::provider::ProofService`] collaborator; this module only
//! models the block.
//!
//! [VC Data Integrity]: https://www.w3.org/TR/vc-data-integrity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cryptographic proof embedded in a credential or presentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Proof {
    /// The proof type, e.g. "`JsonWebSignature2020`". Determines the fields
    /// required to verify the proof.
    #[serde(rename = "type")]
    pub type_: String,

    /// The date-time the proof was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// The reason for the proof, e.g. "`assertionMethod`".
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,

    /// URI resolving to the verification key, e.g.
    /// `did:web:host:BPNL...#key-1`.
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// The encoded proof value.
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

impl Proof {
    /// True if the proof carries no usable type — treated as no signature
    /// at all by the validation engine.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.type_.trim().is_empty()
    }
}
