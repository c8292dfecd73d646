//! # Validation Engine
//!
//! Computes validation outcomes for credentials, presentation objects, and
//! JWT presentation tokens. An invalid artifact is a normal, successfully
//! computed result — the engine only errors when it cannot compute at all,
//! and collaborator verification failures are classified as violations,
//! never re-thrown.
//!
//! The object path and the token path are intentionally separate: they
//! produce different result types with different violation coverage.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::BASE_PRESENTATION_TYPE;
use crate::model::{VerifiableCredential, VerifiablePresentation};
use crate::provider::ProofService;

/// A single validation violation, drawn from a fixed vocabulary.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Violation {
    /// An expiration timestamp exists and lies in the past.
    Expired,

    /// The document fails the structural check.
    InvalidStructure,

    /// A proof is present but did not verify.
    InvalidSignature,

    /// No proof block, or an empty proof type.
    NoEmbeddedSignature,
}

/// The outcome of validating one credential or one presentation envelope.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Violations in the order the checks run.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Valid iff no violations accumulated.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The outcome of validating a presentation object: the envelope's own
/// result plus one result per embedded credential, in order.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresentationValidation {
    /// Violations against the presentation's own envelope.
    pub presentation: ValidationResult,

    /// One result per embedded credential.
    pub credentials: Vec<ValidationResult>,
}

impl PresentationValidation {
    /// Valid iff the envelope is clean and every embedded credential is
    /// valid.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.presentation.valid() && self.credentials.iter().all(ValidationResult::valid)
    }
}

/// The outcome of the token path. Audience mismatch is reported as a
/// boolean, not a violation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    /// Violations classified while parsing/verifying the token.
    pub violations: Vec<Violation>,

    /// True if the token's `aud` claim matches the expected audience, or no
    /// audience was expected.
    pub audience_matches: bool,
}

impl TokenValidation {
    /// Valid iff no violations were classified. The audience flag is
    /// reported separately.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The validation engine.
#[derive(Debug)]
pub struct Validator<P> {
    proofs: P,
}

impl<P: ProofService> Validator<P> {
    /// Returns a new validator delegating signature checks to `proofs`.
    #[must_use]
    pub fn new(proofs: P) -> Self {
        Self { proofs }
    }

    /// Validates one credential: expiry, structure, and signature checks
    /// run independently and accumulate.
    #[must_use]
    pub fn validate_credential(&self, vc: &VerifiableCredential) -> ValidationResult {
        let mut violations = Vec::new();

        if vc.is_expired(Utc::now()) {
            violations.push(Violation::Expired);
        }
        if !credential_structure_ok(vc) {
            violations.push(Violation::InvalidStructure);
        }
        match &vc.proof {
            None => violations.push(Violation::NoEmbeddedSignature),
            Some(proof) if proof.is_unsigned() => {
                violations.push(Violation::NoEmbeddedSignature);
            }
            Some(_) => {
                if !self.signature_verifies(vc) {
                    violations.push(Violation::InvalidSignature);
                }
            }
        }

        ValidationResult { violations }
    }

    /// Validates a presentation object: the envelope's own structure and
    /// signature, plus every embedded credential recursively.
    #[must_use]
    pub fn validate_presentation(&self, vp: &VerifiablePresentation) -> PresentationValidation {
        let mut violations = Vec::new();

        if !presentation_structure_ok(vp) {
            violations.push(Violation::InvalidStructure);
        }
        match &vp.proof {
            None => violations.push(Violation::NoEmbeddedSignature),
            Some(proof) if proof.is_unsigned() => {
                violations.push(Violation::NoEmbeddedSignature);
            }
            Some(_) => {
                let verified = serde_json::to_value(vp)
                    .map_or(false, |doc| self.proofs.verify(&doc).unwrap_or(false));
                if !verified {
                    violations.push(Violation::InvalidSignature);
                }
            }
        }

        let credentials = vp
            .verifiable_credential
            .iter()
            .map(|vc| self.validate_credential(vc))
            .collect();

        PresentationValidation { presentation: ValidationResult { violations }, credentials }
    }

    /// Validates a JWT presentation token. Parse/verification failures are
    /// classified as [`Violation::InvalidSignature`]; expiry of any
    /// contained credential is classified as [`Violation::Expired`]. When
    /// `expected_audience` is absent the audience check trivially passes.
    #[must_use]
    pub fn validate_token(&self, token: &str, expected_audience: Option<&str>) -> TokenValidation {
        let decoded = match self.proofs.verify_jwt(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("token verification failed: {e}");
                return TokenValidation {
                    violations: vec![Violation::InvalidSignature],
                    audience_matches: expected_audience.is_none(),
                };
            }
        };

        let mut violations = Vec::new();
        let now = Utc::now();
        if decoded.presentation.verifiable_credential.iter().any(|vc| vc.is_expired(now)) {
            violations.push(Violation::Expired);
        }

        let audience_matches = match expected_audience {
            None => true,
            Some(expected) => decoded.audience.as_deref() == Some(expected),
        };

        TokenValidation { violations, audience_matches }
    }

    fn signature_verifies(&self, vc: &VerifiableCredential) -> bool {
        let Ok(document) = serde_json::to_value(vc) else {
            return false;
        };
        // a verify error from the collaborator means "not valid", never an error
        self.proofs.verify(&document).unwrap_or(false)
    }
}

/// The structural/schema check for credentials.
fn credential_structure_ok(vc: &VerifiableCredential) -> bool {
    !vc.id.trim().is_empty()
        && !vc.issuer.trim().is_empty()
        && !vc.context.is_empty()
        && vc.has_type(crate::config::BASE_CREDENTIAL_TYPE)
        && !vc.credential_subject.is_empty()
}

fn presentation_structure_ok(vp: &VerifiablePresentation) -> bool {
    vp.type_.iter().any(|t| t == BASE_PRESENTATION_TYPE)
        && !vp.verifiable_credential.is_empty()
}
