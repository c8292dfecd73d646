//! # Collaborator Capabilities
//!
//! Traits the engine expects its host to implement: cryptographic proof
//! generation/verification and secret-key resolution. All methods are
//! synchronous and blocking; failures are wrapped by the engine as
//! [`crate::Error::ExternalFailure`] and are fatal for the one call.

use serde_json::Value;

use crate::model::{Proof, VerifiableCredential, VerifiablePresentation};
use crate::wallet::SecretHandle;

/// Raw signing-key material resolved from the vault. Never persisted.
#[derive(Clone)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    /// Wraps resolved key material.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for KeyBytes {
    // key material stays out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyBytes(..)")
    }
}

/// A presentation decoded from a signed JWT by the proof service.
#[derive(Clone, Debug)]
pub struct DecodedPresentation {
    /// The presentation reconstructed from the token claims.
    pub presentation: VerifiablePresentation,

    /// The `aud` claim, if present.
    pub audience: Option<String>,
}

/// Linked-data proof signing and verification, plus the JWT presentation
/// codec. Implemented by the host's signing service.
pub trait ProofService: Send + Sync {
    /// Creates a proof over the unsigned `document`, bound to
    /// `verification_method`.
    ///
    /// # Errors
    ///
    /// Fails if the signing backend rejects the document or key.
    fn create_proof(
        &self, document: &Value, verification_method: &str, key: &KeyBytes,
    ) -> anyhow::Result<Proof>;

    /// Verifies the embedded proof of a signed document. `Ok(false)` means
    /// the signature did not verify; `Err` means verification could not be
    /// attempted. The validation engine treats both as "not valid".
    ///
    /// # Errors
    ///
    /// Fails if verification could not be attempted.
    fn verify(&self, document: &Value) -> anyhow::Result<bool>;

    /// Signs `credentials` into a compact-JWT presentation issued by
    /// `issuer_did`, optionally bound to `audience`.
    ///
    /// # Errors
    ///
    /// Fails if the signing backend rejects the request.
    fn create_presentation_jwt(
        &self, issuer_did: &str, credentials: &[VerifiableCredential], audience: Option<&str>,
        key: &KeyBytes,
    ) -> anyhow::Result<String>;

    /// Parses and verifies a JWT presentation token.
    ///
    /// # Errors
    ///
    /// Fails if the token cannot be parsed or its signature does not verify.
    fn verify_jwt(&self, token: &str) -> anyhow::Result<DecodedPresentation>;
}

/// Resolution of an opaque secret handle to usable key material.
/// Implemented by the host's secret vault.
pub trait SecretVault: Send + Sync {
    /// Resolves `handle` to raw key bytes. Resolution failure is fatal for
    /// the calling operation and is not retried.
    ///
    /// # Errors
    ///
    /// Fails if the handle is unknown or the vault is unreachable.
    fn resolve(&self, handle: &SecretHandle) -> anyhow::Result<KeyBytes>;
}
