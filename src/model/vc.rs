//! # Verifiable Credentials
//!
//! The credential document and its builder. A credential is immutable once
//! signed: the engine only ever attaches a proof to a freshly built document
//! and persists the result as an opaque blob.

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::BASE_CREDENTIAL_TYPE;
use crate::model::{proof::Proof, OneOrMany};

/// A W3C Verifiable Credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiableCredential {
    /// The `@context` property: an ordered set of context URIs, de-duplicated
    /// in order of first appearance.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The credential's URI.
    pub id: String,

    /// The credential type set. Always contains
    /// "`VerifiableCredential`" plus the specific type(s) of the claims.
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// DID of the issuing wallet.
    pub issuer: String,

    /// RFC3339 date-time the credential becomes valid.
    pub issuance_date: DateTime<Utc>,

    /// RFC3339 date-time the credential ceases to be valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Claims about the credential subject(s).
    pub credential_subject: OneOrMany<CredentialSubject>,

    /// The embedded proof. Present on every signed credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Returns a new [`VcBuilder`].
    #[must_use]
    pub fn builder() -> VcBuilder {
        VcBuilder::new()
    }

    /// True if the credential carries the given type.
    #[must_use]
    pub fn has_type(&self, type_: &str) -> bool {
        self.type_.iter().any(|t| t == type_)
    }

    /// The first type that is not the base credential type, if any.
    #[must_use]
    pub fn specific_type(&self) -> Option<&str> {
        self.type_.iter().find(|t| *t != BASE_CREDENTIAL_TYPE).map(String::as_str)
    }

    /// DID of the first credential subject carrying an id — the holder the
    /// credential was issued to.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        self.credential_subject.iter().find_map(|subject| subject.id.as_deref())
    }

    /// True if an expiration date exists and lies before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|expiry| expiry < now)
    }
}

/// Claims about a subject of the credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CredentialSubject {
    /// DID of the subject of the claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Claims about the subject.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl CredentialSubject {
    /// Returns a subject with the given id and no claims.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), claims: Map::new() }
    }

    /// Adds a claim about the subject.
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }
}

/// [`VcBuilder`] assembles a [`VerifiableCredential`], enforcing the
/// structural invariants on [`VcBuilder::build`].
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct VcBuilder {
    vc: VerifiableCredential,
    subjects: Vec<CredentialSubject>,
}

impl VcBuilder {
    /// Returns a new [`VcBuilder`] carrying the base credential type.
    #[must_use]
    pub fn new() -> Self {
        tracing::debug!("VcBuilder::new");

        let mut builder = Self::default();
        builder.vc.type_.push(BASE_CREDENTIAL_TYPE.into());
        builder.vc.issuance_date = Utc::now();
        builder
    }

    /// Appends a `@context` entry. Duplicates are dropped on build,
    /// preserving first-appearance order.
    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.vc.context.push(context.into());
        self
    }

    /// Sets the `id` property.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vc.id = id.into();
        self
    }

    /// Appends a credential type. Duplicates are dropped on build.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        self.vc.type_.push(type_.into());
        self
    }

    /// Sets the `issuer` property.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.vc.issuer = issuer.into();
        self
    }

    /// Sets the `issuanceDate` property.
    #[must_use]
    pub fn issuance_date(mut self, issued: DateTime<Utc>) -> Self {
        self.vc.issuance_date = issued;
        self
    }

    /// Sets the `expirationDate` property.
    #[must_use]
    pub fn expiration_date(mut self, expiry: DateTime<Utc>) -> Self {
        self.vc.expiration_date = Some(expiry);
        self
    }

    /// Adds a `credentialSubject` entry.
    #[must_use]
    pub fn add_subject(mut self, subject: CredentialSubject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Builds the credential.
    ///
    /// # Errors
    ///
    /// Fails if any mandatory field is missing or empty.
    pub fn build(mut self) -> anyhow::Result<VerifiableCredential> {
        tracing::debug!("VcBuilder::build");

        self.vc.context = crate::model::dedup_preserve(self.vc.context);
        self.vc.type_ = crate::model::dedup_preserve(self.vc.type_);

        if self.vc.context.is_empty() {
            bail!("no context set");
        }
        if self.vc.id.is_empty() {
            bail!("no id set");
        }
        if self.vc.issuer.is_empty() {
            bail!("no issuer set");
        }
        if self.subjects.is_empty() {
            bail!("no credential subject set");
        }

        self.vc.credential_subject = self.subjects.into();
        Ok(self.vc)
    }
}
