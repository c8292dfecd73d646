//! # Verifiable Presentations
//!
//! A presentation bundles credentials for delivery to a verifier. It is
//! built transiently — never persisted — and may additionally exist as a
//! signed JWT produced by the [`crate::provider::ProofService`].

use std::str::FromStr;

use anyhow::bail;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BASE_PRESENTATION_TYPE;
use crate::model::{proof::Proof, vc::VerifiableCredential};

/// A W3C Verifiable Presentation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifiablePresentation {
    /// The `@context` property.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Unique identifier for the presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The presentation type set. Always contains
    /// "`VerifiablePresentation`".
    #[serde(rename = "type")]
    pub type_: Vec<String>,

    /// The embedded credentials, in the order supplied by the holder.
    pub verifiable_credential: Vec<VerifiableCredential>,

    /// DID of the wallet generating the presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    /// The embedded proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiablePresentation {
    /// Returns a new [`VpBuilder`].
    #[must_use]
    pub fn builder() -> VpBuilder {
        VpBuilder::new()
    }
}

impl FromStr for VerifiablePresentation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self, Self::Err> {
        if !s.starts_with('{') {
            // base64 encoded string
            let dec = Base64UrlUnpadded::decode_vec(s)?;
            return Ok(serde_json::from_slice(dec.as_slice())?);
        }

        // stringified JSON
        Ok(serde_json::from_str(s)?)
    }
}

/// [`VpBuilder`] assembles a [`VerifiablePresentation`].
#[derive(Clone, Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct VpBuilder {
    vp: VerifiablePresentation,
}

impl VpBuilder {
    /// Returns a new [`VpBuilder`] with a generated urn:uuid id and the base
    /// presentation type.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.vp.id = Some(format!("urn:uuid:{}", Uuid::new_v4()));
        builder.vp.context.push("https://www.w3.org/2018/credentials/v1".into());
        builder.vp.type_.push(BASE_PRESENTATION_TYPE.into());
        builder
    }

    /// Appends a `@context` entry.
    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.vp.context.push(context.into());
        self
    }

    /// Overrides the generated `id`.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.vp.id = Some(id.into());
        self
    }

    /// Appends a presentation type.
    #[must_use]
    pub fn add_type(mut self, type_: impl Into<String>) -> Self {
        self.vp.type_.push(type_.into());
        self
    }

    /// Appends a credential.
    #[must_use]
    pub fn add_credential(mut self, vc: VerifiableCredential) -> Self {
        self.vp.verifiable_credential.push(vc);
        self
    }

    /// Sets the `holder` property.
    #[must_use]
    pub fn holder(mut self, holder: impl Into<String>) -> Self {
        self.vp.holder = Some(holder.into());
        self
    }

    /// Builds the presentation.
    ///
    /// # Errors
    ///
    /// Fails if the presentation carries no credentials.
    pub fn build(self) -> anyhow::Result<VerifiablePresentation> {
        if self.vp.verifiable_credential.is_empty() {
            bail!("no credential set");
        }
        Ok(self.vp)
    }
}
