//! # Credential Issuance
//!
//! Every credential kind flows through the same assembly: union the
//! configured base contexts with the kind's own and the signature-suite
//! context, union the base type with the requested types, default the id
//! and expiration, attach the kind's subject(s), then sign with the issuer
//! wallet's latest key and persist inside a lifecycle unit of work.
//!
//! The concrete kinds differ only in their subject schema and type set,
//! expressed as [`CredentialKind`] variants feeding the shared
//! [`assemble`] function.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{EventBus, LifecycleEvent, UnitOfWork};
use crate::model::{CredentialSubject, VerifiableCredential, VerifiablePresentation};
use crate::provider::{ProofService, SecretVault};
use crate::query::CredentialQuery;
use crate::store::MemoryStore;
use crate::wallet::Wallet;

/// Credential type carried by membership credentials.
pub const MEMBERSHIP_TYPE: &str = "MembershipCredential";

/// Credential type carried by dismantler credentials.
pub const DISMANTLER_TYPE: &str = "DismantlerCredential";

/// The credential kinds the engine can issue, each with its subject schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialKind {
    /// Caller-supplied subject(s), types, and contexts; no fixed schema.
    Generic {
        /// Additional credential types.
        types: Vec<String>,
        /// Additional `@context` entries.
        contexts: Vec<String>,
        /// One or more subjects.
        subjects: Vec<CredentialSubject>,
    },

    /// Asserts membership of the network. Authority-issued.
    Membership {
        /// Holder BPN.
        bpn: String,
        /// Organization display name.
        organization: String,
    },

    /// Asserts a certified dismantler. Authority-issued; a holder may carry
    /// at most one.
    Dismantler {
        /// Holder BPN.
        bpn: String,
        /// Certified activity, e.g. "vehicleDismantle".
        activity_type: String,
        /// Vehicle brands the certification covers. May be empty.
        allowed_vehicle_brands: Vec<String>,
    },

    /// Asserts agreement to a use-case framework contract. Authority-issued;
    /// the use-case type must be on the configured allow-list.
    Framework {
        /// Holder BPN.
        bpn: String,
        /// Framework credential type, e.g. "PcfCredential".
        use_case_type: String,
        /// Contract template URL.
        contract_template: String,
        /// Contract version.
        contract_version: String,
    },
}

impl CredentialKind {
    /// Kind label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic",
            Self::Membership { .. } => "membership",
            Self::Dismantler { .. } => "dismantler",
            Self::Framework { .. } => "framework",
        }
    }

    /// True for kinds only the authority wallet may issue.
    #[must_use]
    pub const fn restricted(&self) -> bool {
        !matches!(self, Self::Generic { .. })
    }

    /// Validates the kind's input and lowers it to assembly parts.
    /// Malformed input is rejected here, before any mutation.
    fn into_parts(self, config: &Config, now: DateTime<Utc>) -> Result<AssemblyParts> {
        match self {
            Self::Generic { types, contexts, subjects } => {
                if subjects.is_empty() {
                    return Err(Error::BadData("generic credential needs at least one subject".into()));
                }
                Ok(AssemblyParts { types, contexts, subjects })
            }
            Self::Membership { bpn, organization } => {
                let did = holder_did(config, &bpn)?;
                let subject = CredentialSubject::with_id(&did)
                    .claim("holderIdentifier", bpn)
                    .claim("memberOf", organization)
                    .claim("status", "Active")
                    .claim("startTime", now.to_rfc3339());
                Ok(AssemblyParts {
                    types: vec![MEMBERSHIP_TYPE.into()],
                    contexts: Vec::new(),
                    subjects: vec![subject],
                })
            }
            Self::Dismantler { bpn, activity_type, allowed_vehicle_brands } => {
                let did = holder_did(config, &bpn)?;
                let subject = CredentialSubject::with_id(&did)
                    .claim("holderIdentifier", bpn)
                    .claim("activityType", activity_type)
                    .claim("allowedVehicleBrands", allowed_vehicle_brands);
                Ok(AssemblyParts {
                    types: vec![DISMANTLER_TYPE.into()],
                    contexts: Vec::new(),
                    subjects: vec![subject],
                })
            }
            Self::Framework { bpn, use_case_type, contract_template, contract_version } => {
                if !config.supports_framework(&use_case_type) {
                    return Err(Error::BadData(format!(
                        "unsupported framework type {use_case_type}"
                    )));
                }
                let did = holder_did(config, &bpn)?;
                let subject = CredentialSubject::with_id(&did)
                    .claim("holderIdentifier", bpn)
                    .claim("useCaseType", use_case_type.clone())
                    .claim("contractTemplate", contract_template)
                    .claim("contractVersion", contract_version);
                Ok(AssemblyParts {
                    types: vec![use_case_type],
                    contexts: Vec::new(),
                    subjects: vec![subject],
                })
            }
        }
    }
}

fn holder_did(config: &Config, bpn: &str) -> Result<String> {
    if bpn.trim().is_empty() {
        return Err(Error::BadData("holder bpn must not be empty".into()));
    }
    Ok(config.did_for(bpn))
}

/// An issuance request: the kind plus the caller's optional id and
/// expiration overrides.
#[derive(Clone, Debug)]
pub struct IssuanceRequest {
    /// What to issue.
    pub kind: CredentialKind,

    /// Caller-supplied credential id; generated from the issuer DID when
    /// absent.
    pub id: Option<String>,

    /// Caller-supplied expiration; the configured default horizon applies
    /// when absent.
    pub expiration: Option<DateTime<Utc>>,
}

impl From<CredentialKind> for IssuanceRequest {
    fn from(kind: CredentialKind) -> Self {
        Self { kind, id: None, expiration: None }
    }
}

/// The kind-independent pieces fed into [`assemble`].
struct AssemblyParts {
    types: Vec<String>,
    contexts: Vec<String>,
    subjects: Vec<CredentialSubject>,
}

/// Builds the unsigned credential document: shared by every kind.
fn assemble(
    config: &Config, issuer_did: &str, parts: AssemblyParts, id: Option<String>,
    expiration: Option<DateTime<Utc>>, now: DateTime<Utc>,
) -> Result<VerifiableCredential> {
    let id = id.unwrap_or_else(|| format!("{issuer_did}#{}", Uuid::new_v4()));
    let expiry = expiration.unwrap_or_else(|| now + Duration::days(config.default_expiry_days));

    let mut builder = VerifiableCredential::builder()
        .id(id)
        .issuer(issuer_did)
        .issuance_date(now)
        .expiration_date(expiry);

    for context in config.base_contexts.iter().cloned().chain(parts.contexts) {
        builder = builder.add_context(context);
    }
    builder = builder.add_context(config.signature_context.clone());
    for type_ in parts.types {
        builder = builder.add_type(type_);
    }
    for subject in parts.subjects {
        builder = builder.add_subject(subject);
    }

    builder.build().map_err(Error::ExternalFailure)
}

/// Issues credentials and presentations on behalf of wallets.
#[derive(Debug)]
pub struct IssuanceService<P, V> {
    pub(crate) config: Config,
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) bus: EventBus,
    proofs: P,
    vault: V,
}

impl<P: ProofService, V: SecretVault> IssuanceService<P, V> {
    /// Returns a new service.
    #[must_use]
    pub fn new(
        config: Config, store: Arc<MemoryStore>, bus: EventBus, proofs: P, vault: V,
    ) -> Self {
        Self { config, store, bus, proofs, vault }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Issues and persists a signed credential from `issuer_bpn`'s wallet.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] — unknown issuer wallet.
    /// - [`Error::Forbidden`] — restricted kind from a non-authority wallet.
    /// - [`Error::Conflict`] — holder already carries a dismantler
    ///   credential, or the credential id is taken.
    /// - [`Error::BadData`] — malformed subject input or unsupported
    ///   framework type; rejected before any mutation.
    /// - [`Error::NoSigningKey`] — issuer wallet has no keys.
    /// - [`Error::ExternalFailure`] — vault or proof service failure.
    pub fn issue(
        &self, issuer_bpn: &str, request: impl Into<IssuanceRequest>,
    ) -> Result<VerifiableCredential> {
        let request = request.into();
        let wallet = self.store.wallet(issuer_bpn)?;
        tracing::debug!(kind = request.kind.label(), issuer = %issuer_bpn, "issuing credential");

        if request.kind.restricted() && issuer_bpn != self.config.authority_bpn {
            return Err(Error::Forbidden(format!(
                "only the authority wallet may issue {} credentials",
                request.kind.label()
            )));
        }

        if let CredentialKind::Dismantler { bpn, .. } = &request.kind {
            let held = CredentialQuery::new()
                .holder(self.config.did_for(bpn))
                .any_types([DISMANTLER_TYPE]);
            if self.store.exists(&held) {
                return Err(Error::Conflict(format!(
                    "{bpn} already holds a dismantler credential"
                )));
            }
        }

        let now = Utc::now();
        let parts = request.kind.into_parts(&self.config, now)?;
        let issuer_did = wallet.did(&self.config);
        let unsigned = assemble(&self.config, &issuer_did, parts, request.id, request.expiration, now)?;
        let signed = self.sign(&wallet, unsigned)?;

        let before = LifecycleEvent::CredentialCreating { id: signed.id.clone() };
        let mut uow = UnitOfWork::begin(&self.bus, &before)?;
        self.store.insert_credential(signed.clone())?;
        uow.queue(LifecycleEvent::CredentialCreated { id: signed.id.clone() });
        uow.commit();

        Ok(signed)
    }

    /// Signs an unsigned document with the wallet's latest key.
    pub(crate) fn sign(
        &self, wallet: &Wallet, mut vc: VerifiableCredential,
    ) -> Result<VerifiableCredential> {
        let key = wallet
            .latest_key()
            .ok_or_else(|| Error::NoSigningKey(wallet.bpn.clone()))?;
        let key_bytes = self.vault.resolve(&key.secret)?;
        let verification_method = format!("{}#{}", wallet.did(&self.config), key.fragment);

        let document: Value = serde_json::to_value(&vc)?;
        let proof = self.proofs.create_proof(&document, &verification_method, &key_bytes)?;
        vc.proof = Some(proof);
        Ok(vc)
    }

    /// Builds an unsigned presentation bundling `credentials` for
    /// `holder_bpn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown wallet, [`Error::BadData`]
    /// for an empty credential list.
    pub fn build_presentation(
        &self, holder_bpn: &str, credentials: Vec<VerifiableCredential>,
    ) -> Result<VerifiablePresentation> {
        let wallet = self.store.wallet(holder_bpn)?;
        let mut builder = VerifiablePresentation::builder().holder(wallet.did(&self.config));
        for vc in credentials {
            builder = builder.add_credential(vc);
        }
        builder.build().map_err(|e| Error::BadData(e.to_string()))
    }

    /// Signs `credentials` into a JWT presentation with the holder wallet's
    /// latest key, optionally bound to `audience`.
    ///
    /// # Errors
    ///
    /// As [`IssuanceService::issue`] for wallet/key/vault failures;
    /// [`Error::BadData`] for an empty credential list.
    pub fn create_presentation_jwt(
        &self, holder_bpn: &str, credentials: &[VerifiableCredential], audience: Option<&str>,
    ) -> Result<String> {
        if credentials.is_empty() {
            return Err(Error::BadData("presentation needs at least one credential".into()));
        }
        let wallet = self.store.wallet(holder_bpn)?;
        let key = wallet
            .latest_key()
            .ok_or_else(|| Error::NoSigningKey(wallet.bpn.clone()))?;
        let key_bytes = self.vault.resolve(&key.secret)?;

        let token = self.proofs.create_presentation_jwt(
            &wallet.did(&self.config),
            credentials,
            audience,
            &key_bytes,
        )?;
        Ok(token)
    }
}
