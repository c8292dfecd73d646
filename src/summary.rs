//! # Summary Credential Derivation
//!
//! Derives one rollup credential per wallet enumerating which special
//! credential categories it currently holds, so a verifier can check one
//! credential instead of several. Derivation is stateless and idempotent
//! over a fixed snapshot of the wallet's credentials; re-issuance is
//! triggered externally, typically after any special-credential issuance.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::event::{LifecycleEvent, UnitOfWork};
use crate::issue::{CredentialKind, IssuanceRequest, IssuanceService, DISMANTLER_TYPE, MEMBERSHIP_TYPE};
use crate::model::{CredentialSubject, VerifiableCredential};
use crate::provider::{ProofService, SecretVault};
use crate::query::CredentialQuery;
use crate::store::MemoryStore;

/// Credential type carried by summary credentials.
pub const SUMMARY_TYPE: &str = "SummaryCredential";

/// Credential type asserting a registered business partner number.
pub const BPN_TYPE: &str = "BpnCredential";

/// The derived rollup content: the item list and the rolled-up expiration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryPlan {
    /// One item per matched credential: its first non-base type.
    pub items: Vec<String>,

    /// Minimum expiration across the matched set, or `now` when empty.
    pub expiration: DateTime<Utc>,
}

/// The special credential categories included in the rollup: the configured
/// framework types plus BPN, dismantler, and membership.
fn special_types(config: &Config) -> Vec<String> {
    let mut types = config.framework_types.clone();
    types.extend([BPN_TYPE.into(), DISMANTLER_TYPE.into(), MEMBERSHIP_TYPE.into()]);
    types
}

/// Computes the rollup for `holder_bpn` over the current store snapshot:
/// all non-expired credentials issued by the authority wallet to the holder
/// whose type intersects the special set.
#[must_use]
pub fn plan(
    store: &MemoryStore, config: &Config, holder_bpn: &str, now: DateTime<Utc>,
) -> SummaryPlan {
    let query = CredentialQuery::new()
        .holder(config.did_for(holder_bpn))
        .issuer(config.did_for(&config.authority_bpn))
        .any_types(special_types(config))
        .expired(false)
        .as_of(now)
        // one page covering every match
        .page(0, usize::MAX);

    let matched = store.find_all(&query).items;

    let items = matched
        .iter()
        .filter_map(VerifiableCredential::specific_type)
        .map(ToString::to_string)
        .collect();

    let expiration = matched
        .iter()
        .filter_map(|vc| vc.expiration_date)
        .min()
        .unwrap_or(now);

    SummaryPlan { items, expiration }
}

impl<P: ProofService, V: SecretVault> IssuanceService<P, V> {
    /// Re-derives and issues the holder's summary credential from the
    /// authority wallet, replacing any previous one so a wallet carries at
    /// most one summary credential.
    ///
    /// # Errors
    ///
    /// As [`IssuanceService::issue`] for the underlying generic issuance.
    pub fn issue_summary(&self, holder_bpn: &str) -> Result<VerifiableCredential> {
        let now = Utc::now();
        let plan = plan(&self.store, &self.config, holder_bpn, now);
        let holder_did = self.config.did_for(holder_bpn);
        tracing::debug!(holder = %holder_bpn, items = ?plan.items, "deriving summary credential");

        // the previous rollup no longer reflects the wallet's holdings
        let previous = CredentialQuery::new().holder(holder_did.clone()).any_types([SUMMARY_TYPE]);
        if let Some(stale) = self.store.find_one(&previous) {
            let before = LifecycleEvent::CredentialDeleting { id: stale.id.clone() };
            let mut uow = UnitOfWork::begin(&self.bus, &before)?;
            self.store.remove_credential(&stale.id);
            uow.queue(LifecycleEvent::CredentialDeleted { id: stale.id });
            uow.commit();
        }

        let subject = CredentialSubject::with_id(&holder_did)
            .claim("holderIdentifier", holder_bpn)
            .claim("items", plan.items)
            .claim("contractTemplate", self.config.contract_template.clone())
            .claim("type", SUMMARY_TYPE);

        let kind = CredentialKind::Generic {
            types: vec![SUMMARY_TYPE.into()],
            contexts: Vec::new(),
            subjects: vec![subject],
        };
        let request = IssuanceRequest { kind, id: None, expiration: Some(plan.expiration) };
        let authority = self.config.authority_bpn.clone();
        self.issue(&authority, request)
    }
}
