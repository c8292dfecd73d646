#![allow(dead_code)]

//! Shared harness for integration tests: a deterministic proof service and
//! vault, a recording event subscriber, and a pre-seeded engine with an
//! authority wallet and one tenant wallet.

use std::sync::{Arc, Mutex, Once};

use anyhow::bail;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use managed_wallet::provider::{DecodedPresentation, KeyBytes, ProofService, SecretVault};
use managed_wallet::{
    Config, EventBus, EventSubscriber, IssuanceService, KeyEntry, LifecycleEvent, MemoryStore,
    Proof, SecretHandle, Validator, VerifiableCredential, VerifiablePresentation, WalletService,
};

/// BPN of the pre-seeded authority wallet.
pub const AUTHORITY: &str = "BPNL000000000000";

/// BPN of the pre-seeded tenant wallet.
pub const TENANT: &str = "BPNL000000000001";

static INIT: Once = Once::new();

fn init_tracer() {
    INIT.call_once(|| {
        tracing_subscriber::fmt().with_max_level(tracing::Level::ERROR).init();
    });
}

/// A proof service that "signs" by encoding the canonicalized document, so
/// verification honestly detects tampering without real cryptography.
#[derive(Clone, Copy, Debug)]
pub struct StubProofs;

fn canonical(document: &Value) -> String {
    let mut doc = document.clone();
    if let Some(map) = doc.as_object_mut() {
        map.remove("proof");
    }
    doc.to_string()
}

fn stub_signature() -> String {
    Base64UrlUnpadded::encode_string(b"stub-signature")
}

#[derive(Deserialize, Serialize)]
struct VpClaims {
    iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    vp: VerifiablePresentation,
}

impl ProofService for StubProofs {
    fn create_proof(
        &self, document: &Value, verification_method: &str, key: &KeyBytes,
    ) -> anyhow::Result<Proof> {
        let mut payload = canonical(document).into_bytes();
        payload.extend_from_slice(key.as_bytes());
        Ok(Proof {
            type_: "JsonWebSignature2020".into(),
            created: Some(Utc::now()),
            proof_purpose: "assertionMethod".into(),
            verification_method: verification_method.into(),
            proof_value: Base64UrlUnpadded::encode_string(&payload),
        })
    }

    fn verify(&self, document: &Value) -> anyhow::Result<bool> {
        let Some(proof) = document.get("proof") else {
            bail!("document carries no proof");
        };
        let proof_value = proof["proofValue"].as_str().unwrap_or_default();
        let decoded = Base64UrlUnpadded::decode_vec(proof_value)?;
        Ok(decoded.starts_with(canonical(document).as_bytes()))
    }

    fn create_presentation_jwt(
        &self, issuer_did: &str, credentials: &[VerifiableCredential], audience: Option<&str>,
        _key: &KeyBytes,
    ) -> anyhow::Result<String> {
        let mut builder = VerifiablePresentation::builder().holder(issuer_did);
        for vc in credentials {
            builder = builder.add_credential(vc.clone());
        }
        let claims = VpClaims {
            iss: issuer_did.into(),
            aud: audience.map(Into::into),
            vp: builder.build()?,
        };

        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"EdDSA","typ":"JWT"}"#);
        let payload = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&claims)?);
        Ok(format!("{header}.{payload}.{}", stub_signature()))
    }

    fn verify_jwt(&self, token: &str) -> anyhow::Result<DecodedPresentation> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            bail!("malformed token");
        }
        if segments[2] != stub_signature() {
            bail!("signature mismatch");
        }
        let claims: VpClaims =
            serde_json::from_slice(&Base64UrlUnpadded::decode_vec(segments[1])?)?;
        Ok(DecodedPresentation { presentation: claims.vp, audience: claims.aud })
    }
}

/// A vault that derives key bytes from the handle itself. Handles prefixed
/// `missing` fail resolution.
#[derive(Clone, Copy, Debug)]
pub struct StubVault;

impl SecretVault for StubVault {
    fn resolve(&self, handle: &SecretHandle) -> anyhow::Result<KeyBytes> {
        if handle.as_str().starts_with("missing") {
            bail!("no secret behind handle {}", handle.as_str());
        }
        Ok(KeyBytes::new(handle.as_str().as_bytes().to_vec()))
    }
}

/// Records every lifecycle event it sees.
#[derive(Default)]
pub struct Recorder {
    seen: Mutex<Vec<LifecycleEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.seen.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }
}

impl EventSubscriber for Recorder {
    fn on_event(&self, event: &LifecycleEvent) -> managed_wallet::Result<()> {
        self.seen.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A fully wired engine over the in-memory store and stub collaborators.
pub struct Engine {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub wallets: WalletService,
    pub issuer: IssuanceService<StubProofs, StubVault>,
    pub validator: Validator<StubProofs>,
    pub events: Arc<Recorder>,
}

/// Builds an engine pre-seeded with the authority wallet and one tenant
/// wallet, each holding one signing key.
pub fn engine() -> Engine {
    init_tracer();

    let config = Config::default();
    let store = Arc::new(MemoryStore::new(&config));
    let events = Arc::new(Recorder::default());
    let mut bus = EventBus::new();
    bus.subscribe(events.clone());

    let wallets = WalletService::new(store.clone(), bus.clone());
    let issuer =
        IssuanceService::new(config.clone(), store.clone(), bus, StubProofs, StubVault);

    wallets.create(AUTHORITY, "Authority Operator").expect("should create authority wallet");
    wallets
        .add_key(AUTHORITY, KeyEntry::new("key-1", SecretHandle::new("vault:authority")))
        .expect("should add authority key");
    wallets.create(TENANT, "Tenant One GmbH").expect("should create tenant wallet");
    wallets
        .add_key(TENANT, KeyEntry::new("key-1", SecretHandle::new("vault:tenant")))
        .expect("should add tenant key");
    events.clear();

    Engine { config, store, wallets, issuer, validator: Validator::new(StubProofs), events }
}
