//! Lifecycle event semantics: before/after-commit pairs, conflict behavior,
//! desired-state deletes, and before-phase aborts.

mod common;

use std::sync::Arc;

use managed_wallet::{
    Config, CredentialKind, Error, EventBus, EventSubscriber, IssuanceService, LifecycleEvent,
    MemoryStore, Result, WalletService,
};

use common::{engine, Recorder, StubProofs, StubVault, AUTHORITY, TENANT};

#[test]
fn wallet_create_fires_event_pair() {
    let engine = engine();
    engine.wallets.create("BPNL000000000005", "Tenant Five").expect("should create");

    assert_eq!(
        engine.events.events(),
        vec![
            LifecycleEvent::WalletCreating { bpn: "BPNL000000000005".into() },
            LifecycleEvent::WalletCreated { bpn: "BPNL000000000005".into() },
        ]
    );
}

#[test]
fn duplicate_wallet_create_conflicts_without_after_event() {
    let engine = engine();
    let before = engine.store.wallet_count();

    let second = engine.wallets.create(TENANT, "Shadow Tenant");
    assert!(matches!(second, Err(Error::Conflict(_))));
    assert_eq!(engine.store.wallet_count(), before, "row count unchanged");

    // the before event fired, the after-commit event did not
    assert_eq!(
        engine.events.events(),
        vec![LifecycleEvent::WalletCreating { bpn: TENANT.into() }]
    );
}

#[test]
fn delete_of_never_existed_credential_still_fires_pair() {
    let engine = engine();
    let credentials = engine.store.credential_count();
    let wallets = engine.store.wallet_count();

    engine.wallets.delete_credential("urn:uuid:never-existed").expect("delete is a no-op");

    assert_eq!(
        engine.events.events(),
        vec![
            LifecycleEvent::CredentialDeleting { id: "urn:uuid:never-existed".into() },
            LifecycleEvent::CredentialDeleted { id: "urn:uuid:never-existed".into() },
        ],
        "desired-state semantics: the pair fires regardless"
    );
    assert_eq!(engine.store.credential_count(), credentials);
    assert_eq!(engine.store.wallet_count(), wallets);
}

#[test]
fn issuance_fires_credential_event_pair() {
    let engine = engine();
    let vc = engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Membership { bpn: TENANT.into(), organization: "Tenant One".into() },
        )
        .expect("should issue");

    assert_eq!(
        engine.events.events(),
        vec![
            LifecycleEvent::CredentialCreating { id: vc.id.clone() },
            LifecycleEvent::CredentialCreated { id: vc.id },
        ]
    );
}

#[test]
fn credential_delete_removes_queryability() {
    let engine = engine();
    let vc = engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Membership { bpn: TENANT.into(), organization: "Tenant One".into() },
        )
        .expect("should issue");

    engine.wallets.delete_credential(&vc.id).expect("should delete");
    assert!(!engine
        .store
        .exists(&managed_wallet::CredentialQuery::new().id(&vc.id)));
}

/// Vetoes every before-phase create event.
struct VetoCreates;

impl EventSubscriber for VetoCreates {
    fn on_event(&self, event: &LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::WalletCreating { .. } | LifecycleEvent::CredentialCreating { .. } => {
                Err(Error::Forbidden("creation vetoed".into()))
            }
            _ => Ok(()),
        }
    }
}

#[test]
fn before_phase_veto_aborts_and_persists_nothing() {
    let config = Config::default();
    let store = Arc::new(MemoryStore::new(&config));
    let recorder = Arc::new(Recorder::default());
    let mut bus = EventBus::new();
    bus.subscribe(Arc::new(VetoCreates));
    bus.subscribe(recorder.clone());

    let wallets = WalletService::new(store.clone(), bus.clone());
    let issuer = IssuanceService::new(config, store.clone(), bus, StubProofs, StubVault);

    let created = wallets.create(TENANT, "Vetoed Tenant");
    assert!(matches!(created, Err(Error::Forbidden(_))));
    assert_eq!(store.wallet_count(), 0);
    assert!(recorder.events().is_empty(), "veto stopped later subscribers too");

    let issued = issuer.issue(
        TENANT,
        CredentialKind::Generic { types: vec![], contexts: vec![], subjects: vec![] },
    );
    assert!(issued.is_err());
    assert_eq!(store.credential_count(), 0);
}

#[test]
fn wallet_delete_is_desired_state_and_keeps_credentials() {
    let engine = engine();
    let vc = engine
        .issuer
        .issue(
            AUTHORITY,
            CredentialKind::Membership { bpn: TENANT.into(), organization: "Tenant One".into() },
        )
        .expect("should issue");
    engine.events.clear();

    engine.wallets.delete(TENANT).expect("should delete wallet");
    assert!(matches!(engine.wallets.get(TENANT), Err(Error::NotFound(_))));
    assert!(
        engine.store.exists(&managed_wallet::CredentialQuery::new().id(&vc.id)),
        "credentials are not cascade-deleted"
    );

    engine.events.clear();
    engine.wallets.delete(TENANT).expect("second delete is a state no-op");
    assert_eq!(
        engine.events.events(),
        vec![
            LifecycleEvent::WalletDeleting { bpn: TENANT.into() },
            LifecycleEvent::WalletDeleted { bpn: TENANT.into() },
        ]
    );
}
