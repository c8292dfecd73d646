//! # Wallets & Keys
//!
//! Tenant wallet identity and signing-key references. A wallet owns an
//! ordered set of key references; key material itself lives behind the
//! [`crate::provider::SecretVault`]. The single key-selection rule is
//! [`Wallet::latest_key`]: the key with the maximum creation timestamp.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{EventBus, LifecycleEvent, UnitOfWork};
use crate::store::MemoryStore;

/// Opaque reference to key material held by the secret vault. The raw key
/// never enters the store.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SecretHandle(String);

impl SecretHandle {
    /// Wraps a vault reference.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The vault reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A signing-key reference. Immutable after creation; superseded by adding
/// a newer key, never updated.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyEntry {
    /// Unique key id.
    pub id: Uuid,

    /// Creation timestamp — the ordering key for [`Wallet::latest_key`].
    pub created: DateTime<Utc>,

    /// DID-fragment label; the verification method is `did + "#" + fragment`.
    pub fragment: String,

    /// Vault reference for the private key.
    pub secret: SecretHandle,
}

impl KeyEntry {
    /// Returns a new key reference created now.
    #[must_use]
    pub fn new(fragment: impl Into<String>, secret: SecretHandle) -> Self {
        Self { id: Uuid::new_v4(), created: Utc::now(), fragment: fragment.into(), secret }
    }
}

/// A tenant wallet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Wallet {
    /// Business-partner number — the globally unique wallet id.
    pub bpn: String,

    /// Display name.
    pub name: String,

    /// Creation timestamp.
    pub created: DateTime<Utc>,

    /// Key references, in creation order. May legally be empty: such a
    /// wallet exists but cannot sign.
    pub keys: Vec<KeyEntry>,
}

impl Wallet {
    /// Returns a new wallet with no keys.
    #[must_use]
    pub fn new(bpn: impl Into<String>, name: impl Into<String>) -> Self {
        Self { bpn: bpn.into(), name: name.into(), created: Utc::now(), keys: Vec::new() }
    }

    /// The wallet DID, derived from its BPN.
    #[must_use]
    pub fn did(&self, config: &Config) -> String {
        config.did_for(&self.bpn)
    }

    /// The key with the maximum creation timestamp — the only key-selection
    /// rule, applied to every signing operation.
    #[must_use]
    pub fn latest_key(&self) -> Option<&KeyEntry> {
        self.keys.iter().max_by_key(|key| key.created)
    }
}

/// Wallet and key CRUD, wrapped in lifecycle events.
#[derive(Clone, Debug)]
pub struct WalletService {
    store: Arc<MemoryStore>,
    bus: EventBus,
}

impl WalletService {
    /// Returns a new service over `store`, publishing to `bus`.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Creates a wallet for a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if a wallet with the BPN already exists;
    /// [`Error::BadData`] if the BPN is empty.
    pub fn create(&self, bpn: impl Into<String>, name: impl Into<String>) -> Result<Wallet> {
        let wallet = Wallet::new(bpn, name);
        if wallet.bpn.trim().is_empty() {
            return Err(Error::BadData("wallet bpn must not be empty".into()));
        }
        tracing::debug!(bpn = %wallet.bpn, "creating wallet");

        let before = LifecycleEvent::WalletCreating { bpn: wallet.bpn.clone() };
        let mut uow = UnitOfWork::begin(&self.bus, &before)?;
        self.store.insert_wallet(wallet.clone())?;
        uow.queue(LifecycleEvent::WalletCreated { bpn: wallet.bpn.clone() });
        uow.commit();

        Ok(wallet)
    }

    /// Fetches a wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no wallet carries the BPN.
    pub fn get(&self, bpn: &str) -> Result<Wallet> {
        self.store.wallet(bpn)
    }

    /// Updates a wallet's display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no wallet carries the BPN.
    pub fn rename(&self, bpn: &str, name: impl Into<String>) -> Result<()> {
        self.store.rename_wallet(bpn, name.into())
    }

    /// Adds a signing-key reference to a wallet. The new key supersedes
    /// older ones for all subsequent signing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no wallet carries the BPN.
    pub fn add_key(&self, bpn: &str, key: KeyEntry) -> Result<()> {
        tracing::debug!(%bpn, fragment = %key.fragment, "adding key");
        self.store.add_key(bpn, key)
    }

    /// Deletes a wallet and its key references. Credentials are not
    /// cascade-deleted. Deleting a non-existent wallet is a state no-op
    /// that still fires the full event pair.
    ///
    /// # Errors
    ///
    /// Propagates a before-event abort.
    pub fn delete(&self, bpn: &str) -> Result<()> {
        let before = LifecycleEvent::WalletDeleting { bpn: bpn.into() };
        let mut uow = UnitOfWork::begin(&self.bus, &before)?;
        let existed = self.store.remove_wallet(bpn);
        uow.queue(LifecycleEvent::WalletDeleted { bpn: bpn.into() });
        uow.commit();

        tracing::debug!(%bpn, existed, "wallet deleted");
        Ok(())
    }

    /// Deletes a credential by id. Desired-state semantics: deleting a
    /// non-existent id succeeds and still fires the event pair.
    ///
    /// # Errors
    ///
    /// Propagates a before-event abort.
    pub fn delete_credential(&self, id: &str) -> Result<()> {
        let before = LifecycleEvent::CredentialDeleting { id: id.into() };
        let mut uow = UnitOfWork::begin(&self.bus, &before)?;
        let existed = self.store.remove_credential(id);
        uow.queue(LifecycleEvent::CredentialDeleted { id: id.into() });
        uow.commit();

        tracing::debug!(%id, existed, "credential deleted");
        Ok(())
    }
}
