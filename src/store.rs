//! # Indexed Credential Store
//!
//! An in-memory stand-in for the relational store: wallets plus credentials
//! stored as opaque signed-document blobs, with derived index rows (one per
//! distinct type, one per issuer, one per holder link) maintained on every
//! create/delete. The index is a secondary view used to narrow candidates —
//! the blob is always the source of truth for predicate evaluation.
//!
//! Each mutation and its index writes happen under one lock acquisition,
//! standing in for the backing store's transaction; id uniqueness is
//! enforced here and surfaced as [`Error::Conflict`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::VerifiableCredential;
use crate::query::{CredentialQuery, Page, SortColumn, SortOrder};
use crate::wallet::{KeyEntry, Wallet};

#[derive(Default)]
struct Inner {
    wallets: BTreeMap<String, Wallet>,

    /// Source of truth: credential id -> signed document blob.
    credentials: BTreeMap<String, VerifiableCredential>,

    /// Derived rows: one per distinct type a credential carries.
    type_index: BTreeMap<String, BTreeSet<String>>,

    /// Derived rows: one per issuer.
    issuer_index: BTreeMap<String, BTreeSet<String>>,

    /// Derived rows: one per holder link.
    holder_index: BTreeMap<String, BTreeSet<String>>,
}

/// In-memory wallet and credential store with derived query indexes.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    default_page_size: usize,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("default_page_size", &self.default_page_size)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Returns an empty store using the configured default page size.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self { inner: Mutex::new(Inner::default()), default_page_size: config.default_page_size }
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- wallets ---

    /// Inserts a wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the BPN is already taken. First writer
    /// wins; no mutation is performed on conflict.
    pub fn insert_wallet(&self, wallet: Wallet) -> Result<()> {
        let mut inner = self.locked();
        if inner.wallets.contains_key(&wallet.bpn) {
            return Err(Error::Conflict(format!("wallet {} already exists", wallet.bpn)));
        }
        inner.wallets.insert(wallet.bpn.clone(), wallet);
        Ok(())
    }

    /// Fetches a wallet by BPN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown BPN.
    pub fn wallet(&self, bpn: &str) -> Result<Wallet> {
        self.locked()
            .wallets
            .get(bpn)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("wallet {bpn}")))
    }

    /// Updates a wallet's display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown BPN.
    pub fn rename_wallet(&self, bpn: &str, name: String) -> Result<()> {
        let mut inner = self.locked();
        let wallet = inner
            .wallets
            .get_mut(bpn)
            .ok_or_else(|| Error::NotFound(format!("wallet {bpn}")))?;
        wallet.name = name;
        Ok(())
    }

    /// Appends a key reference to a wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown BPN.
    pub fn add_key(&self, bpn: &str, key: KeyEntry) -> Result<()> {
        let mut inner = self.locked();
        let wallet = inner
            .wallets
            .get_mut(bpn)
            .ok_or_else(|| Error::NotFound(format!("wallet {bpn}")))?;
        wallet.keys.push(key);
        Ok(())
    }

    /// Removes a wallet and its key references. Returns whether it existed.
    pub fn remove_wallet(&self, bpn: &str) -> bool {
        self.locked().wallets.remove(bpn).is_some()
    }

    /// Number of stored wallets.
    #[must_use]
    pub fn wallet_count(&self) -> usize {
        self.locked().wallets.len()
    }

    // --- credentials ---

    /// Inserts a credential blob and writes its derived index rows in the
    /// same transactional unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the id is already taken and
    /// [`Error::BadData`] for an empty id. No mutation on either.
    pub fn insert_credential(&self, vc: VerifiableCredential) -> Result<()> {
        if vc.id.trim().is_empty() {
            return Err(Error::BadData("credential id must not be empty".into()));
        }

        let mut inner = self.locked();
        if inner.credentials.contains_key(&vc.id) {
            return Err(Error::Conflict(format!("credential {} already exists", vc.id)));
        }

        let id = vc.id.clone();
        for type_ in &vc.type_ {
            inner.type_index.entry(type_.clone()).or_default().insert(id.clone());
        }
        inner.issuer_index.entry(vc.issuer.clone()).or_default().insert(id.clone());
        if let Some(holder) = vc.holder() {
            inner.holder_index.entry(holder.to_string()).or_default().insert(id.clone());
        }
        inner.credentials.insert(id, vc);
        Ok(())
    }

    /// Removes a credential blob and its derived index rows. Returns whether
    /// it existed.
    pub fn remove_credential(&self, id: &str) -> bool {
        let mut inner = self.locked();
        let Some(vc) = inner.credentials.remove(id) else {
            return false;
        };

        for type_ in &vc.type_ {
            if let Some(ids) = inner.type_index.get_mut(type_) {
                ids.remove(id);
                if ids.is_empty() {
                    inner.type_index.remove(type_);
                }
            }
        }
        if let Some(ids) = inner.issuer_index.get_mut(&vc.issuer) {
            ids.remove(id);
            if ids.is_empty() {
                inner.issuer_index.remove(&vc.issuer);
            }
        }
        if let Some(holder) = vc.holder() {
            let holder = holder.to_string();
            if let Some(ids) = inner.holder_index.get_mut(&holder) {
                ids.remove(id);
                if ids.is_empty() {
                    inner.holder_index.remove(&holder);
                }
            }
        }
        true
    }

    /// Number of stored credentials.
    #[must_use]
    pub fn credential_count(&self) -> usize {
        self.locked().credentials.len()
    }

    /// Returns the matching page, optionally sorted.
    #[must_use]
    pub fn find_all(&self, query: &CredentialQuery) -> Page<VerifiableCredential> {
        let inner = self.locked();
        let mut matched = evaluate(&inner, query);
        apply_sort(&mut matched, query);

        let total = matched.len();
        let page_size = query.page_size.unwrap_or(self.default_page_size);
        let items = matched
            .into_iter()
            .skip(query.page.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        Page { items, page: query.page, page_size, total }
    }

    /// Returns the first match under the query's sort, if any.
    #[must_use]
    pub fn find_one(&self, query: &CredentialQuery) -> Option<VerifiableCredential> {
        let inner = self.locked();
        let mut matched = evaluate(&inner, query);
        apply_sort(&mut matched, query);
        matched.first().map(|vc| (*vc).clone())
    }

    /// True if at least one credential matches.
    #[must_use]
    pub fn exists(&self, query: &CredentialQuery) -> bool {
        let inner = self.locked();
        let now = query.as_of.unwrap_or_else(Utc::now);
        let found = candidates(&inner, query).any(|vc| matches(vc, query, now));
        found
    }
}

/// Narrows the candidate set through the derived indexes, then evaluates
/// the full predicate against each blob.
fn evaluate<'a>(inner: &'a Inner, query: &CredentialQuery) -> Vec<&'a VerifiableCredential> {
    let now = query.as_of.unwrap_or_else(Utc::now);
    candidates(inner, query).filter(|vc| matches(vc, query, now)).collect()
}

fn apply_sort(matched: &mut [&VerifiableCredential], query: &CredentialQuery) {
    let Some(column) = query.sort else {
        return;
    };
    matched.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Created => a.issuance_date.cmp(&b.issuance_date),
            SortColumn::ExpirationDate => a.expiration_date.cmp(&b.expiration_date),
            SortColumn::Issuer => a.issuer.cmp(&b.issuer),
        };
        match query.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn candidates<'a>(
    inner: &'a Inner, query: &CredentialQuery,
) -> Box<dyn Iterator<Item = &'a VerifiableCredential> + 'a> {
    let ids: Option<BTreeSet<String>> = if let Some(id) = &query.id {
        Some(BTreeSet::from([id.clone()]))
    } else if let Some(holder) = &query.holder {
        Some(inner.holder_index.get(holder).cloned().unwrap_or_default())
    } else if let Some(issuer) = &query.issuer {
        Some(inner.issuer_index.get(issuer).cloned().unwrap_or_default())
    } else if let Some(crate::query::TypeFilter::Any(types)) = &query.types {
        let mut ids = BTreeSet::new();
        for type_ in types {
            if let Some(entry) = inner.type_index.get(type_) {
                ids.extend(entry.iter().cloned());
            }
        }
        Some(ids)
    } else {
        None
    };

    match ids {
        Some(ids) => Box::new(
            ids.into_iter().filter_map(|id| inner.credentials.get(&id))
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        None => Box::new(inner.credentials.values()),
    }
}

fn matches(vc: &VerifiableCredential, query: &CredentialQuery, now: DateTime<Utc>) -> bool {
    if query.id.as_ref().is_some_and(|id| *id != vc.id) {
        return false;
    }
    if query.holder.as_ref().is_some_and(|holder| vc.holder() != Some(holder.as_str())) {
        return false;
    }
    if query.issuer.as_ref().is_some_and(|issuer| *issuer != vc.issuer) {
        return false;
    }
    if query.types.as_ref().is_some_and(|filter| !filter.matches(&vc.type_)) {
        return false;
    }
    if query.expired.is_some_and(|expired| vc.is_expired(now) != expired) {
        return false;
    }
    true
}
