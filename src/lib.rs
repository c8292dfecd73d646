//! # Managed Wallet
//!
//! A multi-tenant wallet engine for Verifiable Credentials: each tenant,
//! identified by its business-partner number (BPN), owns signing keys and a
//! collection of credentials. The engine issues correctly shaped signed
//! credentials, validates credentials and presentations (object or JWT
//! form), answers filterable queries over an indexed store, and derives a
//! per-wallet "summary" rollup credential.
//!
//! # Design
//!
//! The engine is a library, not a service: HTTP routing, DTO marshalling,
//! and authentication belong to the host. External capabilities are passed
//! in by construction as trait objects or generics:
//!
//! - [`provider::ProofService`] — linked-data proof signing/verification
//!   and the JWT presentation codec.
//! - [`provider::SecretVault`] — resolution of opaque key handles to key
//!   material.
//!
//! All operations are synchronous and blocking; there is no internal async
//! dispatch, scheduling, or retry. Create/delete of wallets and credentials
//! run inside a lifecycle unit of work: a synchronous "before" event that
//! may abort, the store mutation, then after-commit events that fire only
//! once the mutation is durable (see [`event`]).
//!
//! # Example
//!
//! ```rust,ignore
//! let config = Config::default();
//! let store = Arc::new(MemoryStore::new(&config));
//! let bus = EventBus::new();
//!
//! let wallets = WalletService::new(store.clone(), bus.clone());
//! wallets.create("BPNL000000000001", "Tenant One")?;
//! wallets.add_key("BPNL000000000001", KeyEntry::new("key-1", handle))?;
//!
//! let issuer = IssuanceService::new(config, store, bus, proofs, vault);
//! let vc = issuer.issue(
//!     "BPNL000000000000",
//!     CredentialKind::Membership {
//!         bpn: "BPNL000000000001".into(),
//!         organization: "Tenant One GmbH".into(),
//!     },
//! )?;
//! let summary = issuer.issue_summary("BPNL000000000001")?;
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod issue;
pub mod model;
pub mod provider;
pub mod query;
pub mod store;
pub mod summary;
pub mod validate;
pub mod wallet;

pub use config::Config;
pub use error::{Error, Result};
pub use event::{EventBus, EventSubscriber, LifecycleEvent};
pub use issue::{CredentialKind, IssuanceRequest, IssuanceService};
pub use model::{
    CredentialSubject, OneOrMany, Proof, VerifiableCredential, VerifiablePresentation,
};
pub use query::{CredentialQuery, Page, SortColumn, SortOrder, TypeFilter};
pub use store::MemoryStore;
pub use summary::{SummaryPlan, SUMMARY_TYPE};
pub use validate::{
    PresentationValidation, TokenValidation, ValidationResult, Validator, Violation,
};
pub use wallet::{KeyEntry, SecretHandle, Wallet, WalletService};
