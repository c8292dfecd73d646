//! # Lifecycle Events
//!
//! Create/delete of wallets and credentials publish a synchronous "before"
//! event that may abort the operation, then an "after-commit" event that
//! fires only once the store mutation is durable. [`UnitOfWork`] carries the
//! queued after-commit events across the mutation and releases them on
//! commit — never before, never on rollback.

use std::sync::Arc;

use crate::error::Result;

/// A lifecycle event. The `*ing` variants fire before the mutation, the
/// `*ed` variants after commit. Delete events carry desired-state semantics:
/// they communicate "this no longer exists" even if it never did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A wallet is about to be created.
    WalletCreating {
        /// Business-partner number of the wallet.
        bpn: String,
    },
    /// A wallet create has committed.
    WalletCreated {
        /// Business-partner number of the wallet.
        bpn: String,
    },
    /// A wallet is about to be deleted.
    WalletDeleting {
        /// Business-partner number of the wallet.
        bpn: String,
    },
    /// A wallet delete has committed.
    WalletDeleted {
        /// Business-partner number of the wallet.
        bpn: String,
    },
    /// A credential is about to be stored.
    CredentialCreating {
        /// Credential id.
        id: String,
    },
    /// A credential store has committed.
    CredentialCreated {
        /// Credential id.
        id: String,
    },
    /// A credential is about to be deleted.
    CredentialDeleting {
        /// Credential id.
        id: String,
    },
    /// A credential delete has committed.
    CredentialDeleted {
        /// Credential id.
        id: String,
    },
}

/// A subscriber to lifecycle events. Returning an error from a before-phase
/// event aborts the surrounding operation; errors from after-commit events
/// are logged and dropped, since the mutation is already durable.
pub trait EventSubscriber: Send + Sync {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// An error in the before phase aborts the operation.
    fn on_event(&self, event: &LifecycleEvent) -> Result<()>;
}

/// Publishes lifecycle events to registered subscribers, in registration
/// order.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("subscribers", &self.subscribers.len()).finish()
    }
}

impl EventBus {
    /// Returns a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Publishes a before-phase event. The first subscriber error aborts.
    ///
    /// # Errors
    ///
    /// Propagates the first subscriber error.
    pub fn publish(&self, event: &LifecycleEvent) -> Result<()> {
        for subscriber in &self.subscribers {
            subscriber.on_event(event)?;
        }
        Ok(())
    }

    /// Publishes an after-commit event. Subscriber errors are logged, not
    /// propagated — the mutation has already committed.
    pub fn publish_committed(&self, event: &LifecycleEvent) {
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.on_event(event) {
                tracing::warn!(?event, "after-commit subscriber failed: {e}");
            }
        }
    }
}

/// One transactional unit: a before event, a store mutation, and the queued
/// after-commit events. Dropping the unit without [`UnitOfWork::commit`]
/// discards the queued events (rollback).
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    bus: &'a EventBus,
    queued: Vec<LifecycleEvent>,
}

impl<'a> UnitOfWork<'a> {
    /// Opens a unit of work by publishing `before` synchronously.
    ///
    /// # Errors
    ///
    /// Propagates a subscriber abort, in which case no mutation may be
    /// performed.
    pub fn begin(bus: &'a EventBus, before: &LifecycleEvent) -> Result<Self> {
        bus.publish(before)?;
        Ok(Self { bus, queued: Vec::new() })
    }

    /// Queues an event to fire once the unit commits.
    pub fn queue(&mut self, event: LifecycleEvent) {
        self.queued.push(event);
    }

    /// Reports the mutation durable and releases the queued events.
    pub fn commit(self) {
        for event in &self.queued {
            self.bus.publish_committed(event);
        }
    }
}
