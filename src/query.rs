//! # Credential Queries
//!
//! The filter contract for credential lookups: exact id, holder, issuer, a
//! type filter in exactly one of two modes, an expired flag, an allow-listed
//! sort column, and zero-based pagination. Predicate evaluation itself lives
//! in [`crate::store`]; this module defines the query shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type filtering mode. The two modes are mutually exclusive by
/// construction: a query carries at most one `TypeFilter`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TypeFilter {
    /// The credential must carry every listed type.
    All(Vec<String>),

    /// The credential must carry at least one listed type.
    Any(Vec<String>),
}

impl TypeFilter {
    /// Evaluates the filter against a credential's type set.
    #[must_use]
    pub fn matches(&self, types: &[String]) -> bool {
        match self {
            Self::All(wanted) => wanted.iter().all(|w| types.contains(w)),
            Self::Any(wanted) => wanted.iter().any(|w| types.contains(w)),
        }
    }
}

/// Sortable columns. Anything outside this allow-list is silently ignored
/// by [`SortColumn::parse`], never rejected.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    /// Sort by issuance date.
    Created,

    /// Sort by expiration date (credentials without one sort first).
    ExpirationDate,

    /// Sort by issuer DID.
    Issuer,
}

impl SortColumn {
    /// Parses a caller-supplied column name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "created" | "createdAt" | "issuanceDate" => Some(Self::Created),
            "expirationDate" => Some(Self::ExpirationDate),
            "issuer" | "issuerDid" => Some(Self::Issuer),
            other => {
                tracing::debug!(column = other, "ignoring unknown sort column");
                None
            }
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Ascending (default).
    #[default]
    Ascending,

    /// Descending.
    Descending,
}

/// A credential filter specification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialQuery {
    /// Exact credential id.
    pub id: Option<String>,

    /// Holder DID filter.
    pub holder: Option<String>,

    /// Issuer DID filter.
    pub issuer: Option<String>,

    /// Type filter, in exactly one of the two modes.
    pub types: Option<TypeFilter>,

    /// `Some(true)` matches only expired credentials, `Some(false)` only
    /// unexpired ones.
    pub expired: Option<bool>,

    /// Instant the expired filter evaluates against; the wall clock at
    /// evaluation time when absent.
    pub as_of: Option<DateTime<Utc>>,

    /// Sort column, if any.
    pub sort: Option<SortColumn>,

    /// Sort direction.
    pub order: SortOrder,

    /// Zero-based page number.
    pub page: usize,

    /// Page size; the store's configured default applies when absent.
    pub page_size: Option<usize>,
}

impl CredentialQuery {
    /// Returns an empty query matching everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters on an exact credential id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Filters on the holder DID.
    #[must_use]
    pub fn holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    /// Filters on the issuer DID.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Requires every listed type (ALL-of mode).
    #[must_use]
    pub fn all_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types = Some(TypeFilter::All(types.into_iter().map(Into::into).collect()));
        self
    }

    /// Requires at least one listed type (ANY-of mode).
    #[must_use]
    pub fn any_types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types = Some(TypeFilter::Any(types.into_iter().map(Into::into).collect()));
        self
    }

    /// Filters on expiry state.
    #[must_use]
    pub const fn expired(mut self, expired: bool) -> Self {
        self.expired = Some(expired);
        self
    }

    /// Pins the instant the expired filter evaluates against, so repeated
    /// evaluation over a fixed snapshot yields a fixed result.
    #[must_use]
    pub const fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.as_of = Some(now);
        self
    }

    /// Sorts by a caller-supplied column name; unknown names are ignored.
    #[must_use]
    pub fn sort_by(mut self, column: &str, order: SortOrder) -> Self {
        self.sort = SortColumn::parse(column);
        self.order = order;
        self
    }

    /// Selects a zero-based page.
    #[must_use]
    pub const fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }
}

/// One page of query results.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The matched items for this page.
    pub items: Vec<T>,

    /// Zero-based page number.
    pub page: usize,

    /// Page size applied.
    pub page_size: usize,

    /// Total matches across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}
