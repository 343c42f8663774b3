//! The `Variable` contract and its concrete variants.
//!
//! A variable is a named, dynamically readable value source. Variants:
//! - [`SupplierVariable`]: accessor-closure backed, the primary registration
//!   path (see [`ExportSpec`]).
//! - [`ManagedVariable`]: an externally settable value cell.
//! - [`ProxyVariable`]: read-through delegation, optionally under a new name
//!   (cross-namespace forwarding).
//! - [`CachingVariable`]: a proxy that memoizes reads for a time window.
//! - [`EntryVariable`]: one entry of an expanded map-valued variable.

pub mod entry;
pub mod managed;
pub mod proxy;
pub mod supplier;

pub use entry::EntryVariable;
pub use managed::{ManagedBuilder, ManagedVariable};
pub use proxy::{CachingVariable, ProxyVariable};
pub use supplier::{Accessor, ExportSpec, SupplierBuilder, SupplierVariable};

use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::value::{Value, ValueMap};

/// Failure while reading a variable's underlying value.
///
/// Accessor failures are surfaced to the caller of [`Variable::value`] and
/// never silently converted to a default: a broken exported value is
/// actionable information for the operator.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("accessor for variable '{name}' failed: {message}")]
    Failed { name: String, message: String },

    #[error("variable '{0}' is not expandable")]
    NotExpandable(String),
}

/// Invalid variable construction. Fails fast at build time, never deferred.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("variable name must not be empty")]
    MissingName,

    #[error("variable '{0}' has no accessor")]
    MissingAccessor(String),
}

/// Injectable time source, so cache-expiry and last-updated behavior is
/// deterministic under test.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The default wall clock.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// A named, dynamically readable value source.
///
/// Identity (the name) is immutable and unique within one namespace's live
/// set; the value may change between reads.
pub trait Variable: Send + Sync {
    /// Variable name, unique within a namespace.
    fn name(&self) -> &str;

    /// Human-readable documentation, empty if none.
    fn doc(&self) -> &str;

    /// Classification tags.
    fn tags(&self) -> &BTreeSet<String> {
        empty_tags()
    }

    /// Read the current value. Accessor failures propagate to the caller.
    fn value(&self) -> Result<Value, AccessError>;

    /// When the value last changed, if the source tracks that. `None` means
    /// unknown (pure pass-through sources).
    fn last_updated(&self) -> Option<DateTime<Utc>>;

    /// True if this variable can currently be expanded into sub-variables.
    fn is_expandable(&self) -> bool;

    /// Snapshot the value's mapping view. Only valid when
    /// [`is_expandable`](Variable::is_expandable) returns true; a failing
    /// accessor or a non-map value yields an error the traversal layer
    /// contains (it never aborts a dump).
    fn expand(&self) -> Result<ValueMap, AccessError> {
        match self.value()? {
            Value::Map(map) => Ok(map),
            _ => Err(AccessError::NotExpandable(self.name().to_string())),
        }
    }
}

pub(crate) fn empty_tags() -> &'static BTreeSet<String> {
    static EMPTY: OnceLock<BTreeSet<String>> = OnceLock::new();
    EMPTY.get_or_init(BTreeSet::new)
}
