//! Manually managed variables.
//!
//! A `ManagedVariable` is a mutable value cell the owning code updates with
//! [`ManagedVariable::set`]; the registry reads it like any other variable.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use varexport_core::variable::ManagedVariable;
//! use varexport_core::value::Value;
//!
//! let var = Arc::new(
//!     ManagedVariable::builder("queue-depth").value(Value::Int(5)).build().unwrap(),
//! );
//! // ...
//! var.set(Value::Int(12));
//! ```

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::{AccessError, BuildError, Clock, Variable, system_clock};
use crate::value::Value;

/// An externally settable variable with a last-update timestamp.
///
/// Always considered live: its value is current by definition, never stale
/// or derived.
pub struct ManagedVariable {
    name: String,
    doc: String,
    tags: BTreeSet<String>,
    state: RwLock<State>,
    clock: Clock,
}

struct State {
    value: Value,
    last_updated: DateTime<Utc>,
}

impl ManagedVariable {
    /// Start building a managed variable with the given name.
    pub fn builder(name: impl Into<String>) -> ManagedBuilder {
        ManagedBuilder {
            name: name.into(),
            doc: String::new(),
            tags: BTreeSet::new(),
            value: Value::Null,
            clock: None,
        }
    }

    /// Replace the current value and stamp the update time.
    pub fn set(&self, value: impl Into<Value>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.value = value.into();
        state.last_updated = (self.clock)();
    }
}

impl std::fmt::Debug for ManagedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedVariable").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Variable for ManagedVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn value(&self) -> Result<Value, AccessError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.value.clone())
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Some(state.last_updated)
    }

    fn is_expandable(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.value.is_map()
    }
}

/// Builder for [`ManagedVariable`].
pub struct ManagedBuilder {
    name: String,
    doc: String,
    tags: BTreeSet<String>,
    value: Value,
    clock: Option<Clock>,
}

impl ManagedBuilder {
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Initial value; defaults to [`Value::Null`].
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Override the time source. Primarily for tests.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<ManagedVariable, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::MissingName);
        }
        let clock = self.clock.unwrap_or_else(system_clock);
        let last_updated = clock();
        Ok(ManagedVariable {
            name: self.name,
            doc: self.doc,
            tags: self.tags,
            state: RwLock::new(State { value: self.value, last_updated }),
            clock,
        })
    }
}
