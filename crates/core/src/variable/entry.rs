//! Per-entry variables materialized from an expanded map value.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{AccessError, Variable};
use crate::value::Value;

/// One entry of an expandable variable's mapping.
///
/// Named `<parent>#<key>`. Ephemeral: each traversal materializes fresh
/// instances, and the value is the entry's snapshot at materialization, not
/// re-read later. Documentation and last-updated delegate to the parent;
/// entries carry no independent metadata.
pub struct EntryVariable {
    name: String,
    value: Value,
    parent: Arc<dyn Variable>,
}

impl EntryVariable {
    pub fn new(key: &str, value: Value, parent: Arc<dyn Variable>) -> Self {
        Self { name: format!("{}#{}", parent.name(), key), value, parent }
    }
}

impl std::fmt::Debug for EntryVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryVariable")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

impl Variable for EntryVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> &str {
        self.parent.doc()
    }

    fn tags(&self) -> &BTreeSet<String> {
        self.parent.tags()
    }

    fn value(&self) -> Result<Value, AccessError> {
        Ok(self.value.clone())
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.parent.last_updated()
    }

    fn is_expandable(&self) -> bool {
        self.value.is_map()
    }
}
