//! Namespace registries.
//!
//! A [`VarExporter`] owns the name→variable mapping for one namespace,
//! optionally forwarding new registrations to a parent namespace under a
//! `<namespace>-<name>` proxy. The process-wide directory of exporters lives
//! in [`directory`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use varexport_core::exporter::VarExporter;
//! use varexport_core::value::Value;
//! use varexport_core::variable::ManagedVariable;
//!
//! let exporter = VarExporter::detached("pool");
//! let depth = Arc::new(
//!     ManagedVariable::builder("depth").value(Value::Int(5)).build().unwrap(),
//! );
//! exporter.export(depth.clone());
//!
//! depth.set(Value::Int(12));
//! assert_eq!(exporter.get_value("depth").unwrap(), Some(Value::Int(12)));
//! ```

pub mod directory;

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Arc, PoisonError, RwLock};

use crate::dump::{self, DumpError};
use crate::value::Value;
use crate::variable::{
    AccessError, BuildError, EntryVariable, ExportSpec, ProxyVariable, Variable,
};

/// Registry of variables for one namespace.
///
/// Iteration order is name sort order, so dumps are deterministic. All
/// operations run on the caller's thread; registration and traversal may
/// race, which traversal handles by snapshotting the mapping first.
pub struct VarExporter {
    namespace: String,
    variables: RwLock<BTreeMap<String, Arc<dyn Variable>>>,
    parent: RwLock<Option<Arc<VarExporter>>>,
}

impl VarExporter {
    pub(crate) fn new(namespace: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            namespace: namespace.into(),
            variables: RwLock::new(BTreeMap::new()),
            parent: RwLock::new(None),
        })
    }

    /// Create a standalone exporter that is not registered in the process
    /// directory. Useful for scoped registries and tests.
    pub fn detached(namespace: impl Into<String>) -> Arc<Self> {
        Self::new(namespace)
    }

    /// Namespace name; empty for the global namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The parent namespace new registrations are forwarded to, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<VarExporter>> {
        self.parent.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Forward variables subsequently exported here into `parent` under a
    /// `<namespace>-<name>` proxy. Setting an exporter as its own parent is
    /// a no-op (guards against unbounded forwarding). Re-parenting does not
    /// retroactively forward already-registered variables.
    pub fn set_parent(&self, parent: Arc<VarExporter>) {
        if std::ptr::eq(Arc::as_ptr(&parent), self) {
            return;
        }
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = Some(parent);
    }

    /// Forward subsequent registrations into the global namespace.
    pub fn include_in_global(&self) {
        if self.namespace.is_empty() {
            // already global
            return;
        }
        self.set_parent(directory::global());
    }

    /// Register a variable under its own name. A name collision is logged
    /// and the later registration wins.
    pub fn export(&self, variable: Arc<dyn Variable>) {
        self.add_variable(variable);
    }

    /// Build and register the variable described by `spec`; a cache timeout
    /// greater than zero wraps it in a caching decorator.
    pub fn export_spec(&self, spec: ExportSpec) -> Result<(), BuildError> {
        let variable = spec.into_variable()?;
        self.add_variable(variable);
        Ok(())
    }

    fn add_variable(&self, variable: Arc<dyn Variable>) {
        let name = variable.name().to_string();
        let prev = {
            let mut vars = self.variables.write().unwrap_or_else(PoisonError::into_inner);
            vars.insert(name.clone(), Arc::clone(&variable))
        };
        if prev.is_some() {
            tracing::warn!(
                namespace = %self.namespace,
                variable = %name,
                "exporting variable hides a previously exported variable"
            );
        } else {
            tracing::debug!(namespace = %self.namespace, variable = %name, "added variable");
        }
        if let Some(parent) = self.parent() {
            if !std::ptr::eq(Arc::as_ptr(&parent), self) {
                parent.add_variable(Arc::new(ProxyVariable::new(
                    format!("{}-{}", self.namespace, name),
                    variable,
                )));
            }
        }
    }

    /// Look up a variable by name.
    ///
    /// A name containing `#` is first treated as a sub-variable address:
    /// the left part names an expandable container and the right part is
    /// matched against its current expansion's keys, yielding a fresh
    /// [`EntryVariable`]. When no container/key pair matches, the full
    /// compound name falls back to a literal lookup, so a variable whose
    /// own name contains `#` still resolves.
    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<Arc<dyn Variable>> {
        if let Some((container, key)) = name.split_once('#') {
            if let Some(sub) = self.sub_variable(container, key) {
                return Some(sub);
            }
        }
        self.variables.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    fn sub_variable(&self, container: &str, key: &str) -> Option<Arc<dyn Variable>> {
        let parent = {
            let vars = self.variables.read().unwrap_or_else(PoisonError::into_inner);
            vars.get(container).cloned()
        }?;
        if !parent.is_expandable() {
            return None;
        }
        match parent.expand() {
            Ok(map) => map.iter().find(|(k, _)| k.as_str() == key).map(|(k, v)| {
                Arc::new(EntryVariable::new(k, v.clone(), Arc::clone(&parent)))
                    as Arc<dyn Variable>
            }),
            Err(e) => {
                tracing::warn!(
                    variable = %container,
                    error = %e,
                    "failed to expand variable for sub-variable lookup"
                );
                None
            }
        }
    }

    /// Current value of a variable, or `Ok(None)` when the name is not
    /// registered. Accessor failures propagate.
    pub fn get_value(&self, name: &str) -> Result<Option<Value>, AccessError> {
        match self.get_variable(name) {
            Some(variable) => variable.value().map(Some),
            None => Ok(None),
        }
    }

    /// Visit a point-in-time snapshot of the registered variables in name
    /// order.
    ///
    /// Every expandable variable is replaced by one [`EntryVariable`] per
    /// entry of its current expansion. A failing expansion is logged and
    /// collapsed into a single synthetic `<name>#error` entry carrying the
    /// failure message; the traversal continues. A non-empty traversal
    /// additionally visits the process start-time variable last.
    pub fn visit_variables(&self, mut f: impl FnMut(&dyn Variable)) {
        for variable in self.expanded_snapshot() {
            f(variable.as_ref());
        }
    }

    /// Collected traversal: everything
    /// [`visit_variables`](VarExporter::visit_variables) would visit, in
    /// visit order.
    #[must_use]
    pub fn variables(&self) -> Vec<Arc<dyn Variable>> {
        self.expanded_snapshot()
    }

    fn expanded_snapshot(&self) -> Vec<Arc<dyn Variable>> {
        let snapshot: Vec<Arc<dyn Variable>> = {
            let vars = self.variables.read().unwrap_or_else(PoisonError::into_inner);
            vars.values().cloned().collect()
        };

        let mut visited: Vec<Arc<dyn Variable>> = Vec::with_capacity(snapshot.len());
        for variable in &snapshot {
            if variable.is_expandable() {
                match variable.expand() {
                    Ok(map) => {
                        for (key, value) in map {
                            visited.push(Arc::new(EntryVariable::new(
                                &key,
                                value,
                                Arc::clone(variable),
                            )));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            variable = %variable.name(),
                            error = %e,
                            "failed to iterate expansion of variable"
                        );
                        visited.push(Arc::new(EntryVariable::new(
                            "error",
                            Value::Str(e.to_string()),
                            Arc::clone(variable),
                        )));
                    }
                }
            } else {
                visited.push(Arc::clone(variable));
            }
        }

        // Gate the start-time visit on the registered set, not the expanded
        // one: a namespace whose only variable expands to nothing still
        // counts as populated.
        if !snapshot.is_empty() {
            let start: Arc<dyn Variable> = Arc::clone(directory::start_time()) as Arc<dyn Variable>;
            visited.push(start);
        }
        visited
    }

    /// Names currently registered, in sort order. Expansion entries are not
    /// included; use [`visit_variables`](VarExporter::visit_variables) for
    /// the full traversal.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.variables.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    /// Write all visited variables, one `name=value` line each, optionally
    /// preceded by `# doc` comment lines.
    pub fn dump(&self, out: &mut dyn Write, include_doc: bool) -> Result<(), DumpError> {
        let mut failure: Option<DumpError> = None;
        self.visit_variables(|variable| {
            if failure.is_some() {
                return;
            }
            if let Err(e) = dump::write_variable(out, variable, include_doc) {
                failure = Some(e);
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// As [`dump`](VarExporter::dump), collected into a string.
    pub fn dump_to_string(&self, include_doc: bool) -> Result<String, DumpError> {
        let mut out = String::new();
        self.dump(&mut out, include_doc)?;
        Ok(out)
    }

    /// Write all visited variables as a `{name='value', ...}` object. Values
    /// are stringified; names and values are not escaped. This mirrors the
    /// line format's traversal, it is not strict JSON.
    pub fn dump_json(&self, out: &mut dyn Write) -> Result<(), DumpError> {
        let mut failure: Option<DumpError> = None;
        let mut count = 0usize;
        out.write_char('{')?;
        self.visit_variables(|variable| {
            if failure.is_some() {
                return;
            }
            let result = variable.value().map_err(DumpError::from).and_then(|value| {
                if count > 0 {
                    out.write_str(", ")?;
                }
                count += 1;
                write!(out, "{}='{}'", variable.name(), value)?;
                Ok(())
            });
            if let Err(e) = result {
                failure = Some(e);
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        out.write_char('}')?;
        Ok(())
    }

    /// As [`dump_json`](VarExporter::dump_json), collected into a string.
    pub fn dump_json_to_string(&self) -> Result<String, DumpError> {
        let mut out = String::new();
        self.dump_json(&mut out)?;
        Ok(out)
    }

    /// Remove all variables from this namespace. Proxies already forwarded
    /// to a parent namespace stay in the parent until its own reset.
    pub fn reset(&self) {
        self.variables.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl std::fmt::Debug for VarExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarExporter")
            .field("namespace", &self.namespace)
            .field("variables", &self.names())
            .finish()
    }
}
