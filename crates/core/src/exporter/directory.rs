//! Process-wide directory of namespace exporters.
//!
//! Exporters are created lazily on first lookup and live for the process
//! lifetime. Create-or-get is serialized so concurrent lookups of the same
//! namespace observe a single instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::{SecondsFormat, Utc};

use super::VarExporter;
use crate::variable::{ManagedVariable, Variable};

/// Name of the global namespace.
pub const GLOBAL_NAMESPACE: &str = "";

fn registry() -> &'static Mutex<HashMap<String, Arc<VarExporter>>> {
    static NAMESPACES: OnceLock<Mutex<HashMap<String, Arc<VarExporter>>>> = OnceLock::new();
    NAMESPACES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// The exporter for `namespace`, created on first access. The empty string
/// names the global namespace; use [`global`] for that.
pub fn for_namespace(namespace: &str) -> Arc<VarExporter> {
    let mut namespaces = registry().lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| VarExporter::new(namespace)),
    )
}

/// The exporter for the global namespace.
pub fn global() -> Arc<VarExporter> {
    for_namespace(GLOBAL_NAMESPACE)
}

/// All namespace names known to the process, in sort order.
#[must_use]
pub fn namespaces() -> Vec<String> {
    let namespaces = registry().lock().unwrap_or_else(PoisonError::into_inner);
    let mut names: Vec<String> = namespaces.keys().cloned().collect();
    names.sort();
    names
}

/// Visit all variables of the given namespace.
pub fn visit_namespace_variables(namespace: &str, f: impl FnMut(&dyn Variable)) {
    for_namespace(namespace).visit_variables(f);
}

/// The process start-time variable, stamped on first access and visited by
/// every non-empty traversal.
pub(crate) fn start_time() -> &'static Arc<ManagedVariable> {
    static START_TIME: OnceLock<Arc<ManagedVariable>> = OnceLock::new();
    START_TIME.get_or_init(|| {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Arc::new(
            ManagedVariable::builder("exporter-start-time")
                .doc("global start time of variable exporter")
                .value(stamp)
                .build()
                .expect("start-time variable has a non-empty name"),
        )
    })
}
