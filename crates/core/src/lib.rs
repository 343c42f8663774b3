#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Runtime variable-export registry.
//!
//! Lets a process register named, dynamically readable values (counters,
//! gauges, status strings, nested maps) under namespaces and exposes them
//! for dumping and programmatic lookup. Lightweight operational
//! introspection for embedding in a running process, not a metrics pipeline.
//!
//! # Overview
//!
//! - [`variable`]: the [`Variable`](variable::Variable) contract and its
//!   variants (supplier-backed, managed, proxying, caching, per-entry).
//! - [`exporter`]: the per-namespace registry with parent forwarding and
//!   `container#key` sub-variable addressing, plus the process-wide
//!   namespace directory.
//! - [`value`]: the tagged value type moved across the export boundary.
//! - [`dump`]: property-line formatting and escaping.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use varexport_core::exporter::directory;
//! use varexport_core::value::Value;
//! use varexport_core::variable::ManagedVariable;
//!
//! let exporter = directory::for_namespace("readme-example");
//! let depth = Arc::new(
//!     ManagedVariable::builder("queue-depth")
//!         .doc("items waiting in the work queue")
//!         .value(Value::Int(5))
//!         .build()
//!         .unwrap(),
//! );
//! exporter.export(depth.clone());
//!
//! depth.set(Value::Int(12));
//! assert_eq!(exporter.get_value("queue-depth").unwrap(), Some(Value::Int(12)));
//! ```

pub mod dump;
pub mod exporter;
pub mod value;
pub mod variable;

pub use dump::DumpError;
pub use exporter::{VarExporter, directory};
pub use value::{Value, ValueMap};
pub use variable::{
    AccessError, BuildError, CachingVariable, EntryVariable, ExportSpec, ManagedVariable,
    ProxyVariable, SupplierVariable, Variable,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
