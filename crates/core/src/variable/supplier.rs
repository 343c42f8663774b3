//! Accessor-backed variables and the declarative registration spec.
//!
//! This is the Rust-native counterpart of annotation-driven discovery: the
//! producer hands the registry a closure that reads the current value, plus
//! the metadata that would otherwise live on an annotation (name, doc,
//! expand flag, cache timeout).

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{AccessError, BuildError, CachingVariable, Variable};
use crate::value::Value;

/// Closure that produces the current value of a variable.
pub type Accessor = Box<dyn Fn() -> Result<Value, AccessError> + Send + Sync>;

/// A plain accessor-backed variable.
///
/// The closure is invoked on every read; nothing is memoized here (wrap in
/// [`CachingVariable`] for that).
pub struct SupplierVariable {
    name: String,
    doc: String,
    tags: BTreeSet<String>,
    expand: bool,
    accessor: Accessor,
}

impl SupplierVariable {
    /// Start building a supplier variable with the given name.
    pub fn builder(name: impl Into<String>) -> SupplierBuilder {
        SupplierBuilder {
            name: name.into(),
            doc: String::new(),
            tags: BTreeSet::new(),
            expand: false,
            accessor: None,
        }
    }
}

impl std::fmt::Debug for SupplierVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupplierVariable")
            .field("name", &self.name)
            .field("expand", &self.expand)
            .finish_non_exhaustive()
    }
}

impl Variable for SupplierVariable {
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
        (self.accessor)()
    }

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn is_expandable(&self) -> bool {
        // Declared expandable and the value currently is a map. A failing
        // accessor means "not expandable right now"; the failure itself still
        // surfaces on the next value() read.
        self.expand && matches!((self.accessor)(), Ok(Value::Map(_)))
    }
}

/// Builder for [`SupplierVariable`].
pub struct SupplierBuilder {
    name: String,
    doc: String,
    tags: BTreeSet<String>,
    expand: bool,
    accessor: Option<Accessor>,
}

impl SupplierBuilder {
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

    /// Declare that this variable may be expanded into sub-variables when
    /// its value is a map.
    #[must_use]
    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Fallible accessor. Errors propagate to readers.
    #[must_use]
    pub fn accessor<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Value, AccessError> + Send + Sync + 'static,
    {
        self.accessor = Some(Box::new(f));
        self
    }

    /// Infallible accessor convenience.
    #[must_use]
    pub fn reads<F>(self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.accessor(move || Ok(f()))
    }

    pub fn build(self) -> Result<SupplierVariable, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::MissingName);
        }
        let accessor =
            self.accessor.ok_or_else(|| BuildError::MissingAccessor(self.name.clone()))?;
        Ok(SupplierVariable {
            name: self.name,
            doc: self.doc,
            tags: self.tags,
            expand: self.expand,
            accessor,
        })
    }
}

/// Declarative registration parameters for one exported member.
///
/// Produced by whatever discovers exportable values (a locator, struct
/// methods, plain code) and consumed by
/// [`VarExporter::export_spec`](crate::exporter::VarExporter::export_spec).
/// A `cache_timeout_ms` greater than zero wraps the variable in a
/// [`CachingVariable`].
pub struct ExportSpec {
    pub name: String,
    pub doc: String,
    pub expand: bool,
    pub cache_timeout_ms: u64,
    pub accessor: Accessor,
}

impl ExportSpec {
    pub fn new(name: impl Into<String>, accessor: Accessor) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            expand: false,
            cache_timeout_ms: 0,
            accessor,
        }
    }

    /// Materialize the variable this spec describes.
    pub fn into_variable(self) -> Result<Arc<dyn Variable>, BuildError> {
        let cache_timeout_ms = self.cache_timeout_ms;
        let var = SupplierVariable::builder(self.name)
            .doc(self.doc)
            .expand(self.expand)
            .accessor(self.accessor)
            .build()?;
        if cache_timeout_ms > 0 {
            Ok(Arc::new(CachingVariable::new(Arc::new(var), cache_timeout_ms)))
        } else {
            Ok(Arc::new(var))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueMap;

    #[test]
    fn test_reads_accessor() {
        let v = SupplierVariable::builder("answer")
            .doc("the answer")
            .reads(|| Value::Int(42))
            .build()
            .unwrap();
        assert_eq!(v.name(), "answer");
        assert_eq!(v.doc(), "the answer");
        assert_eq!(v.value().unwrap(), Value::Int(42));
        assert!(v.last_updated().is_none());
    }

    #[test]
    fn test_build_requires_name() {
        let err = SupplierVariable::builder("").reads(|| Value::Null).build();
        assert_eq!(err.unwrap_err(), BuildError::MissingName);
    }

    #[test]
    fn test_build_requires_accessor() {
        let err = SupplierVariable::builder("x").build();
        assert_eq!(err.unwrap_err(), BuildError::MissingAccessor("x".into()));
    }

    #[test]
    fn test_accessor_error_propagates() {
        let v = SupplierVariable::builder("broken")
            .accessor(|| {
                Err(AccessError::Failed { name: "broken".into(), message: "io down".into() })
            })
            .build()
            .unwrap();
        assert!(matches!(v.value(), Err(AccessError::Failed { .. })));
    }

    #[test]
    fn test_expandable_requires_flag_and_map_value() {
        let mut m = ValueMap::new();
        m.insert("a".into(), Value::Int(1));
        let map_value = Value::Map(m);

        let declared = {
            let map_value = map_value.clone();
            SupplierVariable::builder("m")
                .expand(true)
                .reads(move || map_value.clone())
                .build()
                .unwrap()
        };
        assert!(declared.is_expandable());

        let undeclared = SupplierVariable::builder("m")
            .reads(move || map_value.clone())
            .build()
            .unwrap();
        assert!(!undeclared.is_expandable());

        let scalar = SupplierVariable::builder("s")
            .expand(true)
            .reads(|| Value::Int(1))
            .build()
            .unwrap();
        assert!(!scalar.is_expandable());
    }

    #[test]
    fn test_export_spec_wraps_caching_when_timeout_set() {
        let mut spec = ExportSpec::new("cached", Box::new(|| Ok(Value::Int(1))));
        spec.cache_timeout_ms = 500;
        let var = spec.into_variable().unwrap();
        // The cache stamps reads; a plain supplier never reports last_updated.
        assert!(var.last_updated().is_none());
        assert_eq!(var.value().unwrap(), Value::Int(1));
        assert!(var.last_updated().is_some());
    }
}
