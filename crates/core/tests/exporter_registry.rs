use std::sync::Arc;

use varexport_core::exporter::{VarExporter, directory};
use varexport_core::value::Value;
use varexport_core::variable::{
    AccessError, ExportSpec, ManagedVariable, SupplierVariable, Variable,
};

fn managed(name: &str, value: impl Into<Value>) -> Arc<ManagedVariable> {
    Arc::new(ManagedVariable::builder(name).value(value).build().expect("valid name"))
}

#[test]
fn registered_value_is_readable() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("answer", Value::Int(42)));
    assert_eq!(exporter.get_value("answer").unwrap(), Some(Value::Int(42)));
}

#[test]
fn missing_name_is_absent_not_an_error() {
    let exporter = VarExporter::detached("registry");
    assert!(exporter.get_variable("nope").is_none());
    assert_eq!(exporter.get_value("nope").unwrap(), None);
}

#[test]
fn later_registration_wins() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("dup", Value::Int(1)));
    exporter.export(managed("dup", Value::Int(2)));
    assert_eq!(exporter.get_value("dup").unwrap(), Some(Value::Int(2)));
    assert_eq!(exporter.names(), vec!["dup".to_string()]);
}

#[test]
fn reset_clears_own_mapping() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("gone", Value::Int(1)));
    exporter.reset();
    assert_eq!(exporter.get_value("gone").unwrap(), None);

    let mut visited = 0;
    exporter.visit_variables(|_| visited += 1);
    assert_eq!(visited, 0);
}

#[test]
fn empty_traversal_has_no_start_time_entry() {
    let exporter = VarExporter::detached("registry");
    let mut names = Vec::new();
    exporter.visit_variables(|v| names.push(v.name().to_string()));
    assert!(names.is_empty());
}

#[test]
fn nonempty_traversal_ends_with_start_time() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("present", Value::Int(1)));
    let mut names = Vec::new();
    exporter.visit_variables(|v| names.push(v.name().to_string()));
    assert_eq!(names, vec!["present".to_string(), "exporter-start-time".to_string()]);
}

#[test]
fn collected_variables_match_visit_order() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("b", Value::Int(2)));
    exporter.export(managed("a", Value::Int(1)));

    let mut visited = Vec::new();
    exporter.visit_variables(|v| visited.push(v.name().to_string()));
    let collected: Vec<String> =
        exporter.variables().iter().map(|v| v.name().to_string()).collect();
    assert_eq!(collected, visited);
    assert_eq!(collected.first().map(String::as_str), Some("a"));
}

#[test]
fn traversal_order_is_name_sorted() {
    let exporter = VarExporter::detached("registry");
    exporter.export(managed("zeta", Value::Int(1)));
    exporter.export(managed("alpha", Value::Int(2)));
    exporter.export(managed("mid", Value::Int(3)));
    assert_eq!(exporter.names(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn accessor_failure_propagates_through_get_value() {
    let exporter = VarExporter::detached("registry");
    let broken = SupplierVariable::builder("broken")
        .accessor(|| {
            Err(AccessError::Failed { name: "broken".into(), message: "source gone".into() })
        })
        .build()
        .unwrap();
    exporter.export(Arc::new(broken));
    assert!(exporter.get_value("broken").is_err());
}

#[test]
fn export_spec_builds_and_registers() {
    let exporter = VarExporter::detached("registry");
    let mut spec = ExportSpec::new("spec-var", Box::new(|| Ok(Value::Int(9))));
    spec.doc = "declaratively registered".into();
    exporter.export_spec(spec).unwrap();

    let var = exporter.get_variable("spec-var").unwrap();
    assert_eq!(var.doc(), "declaratively registered");
    assert_eq!(var.value().unwrap(), Value::Int(9));
}

#[test]
fn export_spec_with_timeout_caches_reads() {
    let exporter = VarExporter::detached("registry");
    let mut spec = ExportSpec::new("cached-var", Box::new(|| Ok(Value::Int(1))));
    spec.cache_timeout_ms = 60_000;
    exporter.export_spec(spec).unwrap();

    let var = exporter.get_variable("cached-var").unwrap();
    assert!(var.last_updated().is_none());
    var.value().unwrap();
    assert!(var.last_updated().is_some());
}

#[test]
fn managed_variable_scenario_in_global_namespace() {
    // Unique name: the global exporter is shared process-wide state.
    let global = directory::global();
    let depth = managed("registry-scenario-queue-depth", Value::Int(5));
    global.export(depth.clone());
    assert_eq!(
        global.get_value("registry-scenario-queue-depth").unwrap(),
        Some(Value::Int(5))
    );

    let before = depth.last_updated().unwrap();
    depth.set(Value::Int(12));
    assert_eq!(
        global.get_value("registry-scenario-queue-depth").unwrap(),
        Some(Value::Int(12))
    );
    assert!(depth.last_updated().unwrap() >= before);
}
