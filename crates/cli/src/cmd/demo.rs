//! Demo command implementation.
//!
//! Registers a handful of sample process variables into a namespace and
//! dumps it, mainly to show what embedding the registry looks like.

use std::sync::Arc;
use std::time::Instant;

use varexport_core::exporter::directory;
use varexport_core::value::{Value, ValueMap};
use varexport_core::variable::{ExportSpec, ManagedVariable, SupplierVariable};

use crate::{DemoArgs, OutputFormat};

pub fn run(args: &DemoArgs) {
    let exporter = directory::for_namespace(&args.namespace);
    exporter.include_in_global();

    let counter = match ManagedVariable::builder("demo-counter")
        .doc("number of demo iterations completed")
        .value(Value::Int(0))
        .build()
    {
        Ok(v) => Arc::new(v),
        Err(e) => {
            eprintln!("Error building variable: {}", e);
            std::process::exit(1);
        }
    };
    exporter.export(counter.clone());
    counter.set(Value::Int(3));

    let started = Instant::now();
    register_supplier(
        &exporter,
        SupplierVariable::builder("uptime-ms")
            .doc("milliseconds since the demo started")
            .reads(move || Value::Int(started.elapsed().as_millis() as i64)),
    );
    register_supplier(
        &exporter,
        SupplierVariable::builder("os").reads(|| Value::Str(std::env::consts::OS.into())),
    );
    register_supplier(
        &exporter,
        SupplierVariable::builder("build-info")
            .doc("compile-time build details")
            .expand(true)
            .reads(|| {
                let mut m = ValueMap::new();
                m.insert("arch".into(), Value::Str(std::env::consts::ARCH.into()));
                m.insert("os".into(), Value::Str(std::env::consts::OS.into()));
                m.insert("core-version".into(), Value::Str(varexport_core::version().into()));
                Value::Map(m)
            }),
    );

    // A cached accessor: repeated dumps within a second reuse the first read.
    let mut spec = ExportSpec::new(
        "pid",
        Box::new(|| Ok(Value::Int(i64::from(std::process::id())))),
    );
    spec.doc = "process id".into();
    spec.cache_timeout_ms = 1000;
    if let Err(e) = exporter.export_spec(spec) {
        eprintln!("Error exporting variable: {}", e);
        std::process::exit(1);
    }
    tracing::debug!(namespace = %args.namespace, "registered demo variables");

    let rendered = match args.output {
        OutputFormat::Lines => exporter.dump_to_string(args.doc),
        OutputFormat::Object => exporter.dump_json_to_string(),
        OutputFormat::Json => return print_strict_json(&exporter),
    };
    match rendered {
        Ok(text) => print!("{}", ensure_trailing_newline(text)),
        Err(e) => {
            eprintln!("Error dumping namespace '{}': {}", args.namespace, e);
            std::process::exit(1);
        }
    }
}

fn register_supplier(
    exporter: &varexport_core::exporter::VarExporter,
    builder: varexport_core::variable::SupplierBuilder,
) {
    match builder.build() {
        Ok(v) => exporter.export(Arc::new(v)),
        Err(e) => {
            eprintln!("Error building variable: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_strict_json(exporter: &varexport_core::exporter::VarExporter) {
    let mut object = serde_json::Map::new();
    let mut failure = None;
    exporter.visit_variables(|var| {
        if failure.is_some() {
            return;
        }
        match var.value() {
            Ok(value) => match serde_json::to_value(&value) {
                Ok(json) => {
                    object.insert(var.name().to_string(), json);
                }
                Err(e) => failure = Some(e.to_string()),
            },
            Err(e) => failure = Some(e.to_string()),
        }
    });
    if let Some(message) = failure {
        eprintln!("Error dumping namespace: {}", message);
        std::process::exit(1);
    }
    match serde_json::to_string_pretty(&object) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
