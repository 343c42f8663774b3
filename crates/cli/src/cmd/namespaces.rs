//! Namespaces command implementation.

use varexport_core::exporter::directory;

pub fn run() {
    for namespace in directory::namespaces() {
        if namespace.is_empty() {
            println!("(global)");
        } else {
            println!("{}", namespace);
        }
    }
}
