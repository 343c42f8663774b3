pub mod demo;
pub mod namespaces;
