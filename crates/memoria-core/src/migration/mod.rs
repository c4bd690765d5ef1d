//! One-shot legacy import.

pub mod importer;
