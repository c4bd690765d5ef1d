//! Profile singleton and migration flag persistence.

pub mod repository;
