//! Chat persistence for Memoria.
//!
//! This module owns the primary chat table and the derived recency index,
//! plus the deterministic title heuristic applied on first user message.

pub mod repository;
pub mod title;
