//! Shared domain types for Memoria.
//!
//! This crate contains the core domain types used across the Memoria storage
//! layer: chats, messages, the user profile, migration records, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod context;
pub mod error;
pub mod migration;
pub mod profile;
