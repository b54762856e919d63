//! Shared domain types for embatch.
//!
//! This crate contains the core domain types used across the embedding
//! pipeline: batch plan entities, job statuses, wire-line shapes, errors,
//! and configuration.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod batch;
pub mod config;
pub mod error;
pub mod wire;
