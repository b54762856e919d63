//! Business logic for the embatch pipeline.
//!
//! This crate defines the provider "port" trait that the infrastructure
//! layer implements, plus the pure planning/assembly logic and the
//! orchestrating service. It depends only on `embatch-types` -- never on
//! `embatch-infra` or any HTTP crate.

pub mod assembler;
pub mod counter;
pub mod job;
pub mod planner;
pub mod provider;
pub mod retry;
pub mod service;
