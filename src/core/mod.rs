//! Core business logic module
//!
//! Dependency resolution, build planning, argument handling, and build
//! orchestration. Child processes are never spawned here; those belong in
//! [`crate::infra`] behind the [`builder::BuildBackend`] and
//! [`assay::TestHarness`] traits.
//!
//! # Submodules
//!
//! - [`packages`] - Package dependency table
//! - [`resolver`] - Dependency resolution
//! - [`plan`] - Build plan construction
//! - [`args`] - Build argument parsing and install locations
//! - [`build_env`] - Per-child execution context
//! - [`builder`] - Build orchestration logic
//! - [`assay`] - Test discovery and classification
//! - [`settings`] - Settings file handling

pub mod args;
pub mod assay;
pub mod build_env;
pub mod builder;
pub mod packages;
pub mod plan;
pub mod resolver;
pub mod settings;
