//! casabuild - Dependency-ordered build driver for the casacore package set
//!
//! This library resolves which casacore packages have to be built for a
//! request, orders them so prerequisites come first, and drives an external
//! build backend (SCons by default) over the resulting plan, optionally running
//! each package's unit tests through the assay harness.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Resolution, planning and orchestration logic
//! - [`infra`] - Infrastructure layer (filesystem, external processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
