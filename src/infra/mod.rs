//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem and external processes.
//! This module is the only place where child processes are spawned.

pub mod backend;
pub mod dirs;
pub mod filesystem;
pub mod harness;
pub mod toolchain;
