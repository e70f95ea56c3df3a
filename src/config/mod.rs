//! Configuration module
//!
//! Built-in defaults for tools, install locations and test discovery.

pub mod defaults;
