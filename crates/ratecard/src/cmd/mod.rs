//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod completions;
pub mod plan;
pub mod quote;
pub mod roles;
pub mod source;
