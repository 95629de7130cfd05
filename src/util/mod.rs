//! Shared utilities: global context, configuration, diagnostics,
//! filesystem helpers, hashing, and shell output.

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod shell;

pub use context::GlobalContext;
