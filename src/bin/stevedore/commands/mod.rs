//! Command implementations

pub mod add;
pub mod assemble;
pub mod clean;
pub mod completions;
pub mod deps;
pub mod init;
pub mod remove;
pub mod version;
