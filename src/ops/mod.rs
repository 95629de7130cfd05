//! High-level operations behind the CLI commands.

pub mod add;
pub mod assemble;
pub mod init;
