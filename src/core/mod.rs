//! Core types: manifest schema, coordinates, dependency declarations,
//! version decoration, and the plugin descriptor.

pub mod coordinate;
pub mod dependency;
pub mod descriptor;
pub mod manifest;
pub mod version;

pub use coordinate::Coordinate;
pub use dependency::{DependencyDecl, DependencyMode, Partition};
pub use descriptor::PluginDescriptor;
pub use manifest::Manifest;
pub use version::{decorate_version, CommitResolver, GitCommitResolver};
