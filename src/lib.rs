//! Stevedore - an assembly tool for host-loaded plugin artifacts
//!
//! This crate provides the core library functionality for Stevedore,
//! including version decoration, dependency partitioning, archive
//! shading/relocation, and resource templating.

pub mod core;
pub mod ops;
pub mod shade;
pub mod sources;
pub mod template;
pub mod util;

pub use self::core::{
    coordinate::Coordinate,
    dependency::{DependencyDecl, DependencyMode},
    descriptor::PluginDescriptor,
    manifest::Manifest,
    version::CommitResolver,
};

pub use shade::Shader;
pub use util::context::GlobalContext;
