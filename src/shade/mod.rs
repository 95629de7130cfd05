//! Shading: merge, minimize, and relocate bundled dependencies into a
//! single self-contained artifact.
//!
//! Stage order: combine project and bundled entries, minimize (drop
//! bundled classes unreachable from the project's own code), merge
//! duplicate paths (service registrations are unioned), then apply the
//! relocation table to entry paths and bytes.

pub mod archive;
pub mod minimize;
pub mod relocate;
pub mod services;

pub use archive::{Entry, EntryOrigin};
pub use relocate::Relocation;

use crate::core::coordinate::Coordinate;
use crate::core::manifest::RelocationRule;
use crate::shade::services::SERVICES_PREFIX;

/// The shading stage, configured once per assembly.
pub struct Shader {
    relocations: Vec<Relocation>,
    minimize: bool,
}

impl Shader {
    /// Compile the relocation table in declaration order.
    pub fn new(rules: &[RelocationRule], minimize: bool) -> Self {
        Shader {
            relocations: rules.iter().map(<Relocation as From<&RelocationRule>>::from).collect(),
            minimize,
        }
    }

    /// The compiled relocation table.
    pub fn relocations(&self) -> &[Relocation] {
        &self.relocations
    }

    /// Produce the final entry list for the artifact.
    pub fn shade(
        &self,
        project: Vec<Entry>,
        bundled: Vec<(Coordinate, Vec<Entry>)>,
    ) -> Vec<Entry> {
        let mut entries = project;
        for (coordinate, dep_entries) in bundled {
            tracing::debug!(
                "bundling {} entries from {}",
                dep_entries.len(),
                coordinate
            );
            entries.extend(dep_entries);
        }

        if self.minimize {
            entries = minimize::minimize(entries);
        }

        entries = services::merge_entries(entries);

        entries
            .into_iter()
            .map(|entry| self.relocate_entry(entry))
            .collect()
    }

    /// Apply the relocation table to one entry's path and bytes.
    ///
    /// Project entries keep their paths (they never live under a source
    /// namespace) but their bytes are rewritten too: the project's own
    /// references into bundled code must follow the move.
    fn relocate_entry(&self, entry: Entry) -> Entry {
        let path = if entry.path.starts_with(SERVICES_PREFIX) {
            // The service file name is the dot-form interface name.
            let relocated = relocate::relocate_entry_bytes(&self.relocations, entry.path.as_bytes());
            String::from_utf8(relocated).unwrap_or(entry.path)
        } else {
            relocate::relocate_entry_path(&self.relocations, &entry.path)
        };

        let data = relocate::relocate_entry_bytes(&self.relocations, &entry.data);

        Entry {
            path,
            data,
            origin: entry.origin,
        }
    }
}
