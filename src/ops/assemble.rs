//! Implementation of `stevedore assemble`.
//!
//! The assembly pipeline runs in a fixed order: decorate the version,
//! partition the dependencies, resolve every bundled archive to a file,
//! shade (merge, minimize, relocate), template project resources, and
//! write the final artifact plus its checksum. Each stage must succeed
//! before the next starts; nothing is written until the end.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::core::dependency::Partition;
use crate::core::descriptor::DESCRIPTOR_PATH;
use crate::core::manifest::{Manifest, RelocationRule};
use crate::core::version::decorate_version_at;
use crate::shade::archive::{self, Entry, EntryOrigin};
use crate::shade::Shader;
use crate::sources::resolve_archive;
use crate::template::Templater;
use crate::util::hash::sha256_file;
use crate::util::shell::{format_duration, Shell, Status};

/// Options for an assembly run.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Override the manifest's output directory
    pub output_dir: Option<PathBuf>,

    /// Skip minimization even if the manifest enables it
    pub no_minimize: bool,

    /// Never touch the network; uncached remote archives are fatal
    pub offline: bool,

    /// Cache directory for fetched archives
    pub cache_dir: PathBuf,
}

/// What an assembly run produced.
#[derive(Debug)]
pub struct AssembleResult {
    /// Path of the written artifact
    pub artifact: PathBuf,

    /// Path of the checksum file next to it
    pub checksum: PathBuf,

    /// Decorated version baked into the artifact
    pub version: String,

    /// Number of entries in the artifact
    pub entry_count: usize,
}

/// Machine-readable assembly plan, emitted by `assemble --plan`.
///
/// Planning decorates the version and partitions the dependencies but
/// never opens an archive.
#[derive(Debug, Serialize)]
pub struct AssemblePlan {
    pub name: String,
    pub base_version: String,
    pub version: String,
    pub artifact: String,
    pub minimize: bool,
    pub relocations: Vec<RelocationRule>,
    pub tokens: std::collections::BTreeMap<String, String>,
    pub host: Vec<PlanDependency>,
    pub bundled: Vec<PlanDependency>,
}

/// One dependency as it appears in a plan.
#[derive(Debug, Serialize)]
pub struct PlanDependency {
    pub coordinate: String,
    pub version: String,
    pub mode: &'static str,
}

impl PlanDependency {
    fn from_decl(decl: &crate::core::dependency::DependencyDecl) -> Self {
        PlanDependency {
            coordinate: decl.coordinate.to_string(),
            version: decl.version.clone(),
            mode: decl.mode.as_str(),
        }
    }
}

/// Compute the assembly plan without opening any archives.
pub fn plan(manifest: &Manifest) -> Result<AssemblePlan> {
    let version = decorate_version_at(manifest.base_version(), &manifest.manifest_dir)?;
    let partition = Partition::of(manifest.dependencies.iter().cloned());

    Ok(AssemblePlan {
        name: manifest.name().to_string(),
        base_version: manifest.base_version().to_string(),
        artifact: manifest.artifact_file_name(&version),
        minimize: manifest.shade.minimize,
        relocations: manifest.shade.relocation_table()?,
        tokens: manifest.token_map(&version),
        host: partition.host.iter().map(PlanDependency::from_decl).collect(),
        bundled: partition
            .bundled
            .iter()
            .map(PlanDependency::from_decl)
            .collect(),
        version,
    })
}

/// Run the full assembly pipeline.
pub fn assemble(
    manifest: &Manifest,
    shell: &Shell,
    opts: &AssembleOptions,
) -> Result<AssembleResult> {
    let started = Instant::now();

    // Stage 1: version decoration. Fatal before anything else runs.
    let version = decorate_version_at(manifest.base_version(), &manifest.manifest_dir)?;
    shell.status(
        Status::Decorating,
        format!("{} v{}", manifest.name(), version),
    );

    // Stage 2: partition and resolve bundled archives.
    let partition = Partition::of(manifest.dependencies.iter().cloned());
    let mut bundled = Vec::with_capacity(partition.bundled.len());

    let pb = shell.progress(partition.bundled.len() as u64, "resolving archives");
    for decl in &partition.bundled {
        shell.status(
            Status::Resolving,
            format!("{} v{}", decl.coordinate, decl.version),
        );

        if opts.offline && decl.url.is_some() {
            let file_name = decl
                .coordinate
                .archive_file_name(&decl.version, &manifest.build.extension);
            if !opts.cache_dir.join(&file_name).is_file() {
                bail!(
                    "offline mode: `{}` is not cached and cannot be fetched",
                    decl.coordinate
                );
            }
        }

        let path = resolve_archive(
            decl,
            &manifest.manifest_dir,
            &manifest.build.lib_dir,
            &manifest.build.extension,
            &opts.cache_dir,
        )?;

        let entries = archive::read_archive(
            &path,
            EntryOrigin::Bundled(decl.coordinate.to_string()),
        )?;
        bundled.push((decl.coordinate.clone(), entries));
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Stage 3: collect project entries.
    let classes_dir = manifest.manifest_dir.join(&manifest.build.classes);
    if !classes_dir.is_dir() {
        bail!(
            "class directory not found: {} (compile the project first)",
            classes_dir.display()
        );
    }
    let mut project = archive::walk_dir(&classes_dir)
        .with_context(|| format!("failed to collect classes from {}", classes_dir.display()))?;

    if let Some(ref resources) = manifest.build.resources {
        let resources_dir = manifest.manifest_dir.join(resources);
        if resources_dir.is_dir() {
            project.extend(archive::walk_dir(&resources_dir).with_context(|| {
                format!("failed to collect resources from {}", resources_dir.display())
            })?);
        } else {
            tracing::debug!("resource directory {} not found", resources_dir.display());
        }
    }

    // The generated descriptor wins over a handwritten one.
    if let Some(descriptor) = manifest.descriptor(&version) {
        let rendered = descriptor.render()?;
        if let Some(existing) = project.iter_mut().find(|e| e.path == DESCRIPTOR_PATH) {
            shell.warn(format!(
                "replacing handwritten {} with the generated descriptor",
                DESCRIPTOR_PATH
            ));
            existing.data = rendered;
        } else {
            project.push(Entry::project(DESCRIPTOR_PATH, rendered));
        }
    }

    // Stage 4: template project resources.
    shell.status(Status::Templating, "project resources");
    let templater = Templater::new(
        &manifest.resources.patterns,
        manifest.token_map(&version),
    )?;
    templater.apply(&mut project);

    // Stage 5: shade.
    shell.status(
        Status::Shading,
        format!(
            "{} project entries, {} bundled libraries",
            project.len(),
            bundled.len()
        ),
    );
    let minimize = manifest.shade.minimize && !opts.no_minimize;
    let shader = Shader::new(&manifest.shade.relocation_table()?, minimize);
    let entries = shader.shade(project, bundled);

    // Stage 6: write the artifact and its checksum.
    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| manifest.manifest_dir.join(&manifest.build.output_dir));
    let file_name = manifest.artifact_file_name(&version);
    let artifact = output_dir.join(&file_name);

    shell.status(Status::Packaging, artifact.display());
    archive::write_archive(&artifact, &entries)?;

    let digest = sha256_file(&artifact)?;
    let checksum = output_dir.join(format!("{}.sha256", file_name));
    crate::util::fs::write_string(&checksum, &format!("{}  {}\n", digest, file_name))?;

    shell.status(
        Status::Finished,
        format!(
            "{} ({} entries) in {}",
            file_name,
            entries.len(),
            format_duration(started.elapsed())
        ),
    );

    Ok(AssembleResult {
        artifact,
        checksum,
        version,
        entry_count: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::MANIFEST_FILE;
    use crate::util::shell::{ColorChoice, Verbosity};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn quiet_shell() -> Shell {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    fn write_jar(path: &std::path::Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn fixture(tmp: &TempDir) -> Manifest {
        let root = tmp.path();

        std::fs::create_dir_all(root.join("build/classes/com/example")).unwrap();
        std::fs::write(
            root.join("build/classes/com/example/Main.class"),
            b"refs org/incendo/cloud/CommandManager",
        )
        .unwrap();

        std::fs::create_dir_all(root.join("src/main/resources")).unwrap();
        std::fs::write(
            root.join("src/main/resources/config.yml"),
            b"version: ${project.version}\n",
        )
        .unwrap();

        std::fs::create_dir_all(root.join("libs")).unwrap();
        write_jar(
            &root.join("libs/cloud-core-2.0.0.jar"),
            &[
                ("org/incendo/cloud/CommandManager.class", b"bytecode"),
                ("org/incendo/cloud/Unused.class", b"never referenced"),
            ],
        );

        let content = r#"
[package]
name = "plotmines"
version = "1.0"
description = "test plugin"

[plugin]
main = "com.example.Main"

[build]
classes = "build/classes"
resources = "src/main/resources"

[shade]
minimize = true
relocation_base = "com.example.lib"
relocate = ["org.incendo"]

[dependencies]
"org.incendo:cloud-core" = "2.0.0"
"org.spigotmc:spigot-api" = { version = "1.20.4", host = true }
"#;
        let path = root.join(MANIFEST_FILE);
        std::fs::write(&path, content).unwrap();
        Manifest::load(&path).unwrap()
    }

    fn options(tmp: &TempDir) -> AssembleOptions {
        AssembleOptions {
            output_dir: None,
            no_minimize: false,
            offline: false,
            cache_dir: tmp.path().join("cache"),
        }
    }

    #[test]
    fn test_assemble_produces_artifact_and_checksum() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);

        let result = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap();

        assert_eq!(result.version, "1.0");
        assert_eq!(
            result.artifact,
            tmp.path().join("dist").join("plotmines-1.0.jar")
        );
        assert!(result.artifact.is_file());
        assert!(result.checksum.is_file());

        let checksum = std::fs::read_to_string(&result.checksum).unwrap();
        assert_eq!(checksum.len(), 64 + 2 + "plotmines-1.0.jar".len() + 1);
        assert!(checksum.ends_with("plotmines-1.0.jar\n"));
    }

    #[test]
    fn test_assemble_relocates_and_minimizes() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);

        let result = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap();

        let entries = archive::read_archive(&result.artifact, EntryOrigin::Project).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();

        assert!(paths.contains(&"com/example/Main.class"));
        assert!(paths.contains(&"com/example/lib/org/incendo/cloud/CommandManager.class"));
        // Unreferenced bundled class is minimized away.
        assert!(!paths.iter().any(|p| p.ends_with("Unused.class")));
        // No entry keeps the original namespace.
        assert!(!paths.iter().any(|p| p.starts_with("org/incendo/")));

        // The project's own references follow the move.
        let main = entries
            .iter()
            .find(|e| e.path == "com/example/Main.class")
            .unwrap();
        assert!(String::from_utf8_lossy(&main.data)
            .contains("com/example/lib/org/incendo/cloud/CommandManager"));
    }

    #[test]
    fn test_assemble_generates_descriptor_and_templates() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);

        let result = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap();
        let entries = archive::read_archive(&result.artifact, EntryOrigin::Project).unwrap();

        let descriptor = entries.iter().find(|e| e.path == DESCRIPTOR_PATH).unwrap();
        let text = String::from_utf8_lossy(&descriptor.data).to_string();
        assert!(text.contains("name: plotmines"));
        assert!(text.contains("main: com.example.Main"));

        let config = entries.iter().find(|e| e.path == "config.yml").unwrap();
        assert_eq!(config.data, b"version: 1.0\n");
    }

    #[test]
    fn test_generated_descriptor_wins_over_handwritten() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);
        std::fs::write(
            tmp.path().join("src/main/resources/plugin.yml"),
            b"name: stale\n",
        )
        .unwrap();

        let result = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap();
        let entries = archive::read_archive(&result.artifact, EntryOrigin::Project).unwrap();

        let descriptors: Vec<_> = entries
            .iter()
            .filter(|e| e.path == DESCRIPTOR_PATH)
            .collect();
        assert_eq!(descriptors.len(), 1);
        assert!(String::from_utf8_lossy(&descriptors[0].data).contains("name: plotmines"));
    }

    #[test]
    fn test_missing_bundled_archive_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);
        std::fs::remove_file(tmp.path().join("libs/cloud-core-2.0.0.jar")).unwrap();

        let err = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap_err();
        assert!(err.to_string().contains("org.incendo:cloud-core"));
    }

    #[test]
    fn test_missing_classes_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);
        std::fs::remove_dir_all(tmp.path().join("build/classes")).unwrap();

        let err = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap_err();
        assert!(err.to_string().contains("class directory not found"));
    }

    #[test]
    fn test_offline_uncached_url_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fixture(&tmp);

        let content = r#"
[package]
name = "plotmines"
version = "1.0"

[dependencies]
"net.kyori:adventure" = { version = "4.3.2", url = "http://invalid.invalid/a.jar" }
"#;
        let path = tmp.path().join(MANIFEST_FILE);
        std::fs::write(&path, content).unwrap();
        let manifest = Manifest::load(&path).unwrap();

        let mut opts = options(&tmp);
        opts.offline = true;

        let err = assemble(&manifest, &quiet_shell(), &opts).unwrap_err();
        assert!(err.to_string().contains("offline mode"));
    }

    #[test]
    fn test_plan_without_archives() {
        let tmp = TempDir::new().unwrap();
        let manifest = fixture(&tmp);
        // Planning must not care whether the archives exist.
        std::fs::remove_file(tmp.path().join("libs/cloud-core-2.0.0.jar")).unwrap();

        let plan = plan(&manifest).unwrap();
        assert_eq!(plan.name, "plotmines");
        assert_eq!(plan.version, "1.0");
        assert_eq!(plan.artifact, "plotmines-1.0.jar");
        assert_eq!(plan.host.len(), 1);
        assert_eq!(plan.bundled.len(), 1);
        assert_eq!(plan.bundled[0].mode, "bundled");
        assert_eq!(plan.relocations.len(), 1);
        assert_eq!(plan.tokens.get("project.version").unwrap(), "1.0");

        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"org.incendo:cloud-core\""));
    }

    #[test]
    fn test_snapshot_assembly_uses_commit_hash() {
        let tmp = TempDir::new().unwrap();
        fixture(&tmp);

        let repo = git2::Repository::init(tmp.path()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();

        let content = std::fs::read_to_string(tmp.path().join(MANIFEST_FILE))
            .unwrap()
            .replace("version = \"1.0\"", "version = \"1.0-SNAPSHOT\"");
        std::fs::write(tmp.path().join(MANIFEST_FILE), content).unwrap();
        let manifest = Manifest::load(&tmp.path().join(MANIFEST_FILE)).unwrap();

        let result = assemble(&manifest, &quiet_shell(), &options(&tmp)).unwrap();
        let expected = format!("1.0-SNAPSHOT+{}", &oid.to_string()[..7]);
        assert_eq!(result.version, expected);
        assert!(result
            .artifact
            .file_name()
            .unwrap()
            .to_string_lossy()
            .contains(&expected));
    }
}
