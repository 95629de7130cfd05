//! Version decoration.
//!
//! A base version ending in the `-SNAPSHOT` marker is decorated with the
//! short commit hash of the current checkout: `1.0-SNAPSHOT+abcdef1`.
//! Release versions pass through untouched. A snapshot build outside a
//! version-controlled checkout is a configuration error, never a silent
//! fallback.

use std::path::{Path, PathBuf};

use git2::Repository;
use miette::Diagnostic;
use thiserror::Error;

/// Pre-release marker recognized on base versions.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Number of commit-hash characters appended to snapshot versions.
pub const SHORT_HASH_LEN: usize = 7;

/// Errors from version decoration.
#[derive(Debug, Error, Diagnostic)]
pub enum VersionError {
    #[error("could not determine commit hash for snapshot version `{version}`")]
    #[diagnostic(
        code(stevedore::version::no_commit),
        help("snapshot versions require a git checkout with at least one commit; \
              commit your work or drop the -SNAPSHOT suffix")
    )]
    CommitUnresolved {
        version: String,
        #[source]
        source: git2::Error,
    },

    #[error("resolved commit id `{hash}` is shorter than {SHORT_HASH_LEN} characters")]
    #[diagnostic(code(stevedore::version::short_hash))]
    HashTooShort { hash: String },
}

/// Commit-hash lookup capability.
///
/// The production implementation reads the repository; tests substitute
/// a fixed hash or a guaranteed failure.
pub trait CommitResolver {
    /// Resolve the full commit hash of the current checkout.
    fn resolve(&self) -> Result<String, git2::Error>;
}

/// Resolves the commit hash from the git repository containing a path.
pub struct GitCommitResolver {
    root: PathBuf,
}

impl GitCommitResolver {
    /// Create a resolver that discovers the repository from `root` upward.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GitCommitResolver { root: root.into() }
    }
}

impl CommitResolver for GitCommitResolver {
    fn resolve(&self) -> Result<String, git2::Error> {
        let repo = Repository::discover(&self.root)?;
        let commit = repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}

/// Derive the final version string from a base version.
///
/// Snapshot bases get `+` and the first [`SHORT_HASH_LEN`] characters of
/// the current commit hash appended; anything else is returned unchanged
/// without consulting the resolver.
pub fn decorate_version(base: &str, resolver: &dyn CommitResolver) -> Result<String, VersionError> {
    if !base.ends_with(SNAPSHOT_SUFFIX) {
        return Ok(base.to_string());
    }

    let hash = resolver
        .resolve()
        .map_err(|source| VersionError::CommitUnresolved {
            version: base.to_string(),
            source,
        })?;

    if hash.len() < SHORT_HASH_LEN {
        return Err(VersionError::HashTooShort { hash });
    }

    Ok(format!("{}+{}", base, &hash[..SHORT_HASH_LEN]))
}

/// Decorate a base version against the repository containing `root`.
pub fn decorate_version_at(base: &str, root: &Path) -> Result<String, VersionError> {
    decorate_version(base, &GitCommitResolver::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct FixedResolver(&'static str);

    impl CommitResolver for FixedResolver {
        fn resolve(&self) -> Result<String, git2::Error> {
            Ok(self.0.to_string())
        }
    }

    struct FailingResolver;

    impl CommitResolver for FailingResolver {
        fn resolve(&self) -> Result<String, git2::Error> {
            Err(git2::Error::from_str("not a repository"))
        }
    }

    #[test]
    fn test_snapshot_appends_short_hash() {
        let decorated =
            decorate_version("1.0-SNAPSHOT", &FixedResolver("abcdef1234567")).unwrap();
        assert_eq!(decorated, "1.0-SNAPSHOT+abcdef1");
    }

    #[test]
    fn test_release_unchanged() {
        // Non-snapshot versions never touch the resolver.
        let decorated = decorate_version("1.0", &FailingResolver).unwrap();
        assert_eq!(decorated, "1.0");
    }

    #[test]
    fn test_snapshot_without_commit_is_fatal() {
        let err = decorate_version("1.0-SNAPSHOT", &FailingResolver).unwrap_err();
        assert!(matches!(err, VersionError::CommitUnresolved { .. }));
        assert!(err.to_string().contains("1.0-SNAPSHOT"));
    }

    #[test]
    fn test_short_hash_rejected() {
        let err = decorate_version("1.0-SNAPSHOT", &FixedResolver("abc")).unwrap_err();
        assert!(matches!(err, VersionError::HashTooShort { .. }));
    }

    #[test]
    fn test_git_resolver_reads_head() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();

        let resolver = GitCommitResolver::new(tmp.path());
        assert_eq!(resolver.resolve().unwrap(), oid.to_string());

        let decorated = decorate_version("2.3-SNAPSHOT", &resolver).unwrap();
        assert_eq!(decorated, format!("2.3-SNAPSHOT+{}", &oid.to_string()[..7]));
    }

    #[test]
    fn test_git_resolver_unborn_head_fails() {
        let tmp = TempDir::new().unwrap();
        Repository::init(tmp.path()).unwrap();

        let err = decorate_version_at("1.0-SNAPSHOT", tmp.path()).unwrap_err();
        assert!(matches!(err, VersionError::CommitUnresolved { .. }));
    }
}
