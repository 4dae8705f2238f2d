//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

/// Source-control queries consumed by the resolver.
///
/// [`SystemGit`] answers them by spawning the `git` binary against a working
/// tree; tests substitute scripted implementations. A failed query is
/// reported as `None` and selects the archival fallback path, it is never an
/// error by itself.
pub trait GitBackend {
    /// Nearest ancestor release tag with the commit distance, as printed by
    /// `git describe --match=v[0-9]*`.
    fn describe(&self) -> Option<String>;

    /// Current revision as `<full-hash> <author-date>`, as printed by
    /// `git log -1 --format=%H %ai`.
    fn last_commit(&self) -> Option<String>;
}

/// [`GitBackend`] backed by the `git` binary, rooted at a working tree.
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
}

impl SystemGit {
    /// Query the working tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory the queries run against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            debug!(root = %self.root.display(), ?args, "git query failed");
            return None;
        }
        let stdout = String::from_utf8(output.stdout).ok()?;
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }
}

impl Default for SystemGit {
    /// Query the source tree this crate is checked into, mirroring the
    /// co-located fallback and archive records.
    fn default() -> Self {
        Self::new(env!("CARGO_MANIFEST_DIR"))
    }
}

impl GitBackend for SystemGit {
    fn describe(&self) -> Option<String> {
        self.run(&["describe", "--match=v[0-9]*"])
    }

    fn last_commit(&self) -> Option<String> {
        self.run(&["log", "-1", "--format=%H %ai"])
    }
}
