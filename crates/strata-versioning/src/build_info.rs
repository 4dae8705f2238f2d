//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "module"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Version resolution against source control and archive metadata."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use serde::Serialize;

/// Compile-time build metadata captured via `vergen`.
///
/// Complements the runtime [`VersionInfo`](crate::VersionInfo) descriptor:
/// binaries stamp themselves with the state of the tree they were compiled
/// from, independent of the tree they later run against.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    /// Workspace semantic version.
    pub semver: String,
    /// Git commit hash captured at build time.
    pub git_sha: String,
    /// Git describe output captured at build time.
    pub git_describe: String,
    /// Build timestamp from the compilation environment.
    pub build_timestamp: String,
}

impl BuildInfo {
    /// Construct a new [`BuildInfo`] instance using environment metadata.
    #[must_use]
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION").to_owned(),
            git_sha: option_env!("VERGEN_GIT_SHA")
                .unwrap_or("UNKNOWN")
                .to_owned(),
            git_describe: option_env!("VERGEN_GIT_DESCRIBE")
                .unwrap_or("UNKNOWN")
                .to_owned(),
            build_timestamp: option_env!("VERGEN_BUILD_TIMESTAMP")
                .unwrap_or("UNKNOWN")
                .to_owned(),
        }
    }

    /// Human readable banner used in logging surfaces.
    #[must_use]
    pub fn banner(&self) -> String {
        format!("strata v{} (git {})", self.semver, self.git_sha)
    }

    /// Extended string containing build metadata suitable for `--version` flags.
    #[must_use]
    pub fn extended(&self) -> String {
        format!(
            "{banner}\nDescribe: {describe}\nBuilt: {built}",
            banner = self.banner(),
            describe = self.git_describe,
            built = self.build_timestamp
        )
    }
}

/// Helper for Clap commands to print the extended version string.
#[must_use]
pub fn clap_long_version() -> String {
    BuildInfo::current().extended()
}
