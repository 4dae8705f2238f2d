//! ---
//! strata_section: "03-cli-tooling"
//! strata_subsection: "binary"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Release and packaging CLI for the Strata workspace."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use strata_logging::{log_release_step, ReleaseStepOutcome};
use strata_versioning::{archive, ArchiveRecord, Resolver, VersionInfo, FALLBACK_VERSION};

/// Dispatch entry point for version-related subcommands.
pub fn run(command: VersionCommand) -> Result<()> {
    match command {
        VersionCommand::Show(cmd) => cmd.execute(),
        VersionCommand::Stamp(cmd) => cmd.execute(),
        VersionCommand::Check(cmd) => cmd.execute(),
    }
}

#[derive(Debug, Subcommand)]
pub enum VersionCommand {
    /// Resolve and print the version descriptor for a source tree.
    #[command(name = "show")]
    Show(ShowCommand),
    /// Write the JSON descriptor consumed by packaging and documentation tooling.
    #[command(name = "stamp")]
    Stamp(StampCommand),
    /// Validate that the checked-in fallback version matches source control.
    #[command(name = "check")]
    Check(CheckCommand),
}

/// Flags shared by every version subcommand.
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Source tree to resolve (defaults to the current directory).
    #[arg(long = "tree", value_name = "DIR", default_value = ".")]
    tree: PathBuf,

    /// Archive metadata record (defaults to the record shipped with the
    /// versioning crate).
    #[arg(long = "record", value_name = "FILE")]
    record: Option<PathBuf>,
}

impl TreeArgs {
    fn resolve(&self) -> Result<VersionInfo> {
        let record_path = self
            .record
            .clone()
            .unwrap_or_else(archive::default_record_path);
        let record = ArchiveRecord::load(&record_path)
            .with_context(|| format!("failed to load archive record {}", record_path.display()))?;
        let resolver = Resolver::from_tree(&self.tree);
        resolver
            .resolve(FALLBACK_VERSION, record.as_ref())
            .with_context(|| format!("failed to resolve version for {}", self.tree.display()))
    }
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    #[command(flatten)]
    tree: TreeArgs,

    /// Emit the descriptor as JSON instead of the plain listing.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,
}

impl ShowCommand {
    pub fn execute(self) -> Result<()> {
        let info = self.tree.resolve()?;
        if self.json {
            println!("{}", render_descriptor(&info)?);
        } else {
            println!("version     {}", info.version);
            println!("commit      {}", info.commit);
            println!("date        {}", info.date);
            println!("patchnumber {}", info.patchnumber);
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct StampCommand {
    #[command(flatten)]
    tree: TreeArgs,

    /// Destination for the JSON descriptor.
    #[arg(long = "output", value_name = "FILE")]
    output: PathBuf,
}

impl StampCommand {
    pub fn execute(self) -> Result<()> {
        let info = self.tree.resolve()?;
        let rendered = render_descriptor(&info)?;
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        fs::write(&self.output, rendered)
            .with_context(|| format!("unable to write descriptor to {}", self.output.display()))?;
        log_release_step(
            "version.stamp",
            &format!("descriptor {} written to {}", info, self.output.display()),
            ReleaseStepOutcome::Success,
        );
        println!("Stamped {} into {}", info, self.output.display());
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    tree: TreeArgs,
}

impl CheckCommand {
    pub fn execute(self) -> Result<()> {
        let info = match self.tree.resolve() {
            Ok(info) => info,
            Err(error) => {
                log_release_step(
                    "version.check",
                    &format!("release identity could not be validated: {error:#}"),
                    ReleaseStepOutcome::Fault,
                );
                return Err(error);
            }
        };
        log_release_step(
            "version.check",
            &format!("release identity {} validated", info),
            ReleaseStepOutcome::Success,
        );
        println!("Release identity OK: {} at commit {}", info, info.commit);
        Ok(())
    }
}

fn render_descriptor(info: &VersionInfo) -> Result<String> {
    serde_json::to_string_pretty(info).context("failed to serialise version descriptor")
}
