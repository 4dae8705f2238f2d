//! ---
//! strata_section: "03-cli-tooling"
//! strata_subsection: "binary"
//! strata_type: "source"
//! strata_scope: "code"
//! strata_description: "Release and packaging CLI for the Strata workspace."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use strata_logging as logging;
use strata_versioning::BuildInfo;

mod version;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    arg_required_else_help = true,
    about = "Strata release and packaging control utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended build information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(subcommand, about = "Version resolution and release stamping actions")]
    Version(version::VersionCommand),
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", BuildInfo::current().extended());
        return Ok(());
    }
    match cli.command {
        Some(Commands::Version(cmd)) => version::run(cmd)?,
        // arg_required_else_help leaves no bare invocation to handle here.
        None => {}
    }
    Ok(())
}
