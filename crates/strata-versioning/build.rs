//! ---
//! strata_section: "01-release-versioning"
//! strata_subsection: "build-script"
//! strata_type: "source"
//! strata_scope: "build"
//! strata_description: "Embeds build-time git and cargo metadata via vergen."
//! strata_version: "v0.1.0-alpha"
//! strata_owner: "tbd"
//! ---
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // No fail_on_error: source archives carry no git metadata and must
    // still build; vergen then emits placeholder values and BuildInfo
    // reports UNKNOWN.
    EmitBuilder::builder().all_build().all_cargo().all_git().emit()?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=gitarchive.toml");
    Ok(())
}
