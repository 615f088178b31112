//! Command line interface for the NSIS bundler.
//!
//! Loads the project manifest, builds [`Settings`](crate::bundler::Settings)
//! from it and the arguments, and runs the [`Bundler`].

mod args;

pub use args::Args;

use crate::{
    bundler::{BundleOutcome, Bundler, SettingsBuilder},
    error::{BundlerError, CliError, Result},
    metadata,
};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(args).await
}

/// Runs an already parsed command line.
pub async fn execute(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| BundlerError::Cli(CliError::InvalidArguments { reason }))?;

    let manifest = metadata::load_manifest(&args.project_dir.join("Cargo.toml"))?;
    let mut app_info = manifest.app_info;
    if args.build_number.is_some() {
        app_info.build_number = args.build_number.clone();
    }

    let mut builder = SettingsBuilder::new()
        .project_dir(&args.project_dir)
        .app_info(app_info)
        .bundle_settings(manifest.bundle_settings)
        .dry_run(args.dry_run);
    if let Some(dir) = &args.out_dir {
        builder = builder.project_out_directory(dir);
    }
    if let Some(dir) = &args.build_resources {
        builder = builder.build_resources_dir(dir);
    }
    if let Some(dir) = &args.templates_dir {
        builder = builder.nsis_templates_dir(dir);
    }
    let settings = builder.build()?;

    let bundler = Bundler::new(settings)?;
    match bundler.bundle(&args.app_dirs).await? {
        BundleOutcome::DryRun { defines, commands } => {
            let json = serde_json::json!({ "defines": defines, "commands": commands });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        BundleOutcome::Artifacts(artifacts) => {
            for artifact in &artifacts {
                println!(
                    "{}  {}  ({} bytes, sha256 {})",
                    artifact.display_name,
                    artifact.path.display(),
                    artifact.size,
                    artifact.checksum
                );
            }
        }
    }

    Ok(0)
}
