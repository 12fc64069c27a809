//! Functionality relating to the `recipes research` subcommand itself.

use std::io;
use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use tracing::info;

use crate::research;
use crate::utils::interact::yes_or_no;

/// Clap arguments for the `recipes research` subcommand.
#[derive(Args)]
pub struct ResearchArgs {
    /// Project directory to create.
    #[arg(short, long, value_name = "DIR")]
    dir: PathBuf,

    /// Remote server the project is synced with.
    #[arg(short, long, value_name = "HOST", default_value = research::DEFAULT_REMOTE)]
    remote: String,

    /// Add the project files to an existing directory without asking.
    #[arg(short, long)]
    yes: bool,
}

/// Main function for the `recipes research` subcommand.
pub fn research(args: ResearchArgs) -> anyhow::Result<()> {
    info!("Starting research subcommand.");

    if !args.dir.exists() {
        return research::create_research_project(&args.dir, &args.remote);
    }

    if !args.dir.is_dir() {
        bail!("not a directory: {}", args.dir.display());
    }

    let message = format!(
        "{} already exists. Add the project files to it? [y/n] ",
        args.dir.display()
    );
    let proceed = args.yes || yes_or_no(io::stdin().lock(), io::stderr(), &message)?;

    match proceed {
        true => research::write_project_files(&args.dir, &args.remote),
        false => {
            info!("Leaving {} untouched.", args.dir.display());
            Ok(())
        }
    }
}
