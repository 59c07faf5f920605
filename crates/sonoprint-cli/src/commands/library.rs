//! Transform library commands.

use clap::{Args, Subcommand};
use sonoprint_config::{TransformFile, list_user_transforms, transform_name_from_path, user_transforms_dir};

#[derive(Args)]
pub struct LibraryArgs {
    #[command(subcommand)]
    command: LibraryCommand,
}

#[derive(Subcommand)]
enum LibraryCommand {
    /// List saved transforms
    List,

    /// Print the library directory
    Path,
}

pub fn run(args: LibraryArgs) -> anyhow::Result<()> {
    match args.command {
        LibraryCommand::List => list(),
        LibraryCommand::Path => {
            println!("{}", user_transforms_dir().display());
            Ok(())
        }
    }
}

fn list() -> anyhow::Result<()> {
    let transforms = list_user_transforms();
    if transforms.is_empty() {
        println!("No saved transforms in {}", user_transforms_dir().display());
        println!("Use 'sonoprint capture --save --name <NAME> ...' to add one.");
        return Ok(());
    }

    println!("Saved transforms ({}):", user_transforms_dir().display());
    for path in &transforms {
        let id = transform_name_from_path(path).unwrap_or_else(|| path.display().to_string());
        match TransformFile::load(path) {
            Ok(file) => println!(
                "  {id:<24} {:<13} frame {:>5}  {}",
                file.category.as_str(),
                file.frame_size,
                file.name
            ),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable transform");
                println!("  {id:<24} (invalid: {e})");
            }
        }
    }

    Ok(())
}
