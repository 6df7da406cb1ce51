#![forbid(unsafe_code)]

mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "acfcli", version, about = "ACF archiver (create, list, extract)")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an archive from files and directories.
    #[command(alias = "c")]
    Create {
        /// Output archive file.
        archive: PathBuf,
        /// Input files and directories.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory entry paths are stored relative to.
        #[arg(long, default_value = ".")]
        base: PathBuf,
        /// Prefix prepended to every entry path inside the archive.
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// List the contents of an archive.
    #[command(alias = "l")]
    List { archive: PathBuf },

    /// Extract an archive to a directory.
    #[command(alias = "x")]
    Extract {
        archive: PathBuf,
        /// Output directory.
        #[arg(default_value = ".")]
        output: PathBuf,
    },

    /// Decode every entry and check its integrity.
    #[command(alias = "v")]
    Verify { archive: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let res = match cli.cmd {
        Command::Create {
            archive,
            inputs,
            base,
            prefix,
        } => ui::create(&archive, &inputs, &base, &prefix),
        Command::List { archive } => ui::list(&archive),
        Command::Extract { archive, output } => ui::extract(&archive, &output),
        Command::Verify { archive } => ui::verify(&archive),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
