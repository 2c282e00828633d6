//! Command-line client for the file server
//!
//! Commands:
//! - put: upload a local file
//! - get: download a file to a path or stdout
//! - delete: remove a stored file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use fstore::FileClient;

#[derive(Parser)]
#[command(name = "fstore-client")]
#[command(about = "Client for the fstore file server", long_about = None)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9000")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a local file
    Put {
        /// File to upload
        path: PathBuf,

        /// Name to store it under (defaults to the file's own name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Download a stored file
    Get {
        /// Stored file name
        name: String,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a stored file
    Delete {
        /// Stored file name
        name: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut client = FileClient::connect(&cli.addr)
        .with_context(|| format!("failed to connect to {}", cli.addr))?;

    match cli.command {
        Commands::Put { path, name } => {
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_owned)
                    .with_context(|| format!("cannot derive a name from {}", path.display()))?,
            };

            let file = File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let size = file.metadata()?.len();

            client
                .put_from(&name, BufReader::new(file), size)
                .with_context(|| format!("failed to store {}", name))?;
            println!("Stored {} ({} bytes)", name, size);
        }

        Commands::Get { name, output } => match output {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                let size = client
                    .get_to(&name, &mut writer)
                    .with_context(|| format!("failed to fetch {}", name))?;
                writer.flush()?;
                log::info!("Wrote {} bytes to {}", size, path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                client
                    .get_to(&name, &mut out)
                    .with_context(|| format!("failed to fetch {}", name))?;
                out.flush()?;
            }
        },

        Commands::Delete { name } => {
            client
                .delete(&name)
                .with_context(|| format!("failed to delete {}", name))?;
            println!("Deleted {}", name);
        }
    }

    Ok(())
}
