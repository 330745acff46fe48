use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nestup", version, about = "Upload captured images to nest.rip")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload an image file and print its public URL
    Upload {
        /// Path to the image to upload
        file: String,
    },
    /// Open the deletion URL for a previous upload in the browser
    Delete {
        /// Packed history name, as shown by `nestup history`
        name: Option<String>,
        /// Raw deletion token from an upload result
        #[arg(long, conflicts_with = "name")]
        token: Option<String>,
    },
    /// List recorded uploads
    History,
    /// Remove a local history record (does not delete the remote file)
    Forget {
        /// Packed history name to remove
        name: String,
    },
    /// Delete history records older than the cleanup window
    Cleanup {
        /// Age cutoff in days; defaults to the configured value
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show or update configuration
    Config {
        /// Store the nest.rip upload client secret
        #[arg(long, value_name = "SECRET")]
        set_secret: Option<String>,
    },
}
