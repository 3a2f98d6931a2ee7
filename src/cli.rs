use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List CapCut projects found under a drafts directory
    Scan {
        /// Directory containing one sub-directory per project
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Extract subtitles from a project and export them as SRT
    Extract {
        /// Project directory or its draft_content.json
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for the SRT file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Base name of the SRT file (defaults to the project name)
        #[arg(short, long)]
        name: Option<String>,

        /// Export without censoring
        #[arg(long)]
        no_censor: bool,
    },

    /// Translate subtitles from a project, or from the saved session, and export them
    Translate {
        /// Project directory or its draft_content.json (saved session when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Target language (code such as "en" or a language name)
        #[arg(short, long)]
        target_lang: String,

        /// Output directory for the SRT file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Base name of the SRT file
        #[arg(short, long)]
        name: Option<String>,

        /// Export without censoring
        #[arg(long)]
        no_censor: bool,

        /// API key for this run only (overrides the stored key)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Export the saved session again
    Export {
        /// Output directory for the SRT file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Base name of the SRT file
        #[arg(short, long)]
        name: Option<String>,

        /// Export without censoring
        #[arg(long)]
        no_censor: bool,
    },

    /// Inspect or discard the saved session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Manage the translation API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Write the default configuration file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "capsub.toml")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the saved session's subtitles
    Show {
        /// Show uncensored text
        #[arg(long)]
        no_censor: bool,
    },

    /// Discard the saved session
    Clear,
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Validate and store an API key
    Set {
        /// The API key
        key: String,
    },

    /// Validate the stored API key
    Check,

    /// Remove the stored API key and the saved session
    Clear,
}
