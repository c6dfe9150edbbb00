use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "brainlog")]
#[command(about = "Offline-first notes that sync to your Supabase project")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (selects Supabase project, keychain entry and data directory)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a document or folder
    #[command(alias = "new")]
    Add {
        /// Display name
        name: String,
        /// Create a folder instead of a document
        #[arg(long)]
        folder: bool,
        /// Parent folder ID
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
        /// Document body
        #[arg(long)]
        content: Option<String>,
    },
    /// List notes in the local snapshot
    List {
        /// Include trashed notes
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename, rewrite or move a note
    Edit {
        /// Note ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New body
        #[arg(long)]
        content: Option<String>,
        /// New parent folder ID
        #[arg(long, value_name = "ID", conflicts_with = "root")]
        parent: Option<String>,
        /// Move the note to the top level
        #[arg(long)]
        root: bool,
    },
    /// Move a note to the trash
    Trash {
        /// Note ID
        id: String,
    },
    /// Restore a note from the trash
    Restore {
        /// Note ID
        id: String,
    },
    /// Delete a note permanently, locally and remotely
    Delete {
        /// Note ID
        id: String,
    },
    /// Merge remote notes and profile into the local snapshot
    Sync,
    /// Back up everything, sign out and erase local session data
    Logout,
    /// Show or change profile settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    System,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change settings and push them to the profile
    Set {
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
        #[arg(long, value_name = "MODE")]
        view_mode: Option<String>,
        #[arg(long, value_name = "N")]
        daily_goal: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Directory for the local snapshot
        #[arg(long, value_name = "PATH")]
        data_dir: Option<PathBuf>,
        /// Resolve the `system` theme as dark
        #[arg(long)]
        prefers_dark: Option<bool>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved profile
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign in with email/password, store the session in the keychain and sync
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for the profile
    Status,
}
