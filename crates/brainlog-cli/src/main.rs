//! BrainLog CLI - offline-first notes from the terminal
//!
//! Every command works against the local snapshot of the selected profile and
//! mirrors changes to Supabase when a session is available.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
mod terminal_ui;


use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::{load_profile, open_engine};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::notes::{run_add, run_delete, run_edit, run_list, run_set_trashed, NoteEdit};
use crate::commands::settings::run_settings;
use crate::commands::sync::{run_logout, run_sync};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "brainlog=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Config { command } => return run_config(command, profile),
        Commands::Completions { shell, output } => {
            return run_completions(shell, output.as_deref());
        }
        _ => {}
    }

    let context = load_profile(profile)?;
    if let Commands::Auth { command } = cli.command {
        return run_auth(command, &context).await;
    }

    let engine = open_engine(&context)?;
    match cli.command {
        Commands::Add {
            name,
            folder,
            parent,
            content,
        } => run_add(&engine, &name, folder, parent.as_deref(), content).await,
        Commands::List { all, json } => run_list(&engine, all, json).await,
        Commands::Edit {
            id,
            name,
            content,
            parent,
            root,
        } => {
            let edit = NoteEdit {
                name,
                content,
                parent,
                move_to_root: root,
            };
            run_edit(&engine, &id, edit).await
        }
        Commands::Trash { id } => run_set_trashed(&engine, &id, true).await,
        Commands::Restore { id } => run_set_trashed(&engine, &id, false).await,
        Commands::Delete { id } => run_delete(&engine, &id).await,
        Commands::Sync => run_sync(&engine).await,
        Commands::Logout => run_logout(&engine).await,
        Commands::Settings { command } => run_settings(&engine, command).await,
        Commands::Config { .. } | Commands::Completions { .. } | Commands::Auth { .. } => Ok(()),
    }
}
