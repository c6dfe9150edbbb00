use brainlog_core::sync::{SyncOutcome, WriteOutcome};

use crate::commands::common::{describe_profile, describe_write, Engine};
use crate::error::CliError;

pub async fn run_sync(engine: &Engine) -> Result<(), CliError> {
    match engine.sync().await? {
        SyncOutcome::SignedOut => {
            println!("Not signed in; local notes left untouched.");
        }
        SyncOutcome::Completed(report) => {
            if let Some(error) = &report.remote_error {
                eprintln!("Warning: could not read remote notes: {error}");
            }
            println!(
                "Sync completed: {} notes ({} pulled, {} kept local); profile {}",
                report.total,
                report.merge.pulled,
                report.merge.kept_local,
                describe_profile(&report.profile)
            );
        }
    }
    Ok(())
}

pub async fn run_logout(engine: &Engine) -> Result<(), CliError> {
    let report = engine.logout().await?;

    match &report.backup.notes {
        WriteOutcome::Failed { .. } => {
            eprintln!("Warning: backup {}", describe_write(&report.backup.notes));
        }
        outcome => println!("Backup: {}", describe_write(outcome)),
    }
    if let Some(profile) = &report.backup.profile {
        println!("Profile: {}", describe_profile(profile));
    }
    if let Some(error) = &report.sign_out_error {
        eprintln!("Warning: remote sign-out failed: {error}");
    }
    if !report.backup.is_complete() {
        eprintln!("Warning: some local changes may not have reached the server.");
    }
    Ok(())
}
