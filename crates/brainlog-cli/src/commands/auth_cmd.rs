use brainlog_core::auth::{AuthProvider, SignUpOutcome};

use crate::cli::AuthCommands;
use crate::commands::common::{open_engine, ProfileContext};
use crate::commands::sync::run_sync;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, context: &ProfileContext) -> Result<(), CliError> {
    let engine = open_engine(context)?;
    let profile_name = &context.name;

    match command {
        AuthCommands::Signup { email, password } => {
            let outcome = engine
                .auth()
                .sign_up(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            match outcome {
                SignUpOutcome::SignedIn(session) => {
                    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                    println!("Created account and signed in profile '{profile_name}' as {email_label}");
                    run_sync(&engine).await
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!("Check {email} to confirm the account, then run `brainlog auth login`.");
                    Ok(())
                }
            }
        }
        AuthCommands::Login { email, password } => {
            let session = engine
                .auth()
                .sign_in(&email, &password)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            let email_label = session.user.email.as_deref().unwrap_or("(no email)");
            println!("Signed in profile '{profile_name}' as {email_label}");
            run_sync(&engine).await
        }
        AuthCommands::Status => {
            let session = engine
                .auth()
                .current_session()
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Profile '{}' is signed in as {} (expires_at={})",
                    profile_name, email_label, session.expires_at
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
    }
}
