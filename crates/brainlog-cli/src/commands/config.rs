use std::env;
use std::path::PathBuf;

use brainlog_core::config::{SUPABASE_ANON_KEY_ENV, SUPABASE_URL_ENV};
use brainlog_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Values passed to `config init`.
#[derive(Debug, Default)]
pub struct ProfileInit {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub prefers_dark: Option<bool>,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            data_dir,
            prefers_dark,
            no_activate,
        } => run_config_init(
            global_profile,
            ProfileInit {
                supabase_url,
                supabase_anon_key,
                data_dir,
                prefers_dark,
            },
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    init: ProfileInit,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    merge_profile(
        profile,
        init,
        normalize_text_option(env::var(SUPABASE_URL_ENV).ok()),
        normalize_text_option(env::var(SUPABASE_ANON_KEY_ENV).ok()),
    )?;
    let missing_fields = missing_fields(profile);

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `brainlog auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Explicit values win over the environment, which wins over what the
/// profile already holds.
pub fn merge_profile(
    profile: &mut CliProfile,
    init: ProfileInit,
    env_url: Option<String>,
    env_anon_key: Option<String>,
) -> Result<(), CliError> {
    if let Some(value) = normalize_text_option(init.supabase_url).or(env_url) {
        profile.supabase_url = Some(value);
    }
    if let Some(value) = normalize_text_option(init.supabase_anon_key).or(env_anon_key) {
        profile.supabase_anon_key = Some(value);
    }
    if let Some(dir) = init.data_dir {
        profile.data_dir = Some(dir);
    }
    if let Some(prefers_dark) = init.prefers_dark {
        profile.prefers_dark = Some(prefers_dark);
    }

    if profile.supabase_url().is_some() && profile.supabase_anon_key().is_some() {
        profile
            .supabase_config()
            .map_err(|error| CliError::Config(error.to_string()))?;
    }
    Ok(())
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.supabase_url().is_none() {
        missing.push("supabase_url");
    }
    if profile.supabase_anon_key().is_none() {
        missing.push("supabase_anon_key");
    }
    missing
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let Some(profile) = config.profile(&profile_name) else {
        println!("Profile '{profile_name}' is not configured.");
        return Ok(());
    };

    let data_dir = profile.data_dir(&profile_name).map_err(CliError::Config)?;
    println!("profile            {profile_name}");
    println!(
        "supabase_url       {}",
        profile.supabase_url().as_deref().unwrap_or("(unset)")
    );
    println!(
        "supabase_anon_key  {}",
        if profile.supabase_anon_key().is_some() {
            "(set)"
        } else {
            "(unset)"
        }
    );
    println!("data_dir           {}", data_dir.display());
    println!("prefers_dark       {}", profile.prefers_dark());
    Ok(())
}
