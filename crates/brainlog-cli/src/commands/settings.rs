use brainlog_core::sync::ProfileOutcome;
use brainlog_core::ui::UiContext;
use brainlog_core::{Settings, ThemeMode};

use crate::cli::{SettingsCommands, ThemeArg};
use crate::commands::common::{describe_profile, Engine};
use crate::error::CliError;

impl From<ThemeArg> for ThemeMode {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
            ThemeArg::System => Self::System,
        }
    }
}

#[derive(Debug, Default)]
pub struct SettingsChange {
    pub theme: Option<ThemeMode>,
    pub view_mode: Option<String>,
    pub daily_goal: Option<i64>,
}

impl SettingsChange {
    /// Apply the change, returning whether anything was set.
    pub fn apply(self, settings: &mut Settings) -> Result<bool, CliError> {
        let mut changed = false;
        if let Some(theme) = self.theme {
            settings.theme = theme;
            changed = true;
        }
        if let Some(view_mode) = self.view_mode {
            let view_mode = view_mode.trim();
            if view_mode.is_empty() {
                return Err(CliError::Config("view mode must not be empty".to_string()));
            }
            settings.view_mode = view_mode.to_string();
            changed = true;
        }
        if let Some(daily_goal) = self.daily_goal {
            if daily_goal < 0 {
                return Err(CliError::Config(
                    "daily goal must not be negative".to_string(),
                ));
            }
            settings.daily_goal = daily_goal;
            changed = true;
        }
        Ok(changed)
    }
}

pub fn format_settings_lines(settings: &Settings, prefers_dark: bool) -> Vec<String> {
    vec![
        format!(
            "theme       {} (resolves to {})",
            settings.theme,
            settings.theme.resolve(prefers_dark).as_str()
        ),
        format!("view_mode   {}", settings.view_mode),
        format!("daily_goal  {}", settings.daily_goal),
        format!("stats       {}", settings.stats),
    ]
}

pub async fn run_settings(engine: &Engine, command: SettingsCommands) -> Result<(), CliError> {
    match command {
        SettingsCommands::Show { json } => {
            let settings = engine.local().settings().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                let prefers_dark = engine.ui().prefers_dark();
                for line in format_settings_lines(&settings, prefers_dark) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        SettingsCommands::Set {
            theme,
            view_mode,
            daily_goal,
        } => {
            let change = SettingsChange {
                theme: theme.map(ThemeMode::from),
                view_mode,
                daily_goal,
            };
            let mut settings = engine.local().settings().await;
            if !change.apply(&mut settings)? {
                return Err(CliError::NothingToChange);
            }
            engine.local().save_settings(settings).await?;

            let outcome = engine.update_profile().await;
            match outcome {
                ProfileOutcome::Failed { .. } => {
                    eprintln!("Saved locally; profile {}", describe_profile(&outcome));
                }
                _ => println!("Settings saved; profile {}", describe_profile(&outcome)),
            }
            Ok(())
        }
    }
}
