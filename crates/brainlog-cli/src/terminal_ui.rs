use std::cell::Cell;

use brainlog_core::models::ResolvedTheme;
use brainlog_core::ui::UiContext;

/// Terminal stand-in for the app shell.
#[derive(Debug, Default)]
pub struct TerminalUi {
    prefers_dark: bool,
    sign_in_shown: Cell<bool>,
}

impl TerminalUi {
    pub const fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark,
            sign_in_shown: Cell::new(false),
        }
    }

    pub fn sign_in_shown(&self) -> bool {
        self.sign_in_shown.get()
    }
}

impl UiContext for TerminalUi {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    fn apply_theme(&self, theme: ResolvedTheme) {
        tracing::debug!("Resolved theme: {}", theme.as_str());
    }

    fn show_sign_in(&self) {
        self.sign_in_shown.set(true);
        println!("Signed out. Run `brainlog auth login --email <email> --password <password>` to continue.");
    }
}
