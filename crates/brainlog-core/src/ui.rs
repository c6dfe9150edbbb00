//! The host UI as seen by the sync engine.

use crate::models::ResolvedTheme;

/// Presentation hooks the engine drives: theme application after a profile
/// pull and navigation after logout.
pub trait UiContext {
    /// Current light/dark preference of the runtime.
    fn prefers_dark(&self) -> bool;

    /// Apply a concrete theme to the active surface.
    fn apply_theme(&self, theme: ResolvedTheme);

    /// Navigate to the unauthenticated entry surface.
    fn show_sign_in(&self);
}
