//! Local persistence: a key-value blob medium and the snapshot store on top.

mod blob;
mod store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use store::LocalStore;

/// Key holding the note snapshot (JSON array).
pub const NOTES_KEY: &str = "elegant_writer_notes";
/// Key holding the theme mode (`light`, `dark` or `system`).
pub const THEME_KEY: &str = "brainlog_theme";
/// Key holding the note list layout preference.
pub const VIEW_MODE_KEY: &str = "elegant_writer_view_pref";
/// Key holding the daily goal as a stringified integer.
pub const DAILY_GOAL_KEY: &str = "brainlog_daily_goal";
/// Key holding the stats blob (JSON object).
pub const STATS_KEY: &str = "brainlog_stats";

/// Key holding snapshot text or note records that failed to decode on load.
pub const NOTES_RECOVERY_KEY: &str = "elegant_writer_notes_unreadable";

/// Keys erased on logout. Theme and view mode are device preferences and
/// survive a sign-out.
pub const SESSION_KEYS: [&str; 4] = [NOTES_KEY, STATS_KEY, DAILY_GOAL_KEY, NOTES_RECOVERY_KEY];
