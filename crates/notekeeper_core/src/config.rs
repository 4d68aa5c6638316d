//! Store configuration.

/// Slot key used by the original app and by default here.
pub const DEFAULT_SLOT_KEY: &str = "notes";

/// Environment variable consulted by front ends for the database path.
pub const DB_PATH_ENV: &str = "NOTEKEEPER_DB";

/// Database file name used when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "notekeeper.sqlite3";

/// Tunables for a `NoteStore` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend key holding the serialized note list.
    pub slot_key: String,
}

impl StoreConfig {
    pub fn with_slot_key(mut self, slot_key: impl Into<String>) -> Self {
        self.slot_key = slot_key.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}
