//! Store configuration loaded from environment variables.
//!
//! All settings have defaults so the store can start with zero
//! configuration.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use palaver_shared::constants::{
    DEFAULT_CONVERSATIONS_FILE, DEFAULT_GROUPS_FILE, DEFAULT_RECENT_LIMIT, DEFAULT_USERS_FILE,
};

/// Where the three tables live, and how much history a collaborator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the tables.
    /// Env: `PALAVER_DATA_DIR`
    /// Default: the platform data directory, e.g.
    /// - Linux:   `~/.local/share/palaver`
    /// - macOS:   `~/Library/Application Support/com.palaver.palaver`
    /// - Windows: `{FOLDERID_RoamingAppData}\palaver\palaver\data`
    ///
    /// or `.` when none can be determined.
    pub data_dir: PathBuf,

    /// Identity table. Relative paths resolve against `data_dir`.
    /// Env: `PALAVER_USERS_FILE`
    /// Default: `users.csv`
    pub users_file: PathBuf,

    /// Conversation table.
    /// Env: `PALAVER_CONVERSATIONS_FILE`
    /// Default: `conversations.csv`
    pub conversations_file: PathBuf,

    /// Group table.
    /// Env: `PALAVER_GROUPS_FILE`
    /// Default: `groups.csv`
    pub groups_file: PathBuf,

    /// Number of messages shown per conversation or group.
    /// Env: `PALAVER_RECENT_LIMIT`
    /// Default: `20`
    pub recent_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_dir(default_data_dir())
    }
}

impl StoreConfig {
    /// Default file names inside an explicit directory.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            conversations_file: PathBuf::from(DEFAULT_CONVERSATIONS_FILE),
            groups_file: PathBuf::from(DEFAULT_GROUPS_FILE),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match lookup("PALAVER_DATA_DIR") {
            Some(dir) if !dir.is_empty() => Self::in_dir(dir),
            _ => Self::default(),
        };

        if let Some(path) = lookup("PALAVER_USERS_FILE") {
            config.users_file = PathBuf::from(path);
        }

        if let Some(path) = lookup("PALAVER_CONVERSATIONS_FILE") {
            config.conversations_file = PathBuf::from(path);
        }

        if let Some(path) = lookup("PALAVER_GROUPS_FILE") {
            config.groups_file = PathBuf::from(path);
        }

        if let Some(val) = lookup("PALAVER_RECENT_LIMIT") {
            match val.parse::<usize>() {
                Ok(n) => config.recent_limit = n,
                Err(_) => {
                    tracing::warn!(
                        value = %val,
                        "Invalid PALAVER_RECENT_LIMIT, using default"
                    );
                }
            }
        }

        config
    }

    pub fn users_path(&self) -> PathBuf {
        self.resolve(&self.users_file)
    }

    pub fn conversations_path(&self) -> PathBuf {
        self.resolve(&self.conversations_file)
    }

    pub fn groups_path(&self) -> PathBuf {
        self.resolve(&self.groups_file)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}

fn default_data_dir() -> PathBuf {
    match ProjectDirs::from("com", "palaver", "palaver") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => {
            tracing::warn!("Could not determine application data directory, using current directory");
            PathBuf::from(".")
        }
    }
}
