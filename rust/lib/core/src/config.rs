use std::path::PathBuf;

/// Runtime configuration shared by all modules.
///
/// The server binary builds this from its TOML file, environment overrides
/// and command-line flags, then hands it to the storage layer and modules.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the database file.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,

    /// Access token lifetime in seconds.
    pub jwt_expire_secs: i64,

    /// Reject patch writes whose stored record changed since it was loaded.
    pub optimistic: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            listen: "0.0.0.0:8080".to_string(),
            jwt_secret: String::new(),
            jwt_expire_secs: 86_400,
            optimistic: true,
        }
    }
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}
