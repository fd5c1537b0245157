//! Server configuration: `/etc/orgsvc/<name>.toml` plus environment overrides.

use std::path::{Path, PathBuf};

use orgsvc_core::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Default configuration directory for bare context names.
pub const CONFIG_DIR: &str = "/etc/orgsvc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub patch: PatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Reject patches whose record changed between load and save.
    #[serde(default = "default_optimistic")]
    pub optimistic: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            optimistic: default_optimistic(),
        }
    }
}

fn default_expire_secs() -> i64 {
    86_400
}

fn default_optimistic() -> bool {
    true
}

impl ServerConfig {
    /// A bare context name resolves to `/etc/orgsvc/<name>.toml`.
    /// Anything containing `/` or `.` is used as a path directly.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(CONFIG_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    /// Read and parse the TOML file, then apply `ORGSVC_*` environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let mut config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(secret) = lookup("ORGSVC_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Some(raw) = lookup("ORGSVC_JWT_EXPIRE_SECS") {
            self.jwt.expire_secs = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("ORGSVC_JWT_EXPIRE_SECS must be an integer, got {:?}", raw))?;
        }
        if let Some(dir) = lookup("ORGSVC_DATA_DIR") {
            self.storage.data_dir = dir;
        }
        Ok(())
    }

    /// The runtime view handed to storage and modules.
    pub fn service_config(&self, listen: &str) -> ServiceConfig {
        ServiceConfig {
            data_dir: Some(PathBuf::from(&self.storage.data_dir)),
            db_path: None,
            listen: listen.to_string(),
            jwt_secret: self.jwt.secret.clone(),
            jwt_expire_secs: self.jwt.expire_secs,
            optimistic: self.patch.optimistic,
        }
    }
}
