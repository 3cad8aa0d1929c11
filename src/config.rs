use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_api_key")]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_public_root")]
    pub public_root: String,
    #[serde(default = "default_private_root")]
    pub private_root: String,
    /// URL prefix under which the public root is served
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "data/porchlight.db".to_string()
}

fn default_admin_api_key() -> String {
    "changeme-admin-key".to_string()
}

fn default_public_root() -> String {
    "data/media_public".to_string()
}

fn default_private_root() -> String {
    "data/media_private".to_string()
}

fn default_public_base_url() -> String {
    "/media".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://localhost".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_key: default_admin_api_key(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            public_root: default_public_root(),
            private_root: default_private_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            admin: AdminConfig::default(),
            media: MediaConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;

        if config.admin.api_key == default_admin_api_key() {
            tracing::warn!(
                "Admin API key is the built-in default; set PL_CONF_ADMIN_API_KEY before exposing this server"
            );
        }

        Ok(config)
    }

    /// Load configuration from config.toml if present
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: PL_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("PL_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("PL_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("PL_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Admin overrides
        if let Ok(val) = env::var("PL_CONF_ADMIN_API_KEY") {
            if !val.trim().is_empty() {
                self.admin.api_key = val;
            }
        }

        // Media overrides
        if let Ok(val) = env::var("PL_CONF_MEDIA_PUBLIC_ROOT") {
            self.media.public_root = val;
        }
        if let Ok(val) = env::var("PL_CONF_MEDIA_PRIVATE_ROOT") {
            self.media.private_root = val;
        }
        if let Ok(val) = env::var("PL_CONF_MEDIA_PUBLIC_BASE_URL") {
            if !val.trim().is_empty() {
                self.media.public_base_url = val;
            }
        }

        // CORS overrides (comma-separated origin list)
        if let Ok(val) = env::var("PL_CONF_CORS_ORIGINS") {
            self.cors.allowed_origins = val
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        // Ensure database directory exists
        if let Some(parent) = Path::new(&self.database.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Ensure media roots exist
        fs::create_dir_all(&self.media.public_root)?;
        fs::create_dir_all(&self.media.private_root)?;

        Ok(())
    }
}
