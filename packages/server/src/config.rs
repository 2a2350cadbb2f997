use std::env;
use std::path::{Path, PathBuf};

use common::NotificationConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Environment variable naming the flat YAML file with database credentials.
pub const DB_CONFIG_FILE_ENV: &str = "ASSIGNMENT_DB_CONFIG";
const DEFAULT_DB_CONFIG_FILE: &str = "/opt/dbconfig.yaml";

/// Plain environment variables understood for database credentials.
const LEGACY_DB_ENV: &[(&str, &str)] = &[
    ("database.user", "DB_USER"),
    ("database.password", "DB_PASSWORD"),
    ("database.name", "DB_NAME"),
    ("database.host", "DB_HOST"),
    ("database.port", "DB_PORT"),
];

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    /// Full connection URL. Takes precedence over the individual fields.
    #[serde(default)]
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match self.url {
            Some(ref url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    /// CSV file with accounts to create at start-up. `None` disables the import.
    #[serde(default)]
    pub users_csv: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Append logs to this file instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    pub bootstrap: BootstrapConfig,
    pub log: LogConfig,
}

/// Flat credentials file: `user`, `password`, `host`, `port`, `db`, `snsarn`.
#[derive(Debug, Default, Deserialize)]
struct DbConfigFile {
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<String>,
    db: Option<String>,
    snsarn: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let db_file = env::var(DB_CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_CONFIG_FILE));

        Self::load_from(&db_file, |key| env::var(key).ok())
    }

    /// Load configuration, lowest precedence first: built-in defaults, `DB_*`
    /// variables (via `lookup`), the flat credentials file, `config/config.*`,
    /// then `ASSIGNMENT__SECTION__KEY` variables.
    pub fn load_from(
        db_file: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "assignments")?
            .set_default("database.max_connections", 20)?
            .set_default("bootstrap.users_csv", "users.csv")?
            .set_default("log.filter", "info")?
            .set_default("log.json", false)?;

        for &(key, var) in LEGACY_DB_ENV {
            if let Some(value) = lookup(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        builder = apply_db_config_file(builder, read_db_config_file(db_file))?;

        builder
            .add_source(File::with_name("config/config").required(false))
            .add_source(Environment::with_prefix("ASSIGNMENT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn read_db_config_file(path: &Path) -> DbConfigFile {
    let parsed = Config::builder()
        .add_source(File::new(&path.to_string_lossy(), FileFormat::Yaml).required(false))
        .build()
        .and_then(|c| c.try_deserialize::<DbConfigFile>());

    match parsed {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Unable to parse database config file");
            DbConfigFile::default()
        }
    }
}

fn apply_db_config_file(
    mut builder: ConfigBuilder<DefaultState>,
    file: DbConfigFile,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let fields = [
        ("database.user", file.user),
        ("database.password", file.password),
        ("database.host", file.host),
        ("database.port", file.port),
        ("database.name", file.db),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            builder = builder.set_default(key, value)?;
        }
    }

    if let Some(topic) = file.snsarn.filter(|t| !t.trim().is_empty()) {
        builder = builder
            .set_default("notification.topic", topic)?
            .set_default("notification.enabled", true)?;
    }

    Ok(builder)
}
