use serde::{Deserialize, Serialize};

use std::{env, fs, num::ParseIntError, path::Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub max_connections: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    #[error("failed to parse {name}: {source}")]
    InvalidVar {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
}

const fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_db_host() -> String {
    "localhost".to_string()
}

const fn default_db_port() -> u16 {
    5432
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|source| ConfigError::InvalidVar { name, source })
        })
        .transpose()
}

/// Builds a config from variables resolved through `lookup`.
pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

    let database = DatabaseConfig {
        host: lookup("DB_HOST").unwrap_or_else(default_db_host),
        port: parse_var(&lookup, "DB_PORT")?.unwrap_or_else(default_db_port),
        user: required("DB_USER")?,
        password: required("DB_PASSWORD")?,
        name: required("DB_NAME")?,
        max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS")?,
    };

    let cors_origins = lookup("CORS_ORIGINS").map_or_else(default_cors_origins, |raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect()
    });

    Ok(Config {
        database,
        port: parse_var(&lookup, "PORT")?.unwrap_or_else(default_port),
        cors_origins,
    })
}

fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

/// Resolves configuration relative to `dir`.
///
/// Order: the file named by `NOTES_VAULT_CONFIG`, `config.yaml`, the
/// environment when `DB_USER` is set, `config.example.yaml`, and finally the
/// environment again so missing variables are reported by name.
pub fn load_from(
    dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    if let Some(explicit) = lookup("NOTES_VAULT_CONFIG") {
        let path = dir.join(&explicit);
        if path.exists() {
            tracing::info!("Loading configuration from '{}'", path.display());
            return load_from_file(&path);
        }
        tracing::warn!("Config file '{}' named by NOTES_VAULT_CONFIG not found", path.display());
    }

    let local = dir.join("config.yaml");
    if local.exists() {
        tracing::info!("Loading configuration from '{}'", local.display());
        return load_from_file(&local);
    }

    if lookup("DB_USER").is_some() {
        tracing::info!("Loading configuration from environment variables");
        return from_vars(lookup);
    }

    let example = dir.join("config.example.yaml");
    if example.exists() {
        tracing::warn!(
            "Neither 'config.yaml' nor DB_USER found, using '{}'; \
             replace it with real credentials",
            example.display()
        );
        return load_from_file(&example);
    }

    from_vars(lookup)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_from(Path::new("."), |name| env::var(name).ok())
}
