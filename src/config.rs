use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::store::rest::{RestConfig, DEFAULT_TABLE};

pub const DEFAULT_CONFIG_PATH: &str = "studylog.toml";
pub const DEFAULT_DB_PATH: &str = ".studylog/records.sqlite";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigFile {
    backend: Option<String>,
    sqlite: Option<RawSqliteSection>,
    rest: Option<RawRestSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSqliteSection {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRestSection {
    url: Option<String>,
    api_key: Option<String>,
    table: Option<String>,
    timeout_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment. They win
/// over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub rest_url: Option<String>,
    pub rest_key: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Rest,
}

impl BackendKind {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "local" => Ok(BackendKind::Sqlite),
            "rest" | "postgrest" | "supabase" => Ok(BackendKind::Rest),
            _ => Err(ConfigError::UnknownBackend(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Sqlite { path: String },
    Rest(RestConfig),
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Toml(toml::de::Error),
    UnknownBackend(String),
    MissingSetting(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "unable to read config '{}': {}", path.display(), source)
            }
            ConfigError::Toml(err) => write!(f, "invalid config TOML: {}", err),
            ConfigError::UnknownBackend(raw) => {
                write!(f, "unknown backend '{}'; use sqlite|rest", raw)
            }
            ConfigError::MissingSetting(name) => {
                write!(f, "missing required setting: {}", name)
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Toml(err) => Some(err),
            ConfigError::UnknownBackend(_) => None,
            ConfigError::MissingSetting(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Toml(value)
    }
}

/// Reads the config file (an explicitly named file must exist; the default
/// one may be absent) and resolves it against `overrides`.
pub fn load(
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<BackendConfig, ConfigError> {
    let raw = match explicit_path {
        Some(path) => read_file(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                read_file(path)?
            } else {
                String::new()
            }
        }
    };
    resolve(&raw, overrides)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn resolve(raw: &str, overrides: &ConfigOverrides) -> Result<BackendConfig, ConfigError> {
    let file: RawConfigFile = toml::from_str(raw)?;
    let sqlite = file.sqlite.unwrap_or_default();
    let rest = file.rest.unwrap_or_default();

    let rest_url = pick(overrides.rest_url.as_deref(), rest.url);
    let kind = match pick(overrides.backend.as_deref(), file.backend) {
        Some(raw_kind) => BackendKind::parse(&raw_kind)?,
        None if rest_url.is_some() => BackendKind::Rest,
        None => BackendKind::Sqlite,
    };

    match kind {
        BackendKind::Sqlite => Ok(BackendConfig::Sqlite {
            path: pick(overrides.db.as_deref(), sqlite.path)
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        }),
        BackendKind::Rest => Ok(BackendConfig::Rest(RestConfig {
            base_url: rest_url.ok_or(ConfigError::MissingSetting("rest url"))?,
            api_key: pick(overrides.rest_key.as_deref(), rest.api_key)
                .ok_or(ConfigError::MissingSetting("rest api key"))?,
            table: pick(overrides.table.as_deref(), rest.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            timeout: rest.timeout_secs.map(Duration::from_secs),
        })),
    }
}

fn pick(preferred: Option<&str>, fallback: Option<String>) -> Option<String> {
    non_empty(preferred).or_else(|| non_empty(fallback.as_deref()))
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
