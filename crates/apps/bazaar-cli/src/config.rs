//! CLI configuration.

use std::path::{Path, PathBuf};

use bazaar_catalog::{CatalogSource, ResourceScope, DEFAULT_SCOPE};
use bazaar_mcp::McpServerConfig;
use regex::Regex;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Expand environment variables in a string.
/// Supports `${VAR_NAME}` syntax; unset variables are left as written.
fn expand_env_vars(input: &str) -> CliResult<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| CliError::config(format!("invalid expansion pattern: {e}")))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned())
}

/// CLI configuration loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Discovery catalog configuration.
    pub catalog: CatalogConfig,
    /// MCP server identity.
    pub server: ServerConfig,
}

impl CliConfig {
    /// Load configuration from a file.
    /// A missing file yields the defaults. `${VAR}` references in the
    /// fixture path are expanded.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        if let Some(fixture) = &config.catalog.fixture {
            let expanded = expand_env_vars(&fixture.to_string_lossy())?;
            config.catalog.fixture = Some(PathBuf::from(expanded));
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, fixture: Option<PathBuf>, scope: Option<String>) -> Self {
        if fixture.is_some() {
            self.catalog.fixture = fixture;
        }
        if let Some(scope) = scope {
            self.catalog.scope = scope;
        }
        self
    }

    /// Build the MCP server configuration.
    pub fn server_config(&self) -> McpServerConfig {
        McpServerConfig {
            catalog: CatalogSource::from_path(self.catalog.fixture.as_deref()),
            scope: ResourceScope::fragment(self.catalog.scope.clone()),
            name: self.server.name.clone(),
            version: self.server.version.clone(),
        }
    }
}

/// Discovery catalog configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Discovery listing on disk. The bundled listing is used when unset.
    pub fixture: Option<PathBuf>,
    /// URL fragment listed resources must contain. Empty disables scoping.
    pub scope: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fixture: None,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

/// MCP server identity reported to clients.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name. `bazaar-mcp` when unset.
    pub name: Option<String>,
    /// Server version. The `bazaar-mcp` package version when unset.
    pub version: Option<String>,
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(dir) = std::env::var("BAZAAR_CONFIG_DIR") {
        return PathBuf::from(dir).join("config.toml");
    }

    directories::ProjectDirs::from("io", "bazaar", "bazaar")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".bazaar")
        })
        .join("config.toml")
}
