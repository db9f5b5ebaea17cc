//! Configuration file management for mealprep.
//!
//! Provides a TOML-based config file at `~/.config/mealprep/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use mealprep_core::gateway::AnthropicConfig;
use mealprep_core::orchestrator::OrchestratorSettings;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GatewaySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Shared password for the HTTP access gate. Unset disables the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_password: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mealprep config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mealprep` or
/// `~/.config/mealprep`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealprep");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealprep")
}

/// Return the path to the mealprep config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load the config file if it exists.
///
/// A missing file is `Ok(None)`; a file that exists but cannot be read or
/// parsed is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold the API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Resolved model gateway settings.
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    /// Resolve gateway settings: env var > config file > default.
    ///
    /// - API key: `ANTHROPIC_API_KEY` > `gateway.api_key` > error
    /// - Model: `MEALPREP_MODEL` > `gateway.model` > `claude-sonnet-4-20250514`
    /// - Base URL: `MEALPREP_GATEWAY_URL` > `gateway.base_url` > Anthropic API
    /// - Timeout: `MEALPREP_TIMEOUT_SECS` > `gateway.timeout_secs` > 60
    pub fn resolve(file: Option<&ConfigFile>) -> Result<Self> {
        let section = file.map(|f| &f.gateway);

        let Some(api_key) = env_var("ANTHROPIC_API_KEY")
            .or_else(|| section.and_then(|s| s.api_key.clone()))
            .filter(|k| !k.trim().is_empty())
        else {
            bail!(
                "API key not found; set ANTHROPIC_API_KEY or run `mealprep init --api-key <KEY>`"
            );
        };

        let model = env_var("MEALPREP_MODEL")
            .or_else(|| section.and_then(|s| s.model.clone()))
            .unwrap_or_else(|| OrchestratorSettings::DEFAULT_MODEL.to_string());

        let base_url = env_var("MEALPREP_GATEWAY_URL")
            .or_else(|| section.and_then(|s| s.base_url.clone()))
            .unwrap_or_else(|| AnthropicConfig::DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env_var("MEALPREP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("MEALPREP_TIMEOUT_SECS is not a number: {raw}"))?,
            None => section
                .and_then(|s| s.timeout_secs)
                .unwrap_or(OrchestratorSettings::DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            bail!("gateway timeout must be at least one second");
        }

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig::new(self.api_key.clone()).with_base_url(self.base_url.clone())
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            model: self.model.clone(),
            call_timeout: self.timeout,
            ..OrchestratorSettings::default()
        }
    }
}

/// Resolved HTTP server settings.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub access_password: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("access_password", &self.access_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServerConfig {
    /// Resolve server settings: CLI flag > env var > config file > default.
    ///
    /// - Bind: `--bind` > `MEALPREP_BIND` > `server.bind` > `127.0.0.1`
    /// - Port: `--port` > `MEALPREP_PORT` > `server.port` > 3000
    /// - Access password: `APP_PASSWORD` > `server.access_password` > none
    pub fn resolve(
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
        file: Option<&ConfigFile>,
    ) -> Result<Self> {
        let section = file.map(|f| &f.server);

        let bind = cli_bind
            .map(str::to_string)
            .or_else(|| env_var("MEALPREP_BIND"))
            .or_else(|| section.and_then(|s| s.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match (cli_port, env_var("MEALPREP_PORT")) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .parse::<u16>()
                .with_context(|| format!("MEALPREP_PORT is not a valid port: {raw}"))?,
            (None, None) => section.and_then(|s| s.port).unwrap_or(DEFAULT_PORT),
        };

        let access_password = env_var("APP_PASSWORD")
            .or_else(|| section.and_then(|s| s.access_password.clone()))
            .filter(|p| !p.is_empty());

        Ok(Self {
            bind,
            port,
            access_password,
        })
    }
}

/// Read an env var, treating unset and empty the same.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 7] = [
        "ANTHROPIC_API_KEY",
        "MEALPREP_MODEL",
        "MEALPREP_GATEWAY_URL",
        "MEALPREP_TIMEOUT_SECS",
        "APP_PASSWORD",
        "MEALPREP_BIND",
        "MEALPREP_PORT",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = crate::test_util::lock_env();
        for name in ENV_VARS {
            unsafe { std::env::remove_var(name) };
        }
        guard
    }

    fn file_with_key(key: &str) -> ConfigFile {
        ConfigFile {
            gateway: GatewaySection {
                api_key: Some(key.to_string()),
                model: Some("file-model".to_string()),
                base_url: Some("http://file:9000".to_string()),
                timeout_secs: Some(15),
            },
            server: ServerSection {
                bind: Some("0.0.0.0".to_string()),
                port: Some(8080),
                access_password: Some("file-pass".to_string()),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("mealprep").join("config.toml");

        save_config_to(&path, &file_with_key("sk-file")).unwrap();
        let loaded = load_config_from(&path).unwrap().expect("file should exist");

        assert_eq!(loaded.gateway.api_key.as_deref(), Some("sk-file"));
        assert_eq!(loaded.gateway.timeout_secs, Some(15));
        assert_eq!(loaded.server.port, Some(8080));
        assert_eq!(loaded.server.access_password.as_deref(), Some("file-pass"));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&path, &ConfigFile::default()).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_config_from(&tmp.path().join("nope.toml")).unwrap().is_none());
    }

    #[test]
    fn partial_file_parses_with_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let loaded = load_config_from(&path).unwrap().unwrap();
        assert_eq!(loaded.server.port, Some(4000));
        assert!(loaded.gateway.api_key.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn gateway_resolves_from_file() {
        let _lock = lock_env();

        let config = GatewayConfig::resolve(Some(&file_with_key("sk-file"))).unwrap();
        assert_eq!(config.api_key, "sk-file");
        assert_eq!(config.model, "file-model");
        assert_eq!(config.base_url, "http://file:9000");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn gateway_env_overrides_file() {
        let _lock = lock_env();
        unsafe { std::env::set_var("ANTHROPIC_API_KEY", "sk-env") };
        unsafe { std::env::set_var("MEALPREP_MODEL", "env-model") };
        unsafe { std::env::set_var("MEALPREP_TIMEOUT_SECS", "90") };

        let config = GatewayConfig::resolve(Some(&file_with_key("sk-file"))).unwrap();

        unsafe { std::env::remove_var("ANTHROPIC_API_KEY") };
        unsafe { std::env::remove_var("MEALPREP_MODEL") };
        unsafe { std::env::remove_var("MEALPREP_TIMEOUT_SECS") };

        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.model, "env-model");
        assert_eq!(config.base_url, "http://file:9000");
        assert_eq!(config.timeout, Duration::from_secs(90));
    }

    #[test]
    fn gateway_defaults_when_only_key_is_set() {
        let _lock = lock_env();
        unsafe { std::env::set_var("ANTHROPIC_API_KEY", "sk-env") };

        let config = GatewayConfig::resolve(None).unwrap();
        unsafe { std::env::remove_var("ANTHROPIC_API_KEY") };

        assert_eq!(config.model, OrchestratorSettings::DEFAULT_MODEL);
        assert_eq!(config.base_url, AnthropicConfig::DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));

        let settings = config.orchestrator_settings();
        assert_eq!(settings.plan_max_tokens, 4096);
        assert_eq!(settings.call_timeout, Duration::from_secs(60));
    }

    #[test]
    fn gateway_errors_without_api_key() {
        let _lock = lock_env();

        let err = GatewayConfig::resolve(Some(&ConfigFile::default())).unwrap_err();
        assert!(
            err.to_string().contains("API key not found"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn gateway_rejects_bad_timeout() {
        let _lock = lock_env();
        unsafe { std::env::set_var("MEALPREP_TIMEOUT_SECS", "soon") };

        let result = GatewayConfig::resolve(Some(&file_with_key("sk-file")));
        unsafe { std::env::remove_var("MEALPREP_TIMEOUT_SECS") };

        assert!(result.is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let _lock = lock_env();

        let gateway = GatewayConfig::resolve(Some(&file_with_key("sk-secret"))).unwrap();
        assert!(!format!("{gateway:?}").contains("sk-secret"));

        let server = ServerConfig::resolve(None, None, Some(&file_with_key("k"))).unwrap();
        assert!(!format!("{server:?}").contains("file-pass"));
    }

    #[test]
    fn server_cli_flag_overrides_all() {
        let _lock = lock_env();
        unsafe { std::env::set_var("MEALPREP_BIND", "10.0.0.1") };
        unsafe { std::env::set_var("MEALPREP_PORT", "5000") };

        let config =
            ServerConfig::resolve(Some("192.168.1.2"), Some(7000), Some(&file_with_key("k")))
                .unwrap();

        unsafe { std::env::remove_var("MEALPREP_BIND") };
        unsafe { std::env::remove_var("MEALPREP_PORT") };

        assert_eq!(config.bind, "192.168.1.2");
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn server_env_overrides_file() {
        let _lock = lock_env();
        unsafe { std::env::set_var("MEALPREP_PORT", "5000") };
        unsafe { std::env::set_var("APP_PASSWORD", "env-pass") };

        let config = ServerConfig::resolve(None, None, Some(&file_with_key("k"))).unwrap();

        unsafe { std::env::remove_var("MEALPREP_PORT") };
        unsafe { std::env::remove_var("APP_PASSWORD") };

        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.access_password.as_deref(), Some("env-pass"));
    }

    #[test]
    fn server_defaults_and_open_gate() {
        let _lock = lock_env();

        let config = ServerConfig::resolve(None, None, None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.access_password.is_none());
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("mealprep/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
