//! Configuration file management for planoreal.
//!
//! Provides a TOML-based config file at `~/.config/planoreal/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use planoreal_core::gateway::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_REFERER, DEFAULT_TIMEOUT, GatewayConfig,
};

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "OPENROUTER_MODEL";
pub const ENV_BASE_URL: &str = "OPENROUTER_BASE_URL";
pub const ENV_PORT: &str = "PORT";
pub const ENV_REFERER: &str = "PLANOREAL_REFERER";
pub const ENV_TIMEOUT_SECS: &str = "PLANOREAL_TIMEOUT_SECS";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub upstream: UpstreamSection,
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpstreamSection {
    /// Bearer token for the chat-completion endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the planoreal config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/planoreal` or `~/.config/planoreal`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("planoreal");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("planoreal")
}

/// Return the path to the planoreal config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds the API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Load `.env` from the working directory if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded dotenv file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load dotenv file"),
    }
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
}

/// Fully resolved configuration, ready for use. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub bind: String,
    pub port: u16,
}

impl AppConfig {
    /// Resolve configuration from the process environment and config file.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_from(cli, |key| std::env::var(key).ok(), file_config.as_ref())
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `OPENROUTER_API_KEY` env > `upstream.api_key` > error
    /// - Model: `--model` > `OPENROUTER_MODEL` env > `upstream.model` > default
    /// - Port: `--port` > `PORT` env > `server.port` > 3001
    pub fn resolve_from(
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
        file: Option<&ConfigFile>,
    ) -> Result<Self> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let upstream = file.map(|f| &f.upstream);
        let server = file.map(|f| &f.server);

        let api_key = match env(ENV_API_KEY).or_else(|| upstream.and_then(|u| u.api_key.clone())) {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!(
                "{ENV_API_KEY} is not configured; set it in the environment or a .env file, \
                 or run `planoreal init --api-key <KEY>`"
            ),
        };

        let model = cli
            .model
            .clone()
            .or_else(|| env(ENV_MODEL))
            .or_else(|| upstream.and_then(|u| u.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = env(ENV_BASE_URL)
            .or_else(|| upstream.and_then(|u| u.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let referer = env(ENV_REFERER)
            .or_else(|| upstream.and_then(|u| u.referer.clone()))
            .unwrap_or_else(|| DEFAULT_REFERER.to_string());

        let timeout = match env(ENV_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("{ENV_TIMEOUT_SECS} is not a number: {raw}"))?,
            ),
            None => upstream
                .and_then(|u| u.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        let port = match cli.port {
            Some(p) => p,
            None => match env(ENV_PORT) {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("{ENV_PORT} is not a valid port: {raw}"))?,
                None => server.and_then(|s| s.port).unwrap_or(DEFAULT_PORT),
            },
        };

        let bind = cli
            .bind
            .clone()
            .or_else(|| server.and_then(|s| s.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        Ok(Self {
            gateway: GatewayConfig {
                base_url,
                model,
                referer,
                timeout,
                ..GatewayConfig::new(api_key)
            },
            bind,
            port,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file_with_key(key: &str) -> ConfigFile {
        ConfigFile {
            upstream: UpstreamSection {
                api_key: Some(key.to_string()),
                model: Some("file/model".to_string()),
                ..Default::default()
            },
            server: ServerSection {
                bind: Some("0.0.0.0".to_string()),
                port: Some(8080),
            },
        }
    }

    #[test]
    fn resolve_errors_without_api_key() {
        let err = AppConfig::resolve_from(&CliOverrides::default(), env_of(&[]), None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("OPENROUTER_API_KEY is not configured"), "unexpected: {err}");
    }

    #[test]
    fn resolve_treats_blank_key_as_missing() {
        let result =
            AppConfig::resolve_from(&CliOverrides::default(), env_of(&[(ENV_API_KEY, "  ")]), None);
        assert!(result.is_err());
    }

    #[test]
    fn resolve_defaults_with_only_key() {
        let cfg = AppConfig::resolve_from(
            &CliOverrides::default(),
            env_of(&[(ENV_API_KEY, "sk-env")]),
            None,
        )
        .unwrap();
        assert_eq!(cfg.gateway.api_key, "sk-env");
        assert_eq!(cfg.gateway.model, DEFAULT_MODEL);
        assert_eq!(cfg.gateway.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.gateway.timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn resolve_reads_config_file() {
        let file = file_with_key("sk-file");
        let cfg = AppConfig::resolve_from(&CliOverrides::default(), env_of(&[]), Some(&file))
            .unwrap();
        assert_eq!(cfg.gateway.api_key, "sk-file");
        assert_eq!(cfg.gateway.model, "file/model");
        assert_eq!(cfg.bind, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn resolve_env_overrides_config_file() {
        let file = file_with_key("sk-file");
        let env = env_of(&[
            (ENV_API_KEY, "sk-env"),
            (ENV_MODEL, "env/model"),
            (ENV_PORT, "4000"),
            (ENV_TIMEOUT_SECS, "30"),
        ]);
        let cfg = AppConfig::resolve_from(&CliOverrides::default(), env, Some(&file)).unwrap();
        assert_eq!(cfg.gateway.api_key, "sk-env");
        assert_eq!(cfg.gateway.model, "env/model");
        assert_eq!(cfg.gateway.timeout, Duration::from_secs(30));
        assert_eq!(cfg.port, 4000);
    }

    #[test]
    fn resolve_cli_overrides_all() {
        let file = file_with_key("sk-file");
        let cli = CliOverrides {
            bind: Some("::1".to_string()),
            port: Some(5555),
            model: Some("cli/model".to_string()),
        };
        let env = env_of(&[(ENV_MODEL, "env/model"), (ENV_PORT, "4000")]);
        let cfg = AppConfig::resolve_from(&cli, env, Some(&file)).unwrap();
        assert_eq!(cfg.gateway.model, "cli/model");
        assert_eq!(cfg.port, 5555);
        assert_eq!(cfg.bind, "::1");
    }

    #[test]
    fn resolve_rejects_bad_port() {
        let env = env_of(&[(ENV_API_KEY, "k"), (ENV_PORT, "eighty")]);
        let err = AppConfig::resolve_from(&CliOverrides::default(), env, None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("not a valid port"), "unexpected: {err}");
    }

    #[test]
    fn config_file_toml_roundtrip() {
        let original = file_with_key("sk-file");
        let text = toml::to_string_pretty(&original).unwrap();
        assert!(text.contains("[upstream]"));
        assert!(!text.contains("base_url"), "unset fields are omitted: {text}");
        let loaded: ConfigFile = toml::from_str(&text).unwrap();
        assert_eq!(loaded.upstream.api_key.as_deref(), Some("sk-file"));
        assert_eq!(loaded.server.port, Some(8080));
    }

    #[test]
    fn config_file_sections_are_optional() {
        let loaded: ConfigFile = toml::from_str("[upstream]\napi_key = \"k\"\n").unwrap();
        assert_eq!(loaded.upstream.api_key.as_deref(), Some("k"));
        assert!(loaded.server.port.is_none());
    }

    #[test]
    fn save_and_load_via_xdg_config_home() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        let saved = save_config(&file_with_key("sk-saved"));
        let loaded = load_config();
        let path = config_path();

        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        saved.unwrap();
        assert_eq!(loaded.unwrap().upstream.api_key.as_deref(), Some("sk-saved"));
        assert!(path.starts_with(tmp.path()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let meta = std::fs::metadata(&path).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        }
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let path = config_path();
        assert!(
            path.ends_with("planoreal/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
