//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The password is loaded from the ARENA_PASSWORD env var or password_file,
//! never from the TOML body.

use common::Secret;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub library: LibraryConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// The patron account to scrape
#[derive(Debug, Deserialize)]
pub struct LibraryConfig {
    /// Display name used in logs and health output
    pub name: String,
    /// Portal base URL, e.g. https://folkbiblioteken.lund.se
    pub url: String,
    /// Library card number
    pub username: String,
    #[serde(skip)]
    pub password: Option<Secret<String>>,
    #[serde(default)]
    pub password_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    /// Credential re-entry endpoint; keep it off public interfaces.
    #[serde(default = "default_admin_addr")]
    pub admin_addr: SocketAddr,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            admin_addr: default_admin_addr(),
            refresh_interval_secs: default_refresh_interval(),
            timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl ServiceConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_admin_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9090))
}

fn default_refresh_interval() -> u64 {
    arena_sync::DEFAULT_REFRESH_INTERVAL.as_secs()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    64
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Password resolution order:
    /// 1. ARENA_PASSWORD env var
    /// 2. password_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.library.name.trim().is_empty() {
            return Err(common::Error::Config("library.name must not be empty".into()));
        }

        if !config.library.url.starts_with("http://") && !config.library.url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "library.url must start with http:// or https://, got: {}",
                config.library.url
            )));
        }

        if config.library.username.trim().is_empty() {
            return Err(common::Error::Config(
                "library.username must not be empty".into(),
            ));
        }

        if config.service.refresh_interval_secs == 0 {
            return Err(common::Error::Config(
                "refresh_interval_secs must be greater than 0".into(),
            ));
        }

        if config.service.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if config.service.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        // An empty ARENA_PASSWORD counts as unset.
        if let Some(password) = std::env::var("ARENA_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
        {
            config.library.password = Some(Secret::new(password));
        } else if let Some(ref password_file) = config.library.password_file {
            let password = std::fs::read_to_string(password_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read password_file {}: {e}",
                    password_file.display()
                ))
            })?;
            // Line ending only; inner and leading spaces are part of the password.
            let password = password.trim_end_matches(['\r', '\n']).to_owned();
            if !password.is_empty() {
                config.library.password = Some(Secret::new(password));
            }
        }

        if config.library.password.is_none() {
            return Err(common::Error::Config(
                "no password: set ARENA_PASSWORD or library.password_file".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("library-todo.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    const VALID_TOML: &str = r#"
[library]
name = "John Doe"
url = "https://folkbiblioteken.lund.se"
username = "1234567890"
"#;

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("library-todo.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, VALID_TOML);

        unsafe { set_env("ARENA_PASSWORD", "0000") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env("ARENA_PASSWORD") };

        assert_eq!(config.library.name, "John Doe");
        assert_eq!(config.library.url, "https://folkbiblioteken.lund.se");
        assert_eq!(config.library.username, "1234567890");
        assert_eq!(config.library.password.as_ref().unwrap().expose(), "0000");
        assert_eq!(config.service.listen_addr, default_listen_addr());
        assert_eq!(config.service.admin_addr, default_admin_addr());
        assert_eq!(config.service.refresh_interval(), Duration::from_secs(7200));
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.service.max_connections, 64);
    }

    #[test]
    fn test_service_section_overrides() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{VALID_TOML}\n[service]\nlisten_addr = \"0.0.0.0:8181\"\nrefresh_interval_secs = 600\ntimeout_secs = 10\n"
        );
        let path = write_config(&dir, &contents);

        unsafe { set_env("ARENA_PASSWORD", "0000") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env("ARENA_PASSWORD") };

        assert_eq!(config.service.listen_addr.to_string(), "0.0.0.0:8181");
        assert_eq!(config.service.refresh_interval_secs, 600);
        assert_eq!(config.service.timeout_secs, 10);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/path/library-todo.toml"));
        assert!(matches!(result, Err(common::Error::Io(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_password_from_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let password_path = dir.path().join("password");
        std::fs::write(&password_path, "pin 1234\n").unwrap();
        let contents = format!(
            "{VALID_TOML}password_file = \"{}\"\n",
            password_path.display()
        );
        let path = write_config(&dir, &contents);

        unsafe { remove_env("ARENA_PASSWORD") };
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.library.password.as_ref().unwrap().expose(),
            "pin 1234"
        );
    }

    #[test]
    fn test_password_env_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let contents =
            format!("{VALID_TOML}password_file = \"/nonexistent/path/password\"\n");
        let path = write_config(&dir, &contents);

        unsafe { set_env("ARENA_PASSWORD", "env-wins") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env("ARENA_PASSWORD") };

        assert_eq!(
            config.library.password.as_ref().unwrap().expose(),
            "env-wins",
            "ARENA_PASSWORD must take precedence over password_file"
        );
    }

    #[test]
    fn test_password_file_nonexistent_returns_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let contents =
            format!("{VALID_TOML}password_file = \"/nonexistent/path/password\"\n");
        let path = write_config(&dir, &contents);

        unsafe { remove_env("ARENA_PASSWORD") };
        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("failed to read password_file"), "got: {err}");
    }

    #[test]
    fn test_missing_password_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, VALID_TOML);

        unsafe { remove_env("ARENA_PASSWORD") };
        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("ARENA_PASSWORD"), "got: {err}");
    }

    #[test]
    fn test_empty_password_file_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let password_path = dir.path().join("password");
        std::fs::write(&password_path, "\n").unwrap();
        let contents = format!(
            "{VALID_TOML}password_file = \"{}\"\n",
            password_path.display()
        );
        let path = write_config(&dir, &contents);

        unsafe { remove_env("ARENA_PASSWORD") };
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_empty_env_password_falls_through_to_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let password_path = dir.path().join("password");
        std::fs::write(&password_path, "realpin\n").unwrap();
        let contents = format!(
            "{VALID_TOML}password_file = \"{}\"\n",
            password_path.display()
        );
        let path = write_config(&dir, &contents);

        unsafe { set_env("ARENA_PASSWORD", "") };
        let result = Config::load(&path);
        unsafe { remove_env("ARENA_PASSWORD") };

        let config = result.unwrap();
        assert_eq!(
            config.library.password.as_ref().unwrap().expose(),
            "realpin",
            "empty ARENA_PASSWORD must not override password_file"
        );
    }

    #[test]
    fn test_empty_env_password_without_file_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, VALID_TOML);

        unsafe { set_env("ARENA_PASSWORD", "") };
        let result = Config::load(&path);
        unsafe { remove_env("ARENA_PASSWORD") };

        let err = result.unwrap_err().to_string();
        assert!(err.contains("no password"), "got: {err}");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[library]\nname = \"x\"\nurl = \"folkbiblioteken.lund.se\"\nusername = \"1\"\n",
        );

        unsafe { set_env("ARENA_PASSWORD", "0000") };
        let result = Config::load(&path);
        unsafe { remove_env("ARENA_PASSWORD") };

        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("library.url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_empty_username_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[library]\nname = \"x\"\nurl = \"https://lib.example\"\nusername = \" \"\n",
        );

        unsafe { set_env("ARENA_PASSWORD", "0000") };
        let result = Config::load(&path);
        unsafe { remove_env("ARENA_PASSWORD") };
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        unsafe { set_env("ARENA_PASSWORD", "0000") };

        for field in ["refresh_interval_secs", "timeout_secs", "max_connections"] {
            let path = write_config(&dir, &format!("{VALID_TOML}\n[service]\n{field} = 0\n"));
            let err = Config::load(&path).unwrap_err().to_string();
            assert!(err.contains(field), "{field} = 0 must be rejected, got: {err}");
        }

        unsafe { remove_env("ARENA_PASSWORD") };
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("library-todo.toml"));
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(path, PathBuf::from("/cli/wins.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }
}
