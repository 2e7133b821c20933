//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. The file path itself
//! comes from `--config`, then `CONFIG_PATH`, then `ngoconnect.toml` in the
//! working directory. Only the default path may be absent.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "ngoconnect.toml";
pub const DEFAULT_BASE_URL: &str = "https://ngoconeect-backend.onrender.com";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Backend location and endpoint paths
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub refresh_path: String,
    pub login_path: String,
    /// Front-end route the user is sent to when the session ends.
    pub login_redirect: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            refresh_path: session::REFRESH_PATH.to_string(),
            login_path: session::LOGIN_PATH.to_string(),
            login_redirect: session::LOGIN_ROUTE.to_string(),
        }
    }
}

/// Where the session is kept. No path means in-memory only.
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| common::Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Like `load`, but a missing file at the default path yields defaults.
    pub fn load_or_default(path: &Path) -> common::Result<Self> {
        match Self::load(path) {
            Err(e) if e.is_not_found() && path == Path::new(DEFAULT_CONFIG_FILE) => {
                let mut config = Config::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    pub fn from_toml(contents: &str) -> common::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// `NGOCONNECT_API_URL` and `NGOCONNECT_SESSION_FILE` override the file.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("NGOCONNECT_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(path) = std::env::var("NGOCONNECT_SESSION_FILE") {
            self.session.path = Some(PathBuf::from(path));
        }
        if let Some(path) = self.session.path.take() {
            self.session.path = Some(expand_home(path));
        }
    }

    fn validate(&self) -> common::Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(common::Error::invalid(
                "base_url",
                format!("must start with http:// or https://, got: {}", self.api.base_url),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(common::Error::invalid(
                "timeout_secs",
                "must be greater than 0",
            ));
        }

        for (name, value) in [
            ("refresh_path", &self.api.refresh_path),
            ("login_path", &self.api.login_path),
            ("login_redirect", &self.api.login_redirect),
        ] {
            if !value.starts_with('/') {
                return Err(common::Error::invalid(
                    name,
                    format!("must start with '/', got: {value}"),
                ));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

/// Expand a leading `~/` using `HOME`.
fn expand_home(path: PathBuf) -> PathBuf {
    let Some(home) = std::env::var_os("HOME") else {
        return path;
    };
    if let Ok(rest) = path.strip_prefix("~") {
        return PathBuf::from(home).join(rest);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_overrides() {
        unsafe {
            remove_env("NGOCONNECT_API_URL");
            remove_env("NGOCONNECT_SESSION_FILE");
        }
    }

    fn valid_toml() -> &'static str {
        r#"
[api]
base_url = "http://localhost:8000"
timeout_secs = 10

[session]
path = "/tmp/ngoconnect/session.json"
"#
    }

    #[test]
    fn test_load_valid_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ngoconnect.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.api.refresh_path, "/token/refresh/");
        assert_eq!(config.api.login_path, "/token/");
        assert_eq!(
            config.session.path.as_deref(),
            Some(Path::new("/tmp/ngoconnect/session.json"))
        );
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();

        let config = Config::from_toml("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.login_redirect, "/login");
        assert!(config.session.path.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load_or_default(Path::new("/nonexistent/path/config.toml")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/nonexistent/path/config.toml"), "got: {err}");
    }

    #[test]
    fn test_missing_default_file_gives_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        // Relative default path resolves against the test's working directory,
        // which holds no ngoconnect.toml.
        let config = Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = Config::from_toml("not valid {{{{ toml");
        assert!(matches!(result, Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe {
            set_env("NGOCONNECT_API_URL", "https://staging.example.org");
            set_env("NGOCONNECT_SESSION_FILE", "/var/tmp/other-session.json");
        }

        let config = Config::from_toml(valid_toml()).unwrap();
        clear_overrides();

        assert_eq!(config.api.base_url, "https://staging.example.org");
        assert_eq!(
            config.session.path.as_deref(),
            Some(Path::new("/var/tmp/other-session.json"))
        );
    }

    #[test]
    fn test_session_path_expands_home() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();
        let home = std::env::var_os("HOME");
        unsafe { set_env("HOME", "/home/ada") };

        let config = Config::from_toml("[session]\npath = \"~/.ngoconnect/session.json\"\n").unwrap();

        match home {
            Some(h) => unsafe { std::env::set_var("HOME", h) },
            None => unsafe { remove_env("HOME") },
        }
        assert_eq!(
            config.session.path.as_deref(),
            Some(Path::new("/home/ada/.ngoconnect/session.json"))
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();

        let err = Config::from_toml("[api]\nbase_url = \"ftp://example.org\"\n").unwrap_err();
        assert!(err.to_string().contains("base_url"), "got: {err}");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();

        let err = Config::from_toml("[api]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"), "got: {err}");
    }

    #[test]
    fn test_relative_refresh_path_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_overrides();

        let err = Config::from_toml("[api]\nrefresh_path = \"token/refresh/\"\n").unwrap_err();
        assert!(err.to_string().contains("refresh_path"), "got: {err}");
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/cli/path.toml"));
        assert_eq!(path, PathBuf::from("/cli/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(path, PathBuf::from("/env/path.toml"));
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(Config::resolve_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        unsafe { remove_env("CONFIG_PATH") };
        assert_eq!(path, PathBuf::from("/cli/wins.toml"));
    }
}
