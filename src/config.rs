use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ACCEPT: &str = "application/vnd.github.v3+json";
pub const DEFAULT_PER_PAGE: u8 = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub accept: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Name of an environment variable holding an optional token.
    /// Unset means unauthenticated requests.
    pub token_env: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            user_agent: concat!("ghtrack/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            token_env: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token(&self) -> Option<String> {
        let var = self.token_env.as_deref()?;
        std::env::var(var).ok().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IssuesConfig {
    pub per_page: u8,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub issues: IssuesConfig,
    pub storage: StorageConfig,
}

/// ~/.config/ghtrack/config.toml (Linux) or ~/Library/Application Support/ghtrack/config.toml (macOS)
pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("ghtrack").join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location. Missing or invalid files yield defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Config::default();
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        if config.issues.per_page == 0 {
            config.issues.per_page = DEFAULT_PER_PAGE;
        }
        Ok(config)
    }

    /// Command-line flags win over the config file
    pub fn apply_cli(&mut self, api_url: Option<String>, data_dir: Option<PathBuf>) {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        if let Some(dir) = data_dir {
            self.storage.data_dir = Some(dir);
        }
    }

    /// Directory backing the key-value store
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| Some(dirs::data_dir()?.join("ghtrack")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[api]
base_url = "https://github.company.com/api/v3"
timeout_secs = 5
token_env = "GHTRACK_TOKEN"

[issues]
per_page = 10

[storage]
data_dir = "/tmp/ghtrack"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://github.company.com/api/v3");
        assert_eq!(config.api.accept, DEFAULT_ACCEPT);
        assert_eq!(config.api.timeout(), Duration::from_secs(5));
        assert_eq!(config.api.token_env.as_deref(), Some("GHTRACK_TOKEN"));
        assert_eq!(config.issues.per_page, 10);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/ghtrack")));
    }

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.issues.per_page, DEFAULT_PER_PAGE);
        assert!(config.api.token_env.is_none());
    }

    #[test]
    fn zero_per_page_falls_back_to_default() {
        let config = Config::parse("[issues]\nper_page = 0\n").unwrap();
        assert_eq!(config.issues.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/ghtrack/config.toml")));
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn load_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = 42\n").unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.issues.per_page, DEFAULT_PER_PAGE);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn load_reads_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[issues]\nper_page = 20\n").unwrap();

        assert_eq!(Config::load(Some(&path)).issues.per_page, 20);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut config = Config::parse(
            r#"
[api]
base_url = "https://ghe.example.com/api/v3"

[storage]
data_dir = "/from/file"
"#,
        )
        .unwrap();

        config.apply_cli(
            Some("http://localhost:9000".to_string()),
            Some(PathBuf::from("/from/cli")),
        );
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.data_dir(), Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn absent_cli_flags_keep_file_values() {
        let mut config = Config::parse("[storage]\ndata_dir = \"/from/file\"\n").unwrap();
        config.apply_cli(None, None);
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.data_dir(), Some(PathBuf::from("/from/file")));
    }

    #[test]
    fn token_requires_configured_env_var() {
        let config = ApiConfig::default();
        assert!(config.token().is_none());
    }
}
