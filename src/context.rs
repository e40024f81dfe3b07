use std::env;
use std::net::{IpAddr, SocketAddr};

use anyhow::Context as _;
use once_cell::sync::OnceCell;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MANIFEST_PATH: &str = "gallery-manifest.json";
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024 * 16;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Process-wide settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Content store credential. Requests fail with a configuration error
    /// when it is absent.
    pub token: Option<String>,
    /// Repository as `owner/name`.
    pub repo: String,
    pub branch: String,
    pub manifest_path: String,
    pub api_url: String,
    pub addr: SocketAddr,
    pub max_body_size: usize,
    pub debug: bool,
    pub expose_error_details: bool,
    pub log_file: Option<String>,
}

fn env_bool<T: AsRef<str>>(s: T) -> bool {
    let s = s.as_ref().trim();
    !(s.is_empty() || s == "0" || s.to_ascii_lowercase() == "false")
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        let repo = non_empty("GITHUB_REPO").context("GITHUB_REPO must be set to `owner/name`")?;
        if repo.split('/').filter(|part| !part.is_empty()).count() != 2 {
            anyhow::bail!("GITHUB_REPO must look like `owner/name`, got `{}`", repo);
        }
        let host: IpAddr = non_empty("HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .context("HOST is not a valid IP address")?;
        let port: u16 = non_empty("PORT")
            .unwrap_or_else(|| "8888".to_string())
            .parse()
            .context("PORT is not a valid port number")?;
        let max_body_size = match non_empty("MAX_BODY_SIZE") {
            Some(size) => size.parse().context("MAX_BODY_SIZE is not a number")?,
            None => DEFAULT_MAX_BODY_SIZE,
        };
        Ok(Config {
            token: non_empty("GITHUB_TOKEN"),
            repo,
            branch: non_empty("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            manifest_path: non_empty("MANIFEST_PATH").unwrap_or_else(|| DEFAULT_MANIFEST_PATH.to_string()),
            api_url: non_empty("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            addr: SocketAddr::new(host, port),
            max_body_size,
            debug: env::var("DEBUG").map(env_bool).unwrap_or(false),
            expose_error_details: env::var("EXPOSE_ERROR_DETAILS").map(env_bool).unwrap_or(true),
            log_file: non_empty("LOG_FILE"),
        })
    }

    /// A configuration pointing at `api_url`, for tests and tools.
    pub fn for_api(api_url: &str, token: Option<&str>) -> Config {
        Config {
            token: token.map(ToString::to_string),
            repo: "owner/gallery".to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
            api_url: api_url.to_string(),
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            debug: false,
            expose_error_details: true,
            log_file: None,
        }
    }
}

/// Load `.env` if present and resolve the configuration. Later calls return
/// the same value.
pub fn init() -> anyhow::Result<&'static Config> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}

#[test]
fn test_env_bool() {
    assert!(!env_bool(""));
    assert!(!env_bool(" 0 "));
    assert!(!env_bool("False"));
    assert!(env_bool("1"));
    assert!(env_bool("yes"));
}
