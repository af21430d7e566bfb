use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_RPC: &str = "http://127.0.0.1:8545";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Node URL offered on the login screen when none was saved
    pub default_rpc: Option<String>,

    pub data_dir: Option<String>,

    pub keystore_dir: Option<String>,

    pub metadata_timeout_secs: Option<u64>,
}

impl Config {
    pub fn default_rpc(&self) -> String {
        self.default_rpc
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize_http_endpoint)
            .unwrap_or_else(|| DEFAULT_RPC.to_string())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs.unwrap_or(10).max(1))
    }

    /// Explicit `data_dir` from the file, otherwise the platform data dir
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .as_deref()
            .and_then(expand_path)
            .or_else(data_dir)
    }

    pub fn keystore_dir(&self, data_dir: &std::path::Path) -> PathBuf {
        self.keystore_dir
            .as_deref()
            .and_then(expand_path)
            .unwrap_or_else(|| data_dir.join("keystore"))
    }
}

pub fn load() -> Config {
    config_path().map(load_from).unwrap_or_default()
}

pub fn load_from(path: PathBuf) -> Config {
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TOKENWATCH_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("tokenwatch").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("tokenwatch").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "tokenwatch", "tokenwatch")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("tokenwatch"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("tokenwatch"));
    }
    directories::ProjectDirs::from("io", "tokenwatch", "tokenwatch")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn store_db_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("store.sqlite3")
}

pub fn log_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("tokenwatch.log")
}

pub fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default_rpc = \"localhost:9545\"\nkeystore_dir = \"/tmp/ks\"\nmetadata_timeout_secs = 3\n",
        )
        .unwrap();

        let config = load_from(path);
        assert_eq!(config.default_rpc(), "http://localhost:9545");
        assert_eq!(config.metadata_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.keystore_dir(std::path::Path::new("/data")),
            PathBuf::from("/tmp/ks")
        );
    }

    #[test]
    fn test_missing_or_broken_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(dir.path().join("absent.toml"));
        assert_eq!(config.default_rpc(), DEFAULT_RPC);

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "default_rpc = [").unwrap();
        let config = load_from(broken);
        assert_eq!(config.default_rpc(), DEFAULT_RPC);
        assert_eq!(
            config.keystore_dir(std::path::Path::new("/data")),
            PathBuf::from("/data/keystore")
        );
    }
}
