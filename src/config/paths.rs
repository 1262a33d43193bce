//! Config file location
//!
//! `WA_CLIENT_CONFIG` names the file outright. Otherwise the client looks in
//! `WA_CLIENT_CONFIG_DIR`, falling back to the platform config directory,
//! and prefers `config.json` over `config.toml` there.

use std::path::PathBuf;

/// Explicit config file
pub const CONFIG_FILE_ENV: &str = "WA_CLIENT_CONFIG";
/// Directory searched for a config file
pub const CONFIG_DIR_ENV: &str = "WA_CLIENT_CONFIG_DIR";

const APP_DIR: &str = "wa-gateway-client";
const CANDIDATES: [&str; 2] = ["config.json", "config.toml"];

/// Directory the client reads its config from
pub fn config_dir() -> PathBuf {
    config_dir_from(|key| std::env::var(key).ok())
}

/// Config file the client reads when no `--config` is given
pub fn config_path() -> PathBuf {
    config_path_from(|key| std::env::var(key).ok())
}

/// [`config_dir`] with an arbitrary key lookup
pub fn config_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_blank(lookup(CONFIG_DIR_ENV))
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

/// [`config_path`] with an arbitrary key lookup
///
/// Falls back to `config.json` in the config dir when no candidate exists
/// yet, so `init-config` has somewhere to point at.
pub fn config_path_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(file) = non_blank(lookup(CONFIG_FILE_ENV)) {
        return PathBuf::from(file);
    }

    let dir = config_dir_from(&lookup);
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| dir.join(CANDIDATES[0]))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_explicit_file_beats_dir() {
        let dir = TempDir::new().unwrap();
        let path = config_path_from(lookup(&[
            (CONFIG_FILE_ENV, "/etc/wa/client.toml"),
            (CONFIG_DIR_ENV, dir.path().to_str().unwrap()),
        ]));
        assert_eq!(path, PathBuf::from("/etc/wa/client.toml"));
    }

    #[test]
    fn test_dir_override_defaults_to_json() {
        let dir = TempDir::new().unwrap();
        let path = config_path_from(lookup(&[(CONFIG_DIR_ENV, dir.path().to_str().unwrap())]));
        assert_eq!(path, dir.path().join("config.json"));
    }

    #[test]
    fn test_existing_toml_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();

        let path = config_path_from(lookup(&[(CONFIG_DIR_ENV, dir.path().to_str().unwrap())]));
        assert_eq!(path, dir.path().join("config.toml"));

        // json wins once both exist
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let path = config_path_from(lookup(&[(CONFIG_DIR_ENV, dir.path().to_str().unwrap())]));
        assert_eq!(path, dir.path().join("config.json"));
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let dir = config_dir_from(lookup(&[(CONFIG_DIR_ENV, "  ")]));
        assert!(dir.ends_with(APP_DIR) || dir == PathBuf::from(".wa-gateway-client"));

        let path = config_path_from(lookup(&[(CONFIG_FILE_ENV, "")]));
        assert!(path.ends_with("config.json") || path.ends_with("config.toml"));
    }
}
