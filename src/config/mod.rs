use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::contract::FunctionKind;

mod network;

pub use network::{NativeCurrency, NetworkConfig, ARC_TESTNET};

/// HelloArchitect deployment used when nothing else is configured
pub const DEFAULT_CONTRACT: &str = "0xf9D1FAb74B24353C3a878B8E299Bbe6d4e100237";
pub const DEFAULT_GREETING: &str = "GM from Arc!";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial contract address field
    pub contract: String,
    /// Initial dropdown choice, by Solidity name (`gm`, `setGreeting`, ...)
    pub function: FunctionKind,
    /// Initial greeting argument buffer
    pub greeting: String,
    /// Hex private key for the local signer
    pub private_key: Option<String>,
    /// Send through node-managed accounts instead of a local key
    pub unlocked: bool,
    /// Ask in the TUI before handing the call to the signer
    pub confirm_before_sign: bool,
    pub confirmations: u64,
    pub confirmation_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contract: DEFAULT_CONTRACT.to_string(),
            function: FunctionKind::Gm,
            greeting: DEFAULT_GREETING.to_string(),
            private_key: None,
            unlocked: false,
            confirm_before_sign: true,
            confirmations: 1,
            confirmation_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn private_key(&self) -> Option<&str> {
        self.private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

pub fn parse(content: &str) -> Config {
    toml::from_str::<Config>(content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ARCPOKE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("arcpoke").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("arcpoke").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "arcpoke", "arcpoke")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("arcpoke"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("arcpoke"));
    }
    directories::ProjectDirs::from("io", "arcpoke", "arcpoke")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("arcpoke.log"))
}

pub fn export_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.contract, DEFAULT_CONTRACT);
        assert_eq!(config.function, FunctionKind::Gm);
        assert_eq!(config.greeting, "GM from Arc!");
        assert!(config.confirm_before_sign);
        assert_eq!(config.confirmations, 1);
        assert!(config.private_key().is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let config = parse(
            r#"
            function = "setGreeting"
            greeting = "hi"
            unlocked = true
            private_key = "   "
            "#,
        );
        assert_eq!(config.function, FunctionKind::SetGreeting);
        assert_eq!(config.greeting, "hi");
        assert!(config.unlocked);
        assert!(config.private_key().is_none());
        // untouched keys keep their defaults
        assert_eq!(config.contract, DEFAULT_CONTRACT);
        assert_eq!(config.confirmation_timeout_secs, 120);
    }

    #[test]
    fn test_parse_malformed_falls_back() {
        let config = parse("contract = [");
        assert_eq!(config.contract, DEFAULT_CONTRACT);
    }

    #[test]
    fn test_unknown_function_rejects_file() {
        let config = parse(
            r#"
            function = "withdraw"
            greeting = "ignored"
            "#,
        );
        assert_eq!(config.function, FunctionKind::Gm);
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[test]
    fn test_function_names_deserialize() {
        for kind in FunctionKind::ALL {
            let config = parse(&format!("function = \"{}\"", kind.name()));
            assert_eq!(config.function, kind);
        }
    }
}
