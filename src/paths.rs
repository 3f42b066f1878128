//! XDG-compliant path resolution for isgci-why.
//!
//! Provides [`WhyPaths`], the global config and data directories following the
//! XDG Base Directory Specification.

use std::path::PathBuf;

use crate::error::ConfigError;

const APP_DIR: &str = "isgci-why";

/// Global XDG-compliant directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhyPaths {
    /// `$XDG_CONFIG_HOME/isgci-why/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/isgci-why/`
    pub data_dir: PathBuf,
}

impl WhyPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let home = lookup("HOME").map(PathBuf::from).ok_or(ConfigError::NoHome)?;

        let config_dir = lookup("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"))
            .join(APP_DIR);

        let data_dir = lookup("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local/share"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Default config file location.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Default trace database location.
    pub fn default_store(&self) -> PathBuf {
        self.data_dir.join("trace.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_home() {
        let paths = WhyPaths::resolve_with(env(&[("HOME", "/home/u")])).unwrap();
        assert_eq!(paths.config_dir, PathBuf::from("/home/u/.config/isgci-why"));
        assert_eq!(paths.data_dir, PathBuf::from("/home/u/.local/share/isgci-why"));
        assert_eq!(
            paths.default_store(),
            PathBuf::from("/home/u/.local/share/isgci-why/trace.redb")
        );
    }

    #[test]
    fn xdg_variables_win() {
        let paths = WhyPaths::resolve_with(env(&[
            ("HOME", "/home/u"),
            ("XDG_CONFIG_HOME", "/cfg"),
            ("XDG_DATA_HOME", "/data"),
        ]))
        .unwrap();
        assert_eq!(paths.config_file(), PathBuf::from("/cfg/isgci-why/config.toml"));
        assert_eq!(paths.data_dir, PathBuf::from("/data/isgci-why"));
    }

    #[test]
    fn missing_home_is_an_error() {
        let err = WhyPaths::resolve_with(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoHome));
    }
}
