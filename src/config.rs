use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::contract::DATABASE_NAME;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FruitmarketConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub log_filter: Option<String>,
}

impl FruitmarketConfig {
    /// Database path, falling back to the default location under `base`
    pub fn database_path(&self, base: &Path) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path_in(base))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Log filter directive: `--verbose`, then `RUST_LOG`, then `log_filter`,
    /// then `info`
    pub fn log_directive(&self, verbose: bool, env: Option<&str>) -> String {
        if verbose {
            return "debug".to_string();
        }
        env.filter(|e| !e.trim().is_empty())
            .or(self.log_filter.as_deref())
            .unwrap_or("info")
            .to_string()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("fruitmarket.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".fruitmarket").join(DATABASE_NAME)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<FruitmarketConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FruitmarketConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &FruitmarketConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
