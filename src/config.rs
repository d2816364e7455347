//! 运行配置
//!
//! 可从 YAML 文件加载，也可从环境变量（含 `.env`）读取：
//! ```text
//! DEV_MEMORY_ROOT=/path/to/project
//! DEV_MEMORY_FILE=memory/project_memory.json
//! DEV_MEMORY_TOOL_TIMEOUT_MS=30000
//! ```

use crate::error::{ConfigError, Result};
use crate::memory::store::expand_tilde;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const ENV_ROOT: &str = "DEV_MEMORY_ROOT";
const ENV_FILE: &str = "DEV_MEMORY_FILE";
const ENV_TIMEOUT: &str = "DEV_MEMORY_TOOL_TIMEOUT_MS";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 项目根目录：文件工具的访问边界，也是相对 `memory_file` 的基准
    pub project_root: PathBuf,
    /// 决策 store 文件，相对路径按 `project_root` 展开
    pub memory_file: PathBuf,
    /// 单次工具执行超时（毫秒），0 = 不限制
    pub tool_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            memory_file: PathBuf::from("memory/project_memory.json"),
            tool_timeout_ms: 30_000,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let file =
            std::fs::File::open(path).map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// 在默认值之上叠加环境变量
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let mut config = Self::default();
        if let Ok(root) = std::env::var(ENV_ROOT) {
            config.project_root = PathBuf::from(root);
        }
        if let Ok(file) = std::env::var(ENV_FILE) {
            config.memory_file = PathBuf::from(file);
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT) {
            config.tool_timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: ENV_TIMEOUT.to_string(),
                        message: format!("{e}"),
                    })?;
        }
        Ok(config)
    }

    /// store 文件的实际路径
    pub fn memory_path(&self) -> PathBuf {
        let file = expand_tilde(&self.memory_file);
        if file.is_absolute() {
            file
        } else {
            expand_tilde(&self.project_root).join(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_path_resolution() {
        let config = Config {
            project_root: PathBuf::from("/srv/project"),
            ..Config::default()
        };
        assert_eq!(
            config.memory_path(),
            PathBuf::from("/srv/project/memory/project_memory.json")
        );

        let config = Config {
            memory_file: PathBuf::from("/var/lib/decisions.json"),
            ..config
        };
        assert_eq!(config.memory_path(), PathBuf::from("/var/lib/decisions.json"));
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev-memory.yaml");
        std::fs::write(&path, "project_root: /srv/project\ntool_timeout_ms: 500\n").unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.project_root, PathBuf::from("/srv/project"));
        assert_eq!(config.memory_file, PathBuf::from("memory/project_memory.json"));
        assert_eq!(config.tool_timeout_ms, 500);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/definitely/not/here.yaml").is_err());
    }
}
