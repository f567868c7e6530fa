use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "PLANPRIM_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `PLANPRIM_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 流水线调参。
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "PipelineConfig::default_target_size")]
    pub target_size: f64,
    #[serde(default = "PipelineConfig::default_uniform_width")]
    pub uniform_width: f64,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub skip_hidden_layers: bool,
    /// 未设置时使用内置关键字表。
    #[serde(default)]
    pub structural_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub min_length: MinLengthConfig,
    #[serde(default)]
    pub zones: ZoneConfig,
}

impl PipelineConfig {
    fn default_target_size() -> f64 {
        140.0
    }

    fn default_uniform_width() -> f64 {
        0.1
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_size: Self::default_target_size(),
            uniform_width: Self::default_uniform_width(),
            page: 0,
            skip_hidden_layers: false,
            structural_keywords: None,
            min_length: MinLengthConfig::default(),
            zones: ZoneConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MinLengthConfig {
    #[serde(default = "MinLengthConfig::default_wall")]
    pub wall: f64,
    #[serde(default = "MinLengthConfig::default_medium")]
    pub medium: f64,
    #[serde(default = "MinLengthConfig::default_detail")]
    pub detail: f64,
}

impl MinLengthConfig {
    fn default_wall() -> f64 {
        1.0
    }

    fn default_medium() -> f64 {
        2.0
    }

    fn default_detail() -> f64 {
        3.0
    }
}

impl Default for MinLengthConfig {
    fn default() -> Self {
        Self {
            wall: Self::default_wall(),
            medium: Self::default_medium(),
            detail: Self::default_detail(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "ZoneConfig::default_enabled")]
    pub exclude_text: bool,
    #[serde(default = "ZoneConfig::default_enabled")]
    pub exclude_layout: bool,
    #[serde(default = "ZoneConfig::default_text_margin")]
    pub text_margin: f64,
    #[serde(default = "ZoneConfig::default_title_block_min_chars")]
    pub title_block_min_chars: usize,
}

impl ZoneConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_text_margin() -> f64 {
        5.0
    }

    fn default_title_block_min_chars() -> usize {
        50
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            exclude_text: true,
            exclude_layout: true,
            text_margin: Self::default_text_margin(),
            title_block_min_chars: Self::default_title_block_min_chars(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceConfig {
    /// 相对输入路径的额外搜索根目录。
    #[serde(default)]
    pub input_roots: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
