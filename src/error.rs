use std::fmt;

/// dev_memory 的统一错误类型
#[derive(Debug)]
pub enum DevMemoryError {
    /// 决策存储错误
    Memory(MemoryError),
    /// 工具执行错误
    Tool(ToolError),
    /// 配置错误
    Config(ConfigError),
    /// JSON 序列化/反序列化错误
    Json(String),
}

/// 决策存储错误（只出现在写路径，读路径一律降级为空集合）
#[derive(Debug)]
pub enum MemoryError {
    /// 文件或目录读写失败
    IoError(String),
    /// 记录序列化失败
    SerializationError(String),
}

/// 工具执行错误
#[derive(Debug)]
pub enum ToolError {
    /// 工具未找到
    NotFound(String),
    /// 参数缺失
    MissingParameter(String),
    /// 参数类型错误
    InvalidParameter { name: String, message: String },
    /// 工具执行超时
    Timeout(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

impl fmt::Display for DevMemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevMemoryError::Memory(e) => write!(f, "Memory Error: {}", e),
            DevMemoryError::Tool(e) => write!(f, "Tool Error: {}", e),
            DevMemoryError::Config(e) => write!(f, "Config Error: {}", e),
            DevMemoryError::Json(msg) => write!(f, "JSON Error: {}", msg),
        }
    }
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::IoError(msg) => write!(f, "IO failure: {}", msg),
            MemoryError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool '{}' not found", name),
            ToolError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            ToolError::InvalidParameter { name, message } => {
                write!(f, "Invalid parameter '{}': {}", name, message)
            }
            ToolError::Timeout(name) => write!(f, "Tool '{}' timed out", name),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for DevMemoryError {}

impl std::error::Error for MemoryError {}
impl std::error::Error for ToolError {}
impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for DevMemoryError {
    fn from(err: serde_json::Error) -> Self {
        DevMemoryError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for DevMemoryError {
    fn from(err: serde_yaml::Error) -> Self {
        DevMemoryError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<MemoryError> for DevMemoryError {
    fn from(err: MemoryError) -> Self {
        DevMemoryError::Memory(err)
    }
}

impl From<ToolError> for DevMemoryError {
    fn from(err: ToolError) -> Self {
        DevMemoryError::Tool(err)
    }
}

impl From<ConfigError> for DevMemoryError {
    fn from(err: ConfigError) -> Self {
        DevMemoryError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, DevMemoryError>;
