//! 工具系统
//!
//! 定义 [`Tool`] trait 和 [`ToolManager`]（注册、导出定义、带超时执行）。
//! 决策工具位于 [`builtin`]，项目文件工具位于 [`files`]。

pub mod builtin;
pub mod files;

use crate::config::Config;
use crate::error::{Result, ToolError};
use crate::memory::DecisionStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// 工具执行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error),
        }
    }
}

pub type ToolParameters = std::collections::HashMap<String, serde_json::Value>;

/// 工具接口，决策工具和文件工具均实现此 trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// 工具参数的 JSON Schema 定义
    fn parameters(&self) -> serde_json::Value;
    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult>;
}

/// 对外暴露的工具定义（OpenAI tools 数组元素格式）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionSpec,
}

/// 工具的函数声明（name、描述和 JSON Schema 参数定义）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            },
        }
    }
}

/// 按字符串取必填参数
pub(crate) fn required_str<'a>(parameters: &'a ToolParameters, name: &str) -> Result<&'a str> {
    Ok(parameters
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingParameter(name.to_string()))?)
}

/// 按字符串取可选参数，空串视为未提供
pub(crate) fn optional_str<'a>(parameters: &'a ToolParameters, name: &str) -> Option<&'a str> {
    parameters
        .get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

pub struct ToolManager {
    /// 按名称排序，保证 `list_tools` / 定义导出顺序稳定
    tools: BTreeMap<String, Box<dyn Tool>>,
    /// 单次执行超时。`None` = 不限制
    timeout: Option<Duration>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            timeout: None,
        }
    }

    /// `timeout_ms == 0` 表示不限制
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            tools: BTreeMap::new(),
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
        }
    }

    /// 按配置注册全部工具：决策工具共享同一个 store 文件，文件工具限制在项目根目录下
    pub fn from_config(config: &Config) -> Self {
        let store = DecisionStore::new(config.memory_path());
        let mut manager = Self::with_timeout_ms(config.tool_timeout_ms);
        manager.register_tools(builtin::memory::decision_tools(store));
        manager.register_tools(files::project_file_tools(config.project_root.clone()));
        manager
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_tools(&mut self, tools: Vec<Box<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|name| name.as_str()).collect()
    }

    pub fn get_tool(&self, tool_name: &str) -> Option<&dyn Tool> {
        self.tools.get(tool_name).map(|tool| &**tool)
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition::from_tool(&**tool))
            .collect()
    }

    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: ToolParameters,
    ) -> Result<ToolResult> {
        let tool = self
            .get_tool(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        debug!(tool = %tool_name, "🔧 执行工具");
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, tool.execute(parameters))
                .await
                .map_err(|_| ToolError::Timeout(tool_name.to_string()))?,
            None => tool.execute(parameters).await,
        }
    }
}
