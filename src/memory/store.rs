//! 项目决策 Store
//!
//! 以单个 JSON 文件保存全部决策记录（架构选择、库选型、用户偏好……），
//! 文件内容是一个按插入顺序排列的数组：
//!
//! ```json
//! [
//!   {
//!     "id": 1,
//!     "category": "architecture",
//!     "content": "Use iterative factorial for stack safety",
//!     "tags": ["factorial", "performance"]
//!   }
//! ]
//! ```
//!
//! 每次写入都读取完整集合、追加一条、整体重写文件；读路径上文件缺失或损坏
//! 一律视为空集合，不向调用方报错。
//!
//! ## 快速上手
//!
//! ```rust,no_run
//! use dev_memory::memory::store::{DecisionStore, RetrieveOptions, StoreOptions};
//!
//! # fn example() -> dev_memory::error::Result<()> {
//! let store = DecisionStore::new("memory/project_memory.json");
//! let id = store.store(
//!     "architecture",
//!     "Use iterative factorial for stack safety",
//!     StoreOptions::default().tags(["factorial", "performance"]),
//! )?;
//! let hits = store.retrieve("factorial", &RetrieveOptions::default());
//! assert_eq!(hits[0].id, id);
//! # Ok(())
//! # }
//! ```

use crate::error::{MemoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `retrieve` 默认返回条数
pub const DEFAULT_RETRIEVE_LIMIT: usize = 10;

// ── Decision ─────────────────────────────────────────────────────────────────

/// Store 中的单条决策记录，写入后不可修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// 插入时分配：`已有记录数 + 1`
    pub id: u64,
    /// 自由文本分类（architecture / library / preference ...），原样保存
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    /// 检索用关键词，保留调用方给出的顺序
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Decision {
    /// 宽松解码单个数组元素：缺失或为 null 的文本字段取空串，tags 只保留字符串项，
    /// 没有合法 `id` 时按位置补 `index + 1`
    pub fn from_value(index: usize, value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|t| t.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            id: value
                .get("id")
                .and_then(Value::as_u64)
                .unwrap_or(index as u64 + 1),
            category: text("category"),
            content: text("content"),
            tags,
        }
    }

    /// `query_lower` 需已转小写；category 过滤为精确匹配
    fn matches(&self, query_lower: &str, category: Option<&str>) -> bool {
        if let Some(category) = category
            && self.category != category
        {
            return false;
        }
        self.content.to_lowercase().contains(query_lower)
            || self.tags.join(" ").to_lowercase().contains(query_lower)
    }
}

// ── 调用参数 ──────────────────────────────────────────────────────────────────

/// `store` 的可选参数
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// 默认空
    pub tags: Vec<String>,
}

impl StoreOptions {
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// `retrieve` 的可选参数
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    /// 精确匹配的分类过滤；`None` 或空串表示不过滤
    pub category: Option<String>,
    /// 只保留最后 `limit` 条匹配，默认 10
    pub limit: usize,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            category: None,
            limit: DEFAULT_RETRIEVE_LIMIT,
        }
    }
}

impl RetrieveOptions {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

// ── LoadOutcome ──────────────────────────────────────────────────────────────

/// 读取 store 文件的结果
///
/// `Missing` 与 `Corrupt` 对调用方而言都等价于空集合，区分开来只是为了日志。
/// 只有根节点无法解析或不是数组才算 `Corrupt`；数组内的元素原样保留，
/// 读取时再逐个宽松解码。
#[derive(Debug)]
pub enum LoadOutcome {
    /// 文件不存在（尚未写入过）
    Missing,
    /// 根数组中的全部元素
    Loaded(Vec<Value>),
    /// 文件存在但无法读取，或根节点不是数组
    Corrupt(String),
}

impl LoadOutcome {
    pub fn into_elements(self) -> Vec<Value> {
        match self {
            LoadOutcome::Loaded(elements) => elements,
            LoadOutcome::Missing | LoadOutcome::Corrupt(_) => Vec::new(),
        }
    }
}

// ── 过滤 ─────────────────────────────────────────────────────────────────────

/// 按 query / category 过滤，保持插入顺序，只保留最后 `limit` 条
///
/// query 不区分大小写，在 content 或以空格拼接的 tags 中做子串匹配；
/// 空 query 匹配全部记录。
pub fn filter_decisions<'a>(
    records: &'a [Decision],
    query: &str,
    category: Option<&str>,
    limit: usize,
) -> Vec<&'a Decision> {
    let query_lower = query.to_lowercase();
    let matched: Vec<&Decision> = records
        .iter()
        .filter(|r| r.matches(&query_lower, category))
        .collect();
    let skip = matched.len().saturating_sub(limit);
    matched.into_iter().skip(skip).collect()
}

// ── DecisionStore ────────────────────────────────────────────────────────────

/// 基于 JSON 文件的决策 Store
///
/// 不缓存任何内容：每次调用都完整读取文件，写入时整体替换文件。
/// 仅面向单进程顺序调用，不做加锁。
#[derive(Debug, Clone)]
pub struct DecisionStore {
    path: PathBuf,
}

impl DecisionStore {
    /// 指定 store 文件路径（支持 `~/` 前缀），文件在首次写入时才创建
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: expand_tilde(path.as_ref()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取 store 文件，只校验根节点是数组
    pub fn load(&self) -> LoadOutcome {
        if !self.path.exists() {
            return LoadOutcome::Missing;
        }
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => return LoadOutcome::Corrupt(format!("读取失败: {e}")),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(elements)) => LoadOutcome::Loaded(elements),
            Ok(_) => LoadOutcome::Corrupt("根节点不是数组".to_string()),
            Err(e) => LoadOutcome::Corrupt(format!("解析失败: {e}")),
        }
    }

    /// 根数组元素；缺失或损坏时返回空
    fn elements(&self) -> Vec<Value> {
        match self.load() {
            LoadOutcome::Corrupt(reason) => {
                warn!(path = %self.path.display(), %reason, "决策文件损坏，按空集合处理");
                Vec::new()
            }
            outcome => outcome.into_elements(),
        }
    }

    /// 当前完整集合；缺失或损坏时返回空
    pub fn records(&self) -> Vec<Decision> {
        self.elements()
            .iter()
            .enumerate()
            .map(|(i, v)| Decision::from_value(i, v))
            .collect()
    }

    /// 追加一条决策并整体重写文件，返回新记录的 id
    ///
    /// 已有元素原样写回，id 按元素总数计算。
    pub fn store(&self, category: &str, content: &str, options: StoreOptions) -> Result<u64> {
        let mut elements = self.elements();
        let id = elements.len() as u64 + 1;
        let decision = Decision {
            id,
            category: category.to_string(),
            content: content.to_string(),
            tags: options.tags,
        };
        elements.push(
            serde_json::to_value(&decision)
                .map_err(|e| MemoryError::SerializationError(e.to_string()))?,
        );
        self.persist(&elements)?;
        info!(id, category = %category, path = %self.path.display(), "📝 决策已保存");
        Ok(id)
    }

    /// 检索匹配的完整记录，按插入顺序返回最近的 `limit` 条
    pub fn retrieve(&self, query: &str, options: &RetrieveOptions) -> Vec<Decision> {
        let records = self.records();
        let hits: Vec<Decision> =
            filter_decisions(&records, query, options.category_filter(), options.limit)
                .into_iter()
                .cloned()
                .collect();
        debug!(query = %query, total = records.len(), hits = hits.len(), "🔍 决策检索");
        hits
    }

    /// 先写同目录临时文件再 rename，失败时旧文件保持完整
    fn persist(&self, elements: &[Value]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemoryError::IoError(format!("创建目录失败: {e}")))?;
        }
        let json = serde_json::to_string_pretty(elements)
            .map_err(|e| MemoryError::SerializationError(e.to_string()))?;

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)
            .map_err(|e| MemoryError::IoError(format!("写入临时文件失败: {e}")))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(MemoryError::IoError(format!("替换 store 文件失败: {e}")).into());
        }
        debug!(path = %self.path.display(), records = elements.len(), "💾 Store 已持久化");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/")
        && let Some(home) = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(&s[2..]);
    }
    path.to_path_buf()
}
