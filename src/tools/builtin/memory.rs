//! Agent 决策工具：store_decision / retrieve_decisions
//!
//! [`DecisionStore`] 之上的一层格式化适配，供外部 Agent 以工具形式调用。
//!
//! | 工具                 | 对应 Store 操作                          |
//! |----------------------|-----------------------------------------|
//! | `store_decision`     | `store.store(category, content, tags)`   |
//! | `retrieve_decisions` | `filter_decisions(records, query, ..)`   |

use crate::memory::store::{Decision, DecisionStore, StoreOptions, filter_decisions};
use crate::tools::{Tool, ToolParameters, ToolResult, optional_str, required_str};
use serde_json::{Value, json};
use tracing::debug;

/// 工具输出最多展示的条数，与调用方请求无关
pub const DISPLAY_LIMIT: usize = 10;
/// 每条记录展示的 content 前缀字符数
pub const EXCERPT_CHARS: usize = 200;

pub const NO_DECISIONS_YET: &str = "No stored decisions yet.";
pub const NO_MATCHING_DECISIONS: &str = "No matching decisions found.";

/// 两个决策工具，共享同一个 store 文件
pub fn decision_tools(store: DecisionStore) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(StoreDecisionTool::new(store.clone())),
        Box::new(RetrieveDecisionsTool::new(store)),
    ]
}

// ── StoreDecisionTool ────────────────────────────────────────────────────────

/// 保存一条项目决策
pub struct StoreDecisionTool {
    pub store: DecisionStore,
}

impl StoreDecisionTool {
    pub fn new(store: DecisionStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Tool for StoreDecisionTool {
    fn name(&self) -> &str {
        "store_decision"
    }

    fn description(&self) -> &str {
        "Store a project decision, architecture choice, or preference for future reference. \
         Categories: architecture, api, library, preference, bug_fix, security. \
         Tags: optional comma-separated keywords for retrieval."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "Decision category, e.g. \"architecture\" or \"library\""
                },
                "content": {
                    "type": "string",
                    "description": "The decision itself"
                },
                "tags": {
                    "type": "string",
                    "description": "Optional comma-separated keywords, e.g. \"cache, redis\""
                }
            },
            "required": ["category", "content"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> crate::error::Result<ToolResult> {
        let category = required_str(&parameters, "category")?;
        let content = required_str(&parameters, "content")?;
        let tags = parse_tags(optional_str(&parameters, "tags").unwrap_or_default());

        debug!(category = %category, tags = tags.len(), "💡 store_decision 工具写入 Store");
        let id = self
            .store
            .store(category, content, StoreOptions::default().tags(tags))?;

        Ok(ToolResult::success(format!(
            "Stored decision #{id} under category '{category}'"
        )))
    }
}

// ── RetrieveDecisionsTool ────────────────────────────────────────────────────

/// 按关键词 / 分类检索历史决策
pub struct RetrieveDecisionsTool {
    pub store: DecisionStore,
}

impl RetrieveDecisionsTool {
    pub fn new(store: DecisionStore) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Tool for RetrieveDecisionsTool {
    fn name(&self) -> &str {
        "retrieve_decisions"
    }

    fn description(&self) -> &str {
        "Retrieve relevant past project decisions by keyword or category. \
         Use when asked about prior choices, architecture, or preferences."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Case-insensitive keyword matched against content and tags"
                },
                "category": {
                    "type": "string",
                    "description": "Optional exact category filter"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> crate::error::Result<ToolResult> {
        let query = required_str(&parameters, "query")?;
        let category = optional_str(&parameters, "category");

        debug!(query = %query, category = ?category, "🔍 retrieve_decisions 工具查询 Store");
        let records = self.store.records();
        Ok(ToolResult::success(render_matches(&records, query, category)))
    }
}

// ── 辅助函数 ─────────────────────────────────────────────────────────────────

/// 逗号分隔的标签串 → 去空白、去空项后的列表
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn render_matches(records: &[Decision], query: &str, category: Option<&str>) -> String {
    if records.is_empty() {
        return NO_DECISIONS_YET.to_string();
    }
    let hits = filter_decisions(records, query, category, DISPLAY_LIMIT);
    if hits.is_empty() {
        return NO_MATCHING_DECISIONS.to_string();
    }
    hits.into_iter()
        .map(format_decision)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_decision(decision: &Decision) -> String {
    let excerpt: String = decision.content.chars().take(EXCERPT_CHARS).collect();
    format!("[{}] {}...", decision.category, excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DevMemoryError, ToolError};
    use crate::memory::RetrieveOptions;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, DecisionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DecisionStore::new(dir.path().join("project_memory.json"));
        (dir, store)
    }

    fn params(pairs: &[(&str, &str)]) -> ToolParameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" cache, redis ,, "), vec!["cache", "redis"]);
        assert!(parse_tags("").is_empty());
        assert_eq!(parse_tags("single"), vec!["single"]);
    }

    #[tokio::test]
    async fn test_store_decision_splits_tags() {
        let (_dir, store) = temp_store();
        let tool = StoreDecisionTool::new(store.clone());

        let result = tool
            .execute(params(&[
                ("category", "architecture"),
                ("content", "unrelated"),
                ("tags", "cache, redis"),
            ]))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            result.output,
            "Stored decision #1 under category 'architecture'"
        );

        let records = store.retrieve("redis", &RetrieveOptions::default());
        assert_eq!(records[0].tags, vec!["cache", "redis"]);
    }

    #[tokio::test]
    async fn test_store_decision_requires_content() {
        let (_dir, store) = temp_store();
        let tool = StoreDecisionTool::new(store);
        let err = tool
            .execute(params(&[("category", "architecture")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DevMemoryError::Tool(ToolError::MissingParameter(ref p)) if p == "content"
        ));
    }

    #[tokio::test]
    async fn test_empty_states_are_distinct() {
        let (_dir, store) = temp_store();
        let tool = RetrieveDecisionsTool::new(store.clone());

        let empty = tool.execute(params(&[("query", "x")])).await.unwrap();
        assert_eq!(empty.output, NO_DECISIONS_YET);

        store
            .store("library", "tokio runtime", StoreOptions::default())
            .unwrap();
        let none = tool.execute(params(&[("query", "x")])).await.unwrap();
        assert_eq!(none.output, NO_MATCHING_DECISIONS);

        // 分类不匹配同样属于「有记录但无匹配」
        let none = tool
            .execute(params(&[("query", "tokio"), ("category", "architecture")]))
            .await
            .unwrap();
        assert_eq!(none.output, NO_MATCHING_DECISIONS);
    }

    #[tokio::test]
    async fn test_output_is_capped_and_truncated() {
        let (_dir, store) = temp_store();
        let long = "x".repeat(300);
        for i in 1..=12 {
            store
                .store("api", &format!("endpoint {i} {long}"), StoreOptions::default())
                .unwrap();
        }
        let tool = RetrieveDecisionsTool::new(store);
        let result = tool.execute(params(&[("query", "endpoint")])).await.unwrap();

        let lines: Vec<&str> = result.output.split("\n\n").collect();
        assert_eq!(lines.len(), DISPLAY_LIMIT);
        assert!(lines[0].starts_with("[api] endpoint 3 "));
        assert!(lines[9].starts_with("[api] endpoint 12 "));
        for line in lines {
            let body = line.trim_start_matches("[api] ").trim_end_matches("...");
            assert_eq!(body.chars().count(), EXCERPT_CHARS);
        }
    }

    #[tokio::test]
    async fn test_truncation_respects_char_boundaries() {
        let (_dir, store) = temp_store();
        store
            .store("preference", &"深色主题".repeat(100), StoreOptions::default())
            .unwrap();
        let tool = RetrieveDecisionsTool::new(store);
        let result = tool.execute(params(&[("query", "主题")])).await.unwrap();
        let expected = format!("[preference] {}...", "深色主题".repeat(50));
        assert_eq!(result.output, expected);
    }
}
