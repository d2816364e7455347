use crate::tools::files::{resolve_in_root, wildcard_match};
use crate::tools::{Tool, ToolParameters, ToolResult, optional_str, required_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::warn;

/// `read_directory` 最多列出的条目数
const MAX_LISTED_ENTRIES: usize = 50;

// ── ReadFileTool ──────────────────────────────────────────────────────────────
/// 读取项目根目录下的文件内容
pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file from the project. \
         Use this to fetch documentation, configs, or source code."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path relative to the project root, e.g. \"ARCHITECTURE.md\""
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> crate::error::Result<ToolResult> {
        let path_str = required_str(&parameters, "file_path")?;

        let Some(path) = resolve_in_root(&self.root, path_str) else {
            return Ok(ToolResult::error(
                "Error: File must be within the project directory.".to_string(),
            ));
        };
        if !path.exists() {
            return Ok(ToolResult::error(format!(
                "Error: File not found: {path_str}"
            )));
        }
        if path.is_dir() {
            return Ok(ToolResult::error(
                "Error: Path is a directory. Use read_directory instead.".to_string(),
            ));
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(ToolResult::success(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) => Ok(ToolResult::error(format!("Error reading file: {e}"))),
        }
    }
}

// ── ReadDirectoryTool ─────────────────────────────────────────────────────────

/// 列出目录内容；带 pattern 时递归查找匹配的文件名
pub struct ReadDirectoryTool {
    root: PathBuf,
}

impl ReadDirectoryTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Tool for ReadDirectoryTool {
    fn name(&self) -> &str {
        "read_directory"
    }

    fn description(&self) -> &str {
        "List files and subdirectories in a project directory. \
         Optional pattern (e.g. \"*.rs\") searches recursively."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory relative to the project root, e.g. \"src/\" or \".\""
                },
                "pattern": {
                    "type": "string",
                    "description": "Optional file name pattern with * and ?, matched recursively"
                }
            },
            "required": ["directory"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> crate::error::Result<ToolResult> {
        let directory = required_str(&parameters, "directory")?;
        let pattern = optional_str(&parameters, "pattern");

        let Some(path) = resolve_in_root(&self.root, directory) else {
            return Ok(ToolResult::error(
                "Error: Directory must be within the project.".to_string(),
            ));
        };
        if !path.is_dir() {
            return Ok(ToolResult::error(format!(
                "Error: Directory not found: {directory}"
            )));
        }

        let mut entries = match collect_entries(&path, pattern).await {
            Ok(entries) => entries,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "Error listing directory: {e}"
                )));
            }
        };
        // 目录在前，其余按完整路径字符串排序
        entries.sort_by_cached_key(|e| (!e.is_dir, e.path.to_string_lossy().into_owned()));

        let lines: Vec<String> = entries
            .iter()
            .take(MAX_LISTED_ENTRIES)
            .map(|entry| {
                let rel = entry.path.strip_prefix(&path).unwrap_or(&entry.path);
                let marker = if entry.is_dir { "[DIR]" } else { "[FILE]" };
                format!("  {} {}", marker, rel.display())
            })
            .collect();

        if lines.is_empty() {
            return Ok(ToolResult::success("(empty)".to_string()));
        }
        Ok(ToolResult::success(lines.join("\n")))
    }
}

struct Entry {
    path: PathBuf,
    is_dir: bool,
}

/// 无 pattern 时只列直接子项；有 pattern 时用工作栈遍历整棵子树，按文件名匹配。
/// 起始目录读取失败返回错误，子目录读取失败只记录日志并跳过。
async fn collect_entries(dir: &Path, pattern: Option<&str>) -> std::io::Result<Vec<Entry>> {
    let mut found = Vec::new();
    let mut work_stack = vec![dir.to_path_buf()];

    while let Some(current) = work_stack.pop() {
        let mut read_dir = match tokio::fs::read_dir(&current).await {
            Ok(rd) => rd,
            Err(e) if current == dir => return Err(e),
            Err(e) => {
                warn!(path = %current.display(), error = %e, "跳过无法读取的子目录");
                continue;
            }
        };

        while let Some(entry) = read_dir.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            let path = entry.path();
            match pattern {
                None => found.push(Entry { path, is_dir }),
                Some(pattern) => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if is_dir {
                        work_stack.push(path.clone());
                    }
                    if wildcard_match(pattern, &name) {
                        found.push(Entry { path, is_dir });
                    }
                }
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/tools")).unwrap();
        std::fs::write(dir.path().join("ARCHITECTURE.md"), "# Layout").unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("src/tools/mod.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/notes.txt"), "").unwrap();
        dir
    }

    fn params(pairs: &[(&str, &str)]) -> ToolParameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    #[tokio::test]
    async fn test_read_file() {
        let dir = project();
        let tool = ReadFileTool::new(dir.path());

        let ok = tool
            .execute(params(&[("file_path", "ARCHITECTURE.md")]))
            .await
            .unwrap();
        assert!(ok.success);
        assert_eq!(ok.output, "# Layout");

        let missing = tool
            .execute(params(&[("file_path", "nope.md")]))
            .await
            .unwrap();
        assert_eq!(missing.error.as_deref(), Some("Error: File not found: nope.md"));

        let escape = tool
            .execute(params(&[("file_path", "../secret")]))
            .await
            .unwrap();
        assert_eq!(
            escape.error.as_deref(),
            Some("Error: File must be within the project directory.")
        );

        let is_dir = tool.execute(params(&[("file_path", "src")])).await.unwrap();
        assert!(!is_dir.success);
        assert!(is_dir.error.unwrap().contains("is a directory"));
    }

    #[tokio::test]
    async fn test_read_directory_lists_dirs_first() {
        let dir = project();
        let tool = ReadDirectoryTool::new(dir.path());

        let result = tool.execute(params(&[("directory", "src")])).await.unwrap();
        assert_eq!(
            result.output,
            "  [DIR] tools\n  [FILE] main.rs\n  [FILE] notes.txt"
        );
    }

    #[tokio::test]
    async fn test_read_directory_with_pattern_is_recursive() {
        let dir = project();
        let tool = ReadDirectoryTool::new(dir.path());

        let result = tool
            .execute(params(&[("directory", "."), ("pattern", "*.rs")]))
            .await
            .unwrap();
        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("  [FILE] src")));
    }

    #[tokio::test]
    async fn test_read_directory_errors_and_empty() {
        let dir = project();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let tool = ReadDirectoryTool::new(dir.path());

        let empty = tool.execute(params(&[("directory", "empty")])).await.unwrap();
        assert_eq!(empty.output, "(empty)");

        let missing = tool.execute(params(&[("directory", "docs")])).await.unwrap();
        assert_eq!(
            missing.error.as_deref(),
            Some("Error: Directory not found: docs")
        );

        let escape = tool.execute(params(&[("directory", "..")])).await.unwrap();
        assert_eq!(
            escape.error.as_deref(),
            Some("Error: Directory must be within the project.")
        );
    }

    #[tokio::test]
    async fn test_pattern_results_sort_as_plain_strings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a-b.txt"), "").unwrap();
        let tool = ReadDirectoryTool::new(dir.path());

        let result = tool
            .execute(params(&[("directory", "."), ("pattern", "*.txt")]))
            .await
            .unwrap();
        // '-' 排在 '/' 之前
        assert_eq!(result.output, "  [FILE] a-b.txt\n  [FILE] a/b.txt");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_failure_is_reported_as_tool_error() {
        let dir = project();
        let socket = dir.path().join("agent.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&socket).unwrap();
        let tool = ReadFileTool::new(dir.path());

        let result = tool
            .execute(params(&[("file_path", "agent.sock")]))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Error reading file: "));
    }
}
