pub(crate) mod files;

pub use files::{ReadDirectoryTool, ReadFileTool};

use std::path::{Component, Path, PathBuf};

use crate::tools::Tool;

/// 以 `root` 为项目根的两个只读文件工具
pub fn project_file_tools(root: PathBuf) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ReadFileTool::new(root.clone())),
        Box::new(ReadDirectoryTool::new(root)),
    ]
}

/// 将用户提供的相对/绝对路径解析到 `root` 之下，越界时返回 `None`。
///
/// - 先做不依赖文件系统的规范化（消除 `.` 和 `..`）再校验前缀
/// - 目标已存在时再用 canonicalize 复查一次，挡住指向根目录外的符号链接
fn resolve_in_root(root: &Path, path_str: &str) -> Option<PathBuf> {
    let normalized_root = normalize_path(&absolute(root));
    let requested = Path::new(path_str);

    let normalized = if requested.is_absolute() {
        normalize_path(requested)
    } else {
        normalize_path(&normalized_root.join(requested))
    };
    if !normalized.starts_with(&normalized_root) {
        return None;
    }

    if let (Ok(real_root), Ok(real)) = (
        normalized_root.canonicalize(),
        normalized.canonicalize(),
    ) && !real.starts_with(&real_root)
    {
        return None;
    }
    Some(normalized)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 不依赖文件系统的路径规范化（消除 `.` 和 `..`）
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }
    components.iter().collect()
}

/// 简单通配符匹配：`*` 匹配任意串，`?` 匹配单个字符
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    wildcard_match_chars(&pattern, &name)
}

fn wildcard_match_chars(pattern: &[char], name: &[char]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((&'*', rest)) => (0..=name.len()).any(|i| wildcard_match_chars(rest, &name[i..])),
        Some((&c, rest)) => match name.split_first() {
            Some((&n, name_rest)) if c == '?' || c == n => wildcard_match_chars(rest, name_rest),
            _ => false,
        },
    }
}
