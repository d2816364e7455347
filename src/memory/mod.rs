//! 项目记忆
//!
//! 跨会话保存团队做出的决策（架构选择、库选型、用户偏好等），供后续 Agent 检索。
//!
//! | 调用面 | 实现 | 返回 |
//! |--------|------|------|
//! | 直接调用 | [`DecisionStore::store`] / [`DecisionStore::retrieve`] | id / 完整记录 |
//! | 工具调用 | [`crate::tools::builtin::memory`] | 格式化文本 |
//!
//! ```rust,no_run
//! use dev_memory::memory::{DecisionStore, RetrieveOptions, StoreOptions};
//!
//! # fn example() -> dev_memory::error::Result<()> {
//! let store = DecisionStore::new("memory/project_memory.json");
//! store.store("library", "No external dependencies; stdlib only", StoreOptions::default())?;
//! let hits = store.retrieve("stdlib", &RetrieveOptions::default().category("library"));
//! # Ok(())
//! # }
//! ```

pub mod store;

pub use store::{
    DEFAULT_RETRIEVE_LIMIT, Decision, DecisionStore, LoadOutcome, RetrieveOptions, StoreOptions,
    filter_decisions,
};
