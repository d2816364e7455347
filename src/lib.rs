pub mod config;
pub mod error;
pub mod memory;
pub mod tools;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::Result;
    pub use crate::memory::{Decision, DecisionStore, RetrieveOptions, StoreOptions};
    pub use crate::tools::{Tool, ToolManager, ToolParameters, ToolResult};
}
