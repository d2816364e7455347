//! 内置工具

pub mod memory;
