//! 测试支持 crate
//!
//! 提供 Mock 实现和测试工具

#![no_std]

pub mod mock;
