//! 文件抽象层
//!
//! 该模块定义了统一的文件操作接口 [`File`] trait。
//! 设备会话 ([`crate::FileSession`]) 和控制通道文件 ([`crate::ControlFile`])
//! 都实现该接口，因此可以存放在同一个 [`crate::FdTable`] 中。

use crate::devno::DevNo;
use crate::{ChrdevError, OpenFlags};

/// 文件操作的统一接口
pub trait File: Send + Sync {
    /// 检查文件是否可读
    fn readable(&self) -> bool;

    /// 检查文件是否可写
    fn writable(&self) -> bool;

    /// 从文件读取数据
    fn read(&self, buf: &mut [u8]) -> Result<usize, ChrdevError>;

    /// 向文件写入数据
    fn write(&self, buf: &[u8]) -> Result<usize, ChrdevError>;

    /// 获取打开标志
    fn flags(&self) -> OpenFlags;

    /// 绑定的设备号（可选方法）
    fn devno(&self) -> Option<DevNo> {
        None
    }
}
