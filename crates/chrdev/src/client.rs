//! 路径级访问
//!
//! [`Client`] 把命名空间解析、操作分发和文件描述符表组合在一起，
//! 提供 open/read/write/close 这一组按路径和 fd 工作的调用。

use alloc::sync::Arc;

use crate::control::CONTROL_PATH;
use crate::fd_table::FdTable;
use crate::namespace::NamespaceBinder;
use crate::subsystem::ChrdevSubsystem;
use crate::{ChrdevError, File, OpenFlags};

/// 一个调用者的视图：自己的 fd 表，共享的子系统和命名空间
pub struct Client<'a> {
    subsystem: &'a ChrdevSubsystem,
    binder: &'a dyn NamespaceBinder,
    fds: FdTable<'a>,
}

impl<'a> Client<'a> {
    /// 创建调用者视图
    pub fn new(subsystem: &'a ChrdevSubsystem, binder: &'a dyn NamespaceBinder) -> Self {
        Self {
            subsystem,
            binder,
            fds: FdTable::new(),
        }
    }

    /// 打开路径，返回文件描述符
    ///
    /// [`CONTROL_PATH`] 打开控制通道，其余路径经命名空间解析为设备号后打开设备。
    pub fn open(&self, path: &str, flags: OpenFlags) -> Result<usize, ChrdevError> {
        let file: Arc<dyn File + 'a> = if path == CONTROL_PATH {
            Arc::new(self.subsystem.control().open(flags))
        } else {
            let dev = self.binder.resolve(path)?;
            Arc::new(self.subsystem.dispatcher().open_devno(dev, flags)?)
        };
        self.fds.alloc(file)
    }

    /// 读取
    pub fn read(&self, fd: usize, buf: &mut [u8]) -> Result<usize, ChrdevError> {
        let file = self.fds.get(fd)?;
        self.subsystem.dispatcher().read(file.as_ref(), buf)
    }

    /// 写入
    pub fn write(&self, fd: usize, buf: &[u8]) -> Result<usize, ChrdevError> {
        let file = self.fds.get(fd)?;
        self.subsystem.dispatcher().write(file.as_ref(), buf)
    }

    /// 关闭文件描述符
    pub fn close(&self, fd: usize) -> Result<(), ChrdevError> {
        self.fds.close(fd)
    }

    /// 文件描述符表
    pub fn fds(&self) -> &FdTable<'a> {
        &self.fds
    }
}
