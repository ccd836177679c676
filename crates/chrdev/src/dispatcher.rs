//! 操作分发
//!
//! [`OperationDispatcher`] 是每个设备共同遵循的 {open, read, write} 操作表，
//! 也是设备表唯一的行为入口。

use crate::devno::{DevNo, major, minor};
use crate::registry::DeviceRegistry;
use crate::session::FileSession;
use crate::{ChrdevError, File, OpenFlags};

/// 绑定到某个设备表的操作表
#[derive(Debug, Clone, Copy)]
pub struct OperationDispatcher<'a> {
    registry: &'a DeviceRegistry,
}

impl<'a> OperationDispatcher<'a> {
    /// 创建绑定到 `registry` 的操作表
    pub fn new(registry: &'a DeviceRegistry) -> Self {
        Self { registry }
    }

    /// 打开 (major, minor) 对应的设备
    ///
    /// 这是唯一建立 会话→设备 绑定的地方。
    pub fn open(
        &self,
        major: u32,
        minor: u32,
        flags: OpenFlags,
    ) -> Result<FileSession<'a>, ChrdevError> {
        let device = self.registry.lookup(major, minor).inspect_err(|_| {
            log::warn!("chrdev: open of unknown device {}:{}", major, minor);
        })?;
        log::debug!("chrdev: open {}:{} flags {:?}", major, minor, flags);
        Ok(FileSession::new(device, flags))
    }

    /// 按设备号打开
    pub fn open_devno(&self, dev: DevNo, flags: OpenFlags) -> Result<FileSession<'a>, ChrdevError> {
        self.open(major(dev), minor(dev), flags)
    }

    /// 从打开的文件读取
    pub fn read(&self, file: &dyn File, buf: &mut [u8]) -> Result<usize, ChrdevError> {
        file.read(buf)
    }

    /// 向打开的文件写入
    pub fn write(&self, file: &dyn File, buf: &[u8]) -> Result<usize, ChrdevError> {
        file.write(buf)
    }
}
