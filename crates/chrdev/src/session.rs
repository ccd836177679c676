//! 设备会话
//!
//! 一次成功的 open 产生一个 [`FileSession`]，它在打开时绑定到唯一的 [`Device`]，
//! 之后的每次读写都直接作用于该设备，不再重新解析路径或设备号。

use crate::device::Device;
use crate::devno::DevNo;
use crate::{ChrdevError, File, OpenFlags};

/// 打开的设备文件
///
/// 借用而非拥有设备：借用检查保证会话不会比设备表活得更久。
/// 多个会话可以同时绑定到同一个设备。
#[derive(Debug, Clone)]
pub struct FileSession<'a> {
    device: &'a Device,
    flags: OpenFlags,
}

impl<'a> FileSession<'a> {
    pub(crate) fn new(device: &'a Device, flags: OpenFlags) -> Self {
        Self { device, flags }
    }

    /// 绑定的设备
    pub fn device(&self) -> &'a Device {
        self.device
    }
}

impl File for FileSession<'_> {
    fn readable(&self) -> bool {
        self.flags.readable()
    }

    fn writable(&self) -> bool {
        self.flags.writable()
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, ChrdevError> {
        if !self.readable() {
            return Err(ChrdevError::PermissionDenied);
        }
        let n = self.device.read(buf);
        log::debug!(
            "chrdev: read {} of {} bytes from minor {}",
            n,
            buf.len(),
            self.device.minor()
        );
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, ChrdevError> {
        if !self.writable() {
            return Err(ChrdevError::PermissionDenied);
        }
        let n = self.device.write(buf).inspect_err(|_| {
            log::warn!(
                "chrdev: write of {} bytes to minor {} exceeds capacity {}",
                buf.len(),
                self.device.minor(),
                self.device.capacity()
            );
        })?;
        log::debug!(
            "chrdev: wrote {} bytes to minor {}",
            n,
            self.device.minor()
        );
        Ok(n)
    }

    fn flags(&self) -> OpenFlags {
        self.flags
    }

    fn devno(&self) -> Option<DevNo> {
        Some(self.device.devno())
    }
}
