//! 单个字符设备
//!
//! 每个 [`Device`] 拥有一块固定容量的私有缓冲区，由自己的 [`SpinLock`] 保护，
//! 不同设备之间没有共享锁。

use alloc::vec::Vec;
use sync::SpinLock;

use crate::ChrdevError;
use crate::devno::{DevNo, makedev};

/// 默认缓冲区容量（字节）
pub const DEVICE_BUFFER_SIZE: usize = 128;

/// 设备创建时写入缓冲区的默认内容
pub const DEFAULT_PAYLOAD: &[u8] = b"Default string\n";

/// 设备缓冲区
///
/// `data.len()` 即逻辑长度，始终不超过 `capacity`。
struct DeviceBuffer {
    data: Vec<u8>,
    capacity: usize,
}

/// 可寻址的字符设备
pub struct Device {
    /// 设备号（minor 在创建后不可变）
    devno: DevNo,
    minor: u32,
    buffer: SpinLock<DeviceBuffer>,
}

impl Device {
    /// 创建设备并写入默认内容（超出容量的部分被截断）
    ///
    /// 缓冲区分配失败时返回 [`ChrdevError::ResourceExhausted`]。
    pub(crate) fn new(major: u32, minor: u32, capacity: usize) -> Result<Self, ChrdevError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity).map_err(|_| {
            log::error!(
                "chrdev: failed to allocate {} byte buffer for minor {}",
                capacity,
                minor
            );
            ChrdevError::ResourceExhausted
        })?;

        let init_len = DEFAULT_PAYLOAD.len().min(capacity);
        data.extend_from_slice(&DEFAULT_PAYLOAD[..init_len]);

        Ok(Self {
            devno: makedev(major, minor),
            minor,
            buffer: SpinLock::new(DeviceBuffer { data, capacity }),
        })
    }

    /// 设备号
    pub fn devno(&self) -> DevNo {
        self.devno
    }

    /// minor 号
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// 缓冲区容量
    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity
    }

    /// 缓冲区当前逻辑长度
    pub fn len(&self) -> usize {
        self.buffer.lock().data.len()
    }

    /// 缓冲区是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 从缓冲区开头复制 `min(buf.len(), len)` 字节，不消费内容
    pub fn read(&self, buf: &mut [u8]) -> usize {
        let buffer = self.buffer.lock();
        let n = buf.len().min(buffer.data.len());
        buf[..n].copy_from_slice(&buffer.data[..n]);
        n
    }

    /// 用 `buf` 替换缓冲区内容
    ///
    /// 超过容量的写入被整体拒绝，缓冲区保持不变。
    pub fn write(&self, buf: &[u8]) -> Result<usize, ChrdevError> {
        let mut buffer = self.buffer.lock();
        if buf.len() > buffer.capacity {
            return Err(ChrdevError::BufferOverflow);
        }
        // 容量已预留，不会触发重新分配
        buffer.data.clear();
        buffer.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// 获取缓冲区内容的副本（用于调试）
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.lock().data.clone()
    }
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("devno", &self.devno)
            .field("minor", &self.minor)
            .field("len", &self.len())
            .finish()
    }
}
