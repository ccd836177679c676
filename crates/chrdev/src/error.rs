//! 子系统错误类型
//!
//! 定义了 chrdev 子系统的错误分类，可通过 [`ChrdevError::to_errno()`] 转换为 POSIX 错误码。

use core::fmt;

/// chrdev 错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChrdevError {
    // 启动阶段
    /// 设备号区间无法保留 (-EBUSY)
    Registration,
    /// 缓冲区或设备表分配失败 (-ENOMEM)
    ResourceExhausted,

    // 单次操作
    /// major/minor 无法解析到设备 (-ENODEV)
    NoSuchDevice,
    /// 写入长度超过缓冲区容量 (-EFBIG)
    BufferOverflow,
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 打开模式不允许该操作 (-EACCES)
    PermissionDenied,

    // 文件描述符相关
    /// 无效的文件描述符 (-EBADF)
    BadFileDescriptor,
    /// 打开的文件过多 (-EMFILE)
    TooManyOpenFiles,

    // 节点命名空间相关
    /// 路径不存在 (-ENOENT)
    NotFound,
    /// 路径已存在 (-EEXIST)
    AlreadyExists,
}

impl ChrdevError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            ChrdevError::NotFound => -2,
            ChrdevError::BadFileDescriptor => -9,
            ChrdevError::ResourceExhausted => -12,
            ChrdevError::PermissionDenied => -13,
            ChrdevError::Registration => -16,
            ChrdevError::AlreadyExists => -17,
            ChrdevError::NoSuchDevice => -19,
            ChrdevError::InvalidArgument => -22,
            ChrdevError::TooManyOpenFiles => -24,
            ChrdevError::BufferOverflow => -27,
        }
    }
}

impl fmt::Display for ChrdevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ChrdevError::Registration => "char device region registration failed",
            ChrdevError::ResourceExhausted => "out of memory",
            ChrdevError::NoSuchDevice => "no such device",
            ChrdevError::BufferOverflow => "write exceeds device buffer capacity",
            ChrdevError::InvalidArgument => "invalid argument",
            ChrdevError::PermissionDenied => "permission denied",
            ChrdevError::BadFileDescriptor => "bad file descriptor",
            ChrdevError::TooManyOpenFiles => "too many open files",
            ChrdevError::NotFound => "no such file or directory",
            ChrdevError::AlreadyExists => "file exists",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

impl core::error::Error for ChrdevError {}
