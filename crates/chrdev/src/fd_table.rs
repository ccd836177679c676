//! 文件描述符表
//!
//! 约定与语义（与用户态常见预期保持一致）：
//!
//! - `alloc()` 分配“最小可用 fd”
//! - `close()` 丢弃对应的文件对象；设备会话随之结束
//! - 表中的文件借用子系统，因此表不会比子系统活得更久

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use sync::SpinLock;

use crate::{ChrdevError, File};

/// 默认最大文件描述符数
pub const DEFAULT_MAX_FDS: usize = 1024;

/// 文件描述符表
pub struct FdTable<'a> {
    /// 文件描述符数组
    files: SpinLock<Vec<Option<Arc<dyn File + 'a>>>>,
    /// 最大文件描述符数量
    max_fds: usize,
}

impl fmt::Debug for FdTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let files = self.files.lock();
        let used = files.iter().filter(|slot| slot.is_some()).count();
        f.debug_struct("FdTable")
            .field("max_fds", &self.max_fds)
            .field("slots", &files.len())
            .field("used", &used)
            .finish()
    }
}

impl<'a> FdTable<'a> {
    /// 创建新的文件描述符表
    pub fn new() -> Self {
        Self::with_max_fds(DEFAULT_MAX_FDS)
    }

    /// 创建指定容量上限的文件描述符表
    pub fn with_max_fds(max_fds: usize) -> Self {
        Self {
            files: SpinLock::new(Vec::new()),
            max_fds,
        }
    }

    /// 分配一个新的文件描述符
    pub fn alloc(&self, file: Arc<dyn File + 'a>) -> Result<usize, ChrdevError> {
        let mut files = self.files.lock();

        // 查找最小可用 FD
        for (fd, slot) in files.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(file);
                return Ok(fd);
            }
        }

        // 如果没有空闲槽位，扩展数组
        let fd = files.len();
        if fd >= self.max_fds {
            return Err(ChrdevError::TooManyOpenFiles);
        }

        files.push(Some(file));
        Ok(fd)
    }

    /// 获取文件对象
    pub fn get(&self, fd: usize) -> Result<Arc<dyn File + 'a>, ChrdevError> {
        let files = self.files.lock();
        files
            .get(fd)
            .and_then(|f| f.clone())
            .ok_or(ChrdevError::BadFileDescriptor)
    }

    /// 关闭文件描述符
    pub fn close(&self, fd: usize) -> Result<(), ChrdevError> {
        let mut files = self.files.lock();
        match files.get_mut(fd) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                Ok(())
            }
            _ => Err(ChrdevError::BadFileDescriptor),
        }
    }

    /// 取走并清空所有已打开的文件描述符
    pub fn take_all(&self) -> Vec<(usize, Arc<dyn File + 'a>)> {
        let mut files = self.files.lock();
        files
            .iter_mut()
            .enumerate()
            .filter_map(|(fd, slot)| slot.take().map(|file| (fd, file)))
            .collect()
    }

    /// 已打开的文件描述符数量
    pub fn open_count(&self) -> usize {
        self.files.lock().iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for FdTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpenFlags;
    use crate::control::ControlChannel;

    #[test]
    fn test_lowest_free_fd_reused() {
        let chan = ControlChannel::default();
        let table = FdTable::new();
        let a = table.alloc(Arc::new(chan.open(OpenFlags::O_RDWR))).unwrap();
        let b = table.alloc(Arc::new(chan.open(OpenFlags::O_RDWR))).unwrap();
        assert_eq!((a, b), (0, 1));
        table.close(0).unwrap();
        assert_eq!(table.alloc(Arc::new(chan.open(OpenFlags::O_RDWR))), Ok(0));
        assert_eq!(table.open_count(), 2);
    }

    #[test]
    fn test_bad_fd() {
        let table = FdTable::new();
        assert!(table.get(0).is_err());
        assert_eq!(table.close(3), Err(ChrdevError::BadFileDescriptor));
    }

    #[test]
    fn test_double_close() {
        let chan = ControlChannel::default();
        let table = FdTable::new();
        let fd = table.alloc(Arc::new(chan.open(OpenFlags::O_RDONLY))).unwrap();
        assert_eq!(table.close(fd), Ok(()));
        assert_eq!(table.close(fd), Err(ChrdevError::BadFileDescriptor));
    }

    #[test]
    fn test_max_fds_limit() {
        let chan = ControlChannel::default();
        let table = FdTable::with_max_fds(1);
        table.alloc(Arc::new(chan.open(OpenFlags::O_RDONLY))).unwrap();
        assert_eq!(
            table.alloc(Arc::new(chan.open(OpenFlags::O_RDONLY))),
            Err(ChrdevError::TooManyOpenFiles)
        );
    }

    #[test]
    fn test_take_all() {
        let chan = ControlChannel::default();
        let table = FdTable::new();
        table.alloc(Arc::new(chan.open(OpenFlags::O_RDONLY))).unwrap();
        table.alloc(Arc::new(chan.open(OpenFlags::O_RDONLY))).unwrap();
        table.close(0).unwrap();
        let taken = table.take_all();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].0, 1);
        assert_eq!(table.open_count(), 0);
    }
}
