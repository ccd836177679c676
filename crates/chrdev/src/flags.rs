//! 打开标志位

use bitflags::bitflags;

bitflags! {
    /// open 系统调用的标志位（取值与 Linux 一致）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// 只读
        const O_RDONLY = 0o0;
        /// 只写
        const O_WRONLY = 0o1;
        /// 读写
        const O_RDWR = 0o2;
        /// 非阻塞
        const O_NONBLOCK = 0o4000;
        /// exec 时关闭
        const O_CLOEXEC = 0o2000000;
    }
}

impl OpenFlags {
    const ACCMODE: u32 = 0o3;

    /// 是否允许读
    pub fn readable(&self) -> bool {
        let mode = self.bits() & Self::ACCMODE;
        mode == Self::O_RDONLY.bits() || mode == Self::O_RDWR.bits()
    }

    /// 是否允许写
    pub fn writable(&self) -> bool {
        let mode = self.bits() & Self::ACCMODE;
        mode == Self::O_WRONLY.bits() || mode == Self::O_RDWR.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_modes() {
        assert!(OpenFlags::O_RDONLY.readable());
        assert!(!OpenFlags::O_RDONLY.writable());
        assert!(!OpenFlags::O_WRONLY.readable());
        assert!(OpenFlags::O_WRONLY.writable());
        assert!(OpenFlags::O_RDWR.readable());
        assert!(OpenFlags::O_RDWR.writable());
    }

    #[test]
    fn test_extra_bits_do_not_change_access_mode() {
        let flags = OpenFlags::O_RDWR | OpenFlags::O_CLOEXEC | OpenFlags::O_NONBLOCK;
        assert!(flags.readable());
        assert!(flags.writable());
        assert!(!(OpenFlags::O_WRONLY | OpenFlags::O_NONBLOCK).readable());
    }
}
