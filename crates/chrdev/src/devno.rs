//! 设备号编码
//!
//! 设备号 (`DevNo`) 与 Linux 内核内部的 `dev_t` 布局一致：
//! 高位为 major，低 [`MINORBITS`] 位为 minor。

/// 设备号
pub type DevNo = u64;

/// minor 号占用的位数
pub const MINORBITS: u32 = 20;

/// minor 号掩码
pub const MINORMASK: u32 = (1 << MINORBITS) - 1;

/// 由 major 和 minor 组合设备号
#[inline]
pub const fn makedev(major: u32, minor: u32) -> DevNo {
    ((major as u64) << MINORBITS) | (minor & MINORMASK) as u64
}

/// 从设备号中提取 major
#[inline]
pub const fn major(dev: DevNo) -> u32 {
    (dev >> MINORBITS) as u32
}

/// 从设备号中提取 minor
#[inline]
pub const fn minor(dev: DevNo) -> u32 {
    (dev as u32) & MINORMASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_makedev_major_minor() {
        let dev = makedev(240, 3);
        assert_eq!(major(dev), 240);
        assert_eq!(minor(dev), 3);
    }

    #[test]
    fn test_minor_is_masked() {
        let dev = makedev(1, MINORMASK + 1);
        assert_eq!(major(dev), 1);
        assert_eq!(minor(dev), 0);
    }

    #[test]
    fn test_devno_unique() {
        assert_ne!(makedev(1, 0), makedev(1, 1));
        assert_ne!(makedev(1, 0), makedev(2, 0));
    }

    #[test]
    fn test_major_minor_extraction_boundaries() {
        let dev = makedev(511, 0);
        assert_eq!(major(dev), 511);
        assert_eq!(minor(dev), 0);

        let dev = makedev(0, MINORMASK);
        assert_eq!(major(dev), 0);
        assert_eq!(minor(dev), MINORMASK);
    }
}
