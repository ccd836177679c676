//! 设备号区间分配
//!
//! 对应内核 `alloc_chrdev_region` / `register_chrdev_region` 的简化实现：
//! 每个 major 至多登记一个从 minor 0 开始的连续区间。
//!
//! - [`RegionAllocator`] - 分配器接口，子系统只依赖该 trait
//! - [`RegionTable`] - 内存中的区间表实现
//! - [`CHRDEV_REGIONS`] - 进程级的全局区间表
//! - [`ChrdevRegion`] - 已保留区间的 RAII 句柄，析构时自动归还

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use lazy_static::lazy_static;
use sync::SpinLock;

use crate::ChrdevError;
use crate::devno::MINORMASK;

/// 字符设备 major 号上限（不含）
pub const CHRDEV_MAJOR_MAX: u32 = 512;

/// 动态 major 的主扫描区间：254 向下到 234
const CHRDEV_MAJOR_DYN_START: u32 = 254;
const CHRDEV_MAJOR_DYN_END: u32 = 234;

/// 动态 major 的扩展扫描区间：511 向下到 384
const CHRDEV_MAJOR_DYN_EXT_START: u32 = 511;
const CHRDEV_MAJOR_DYN_EXT_END: u32 = 384;

/// 设备号区间分配器
///
/// 在子系统启动时调用一次 [`reserve`](RegionAllocator::reserve)，
/// 停止时调用一次 [`release`](RegionAllocator::release)。
pub trait RegionAllocator: Send + Sync {
    /// 在 `major_hint` 下保留 `count` 个连续 minor（从 0 开始）
    ///
    /// `major_hint == 0` 表示由分配器挑选一个空闲的 major。
    /// 返回实际分配的 major。
    fn reserve(&self, major_hint: u32, count: u32, name: &str) -> Result<u32, ChrdevError>;

    /// 归还先前保留的区间
    fn release(&self, major: u32, count: u32);
}

/// 已登记的区间
#[derive(Debug, Clone)]
struct Region {
    count: u32,
    name: String,
}

/// 内存中的设备号区间表
#[derive(Debug, Default)]
pub struct RegionTable {
    regions: SpinLock<BTreeMap<u32, Region>>,
}

impl RegionTable {
    /// 创建空的区间表
    pub fn new() -> Self {
        Self {
            regions: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 列出所有已登记的 (major, name)，按 major 升序
    pub fn regions(&self) -> Vec<(u32, String)> {
        self.regions
            .lock()
            .iter()
            .map(|(major, region)| (*major, region.name.clone()))
            .collect()
    }

    /// 查询某个 major 是否已被占用
    pub fn is_reserved(&self, major: u32) -> bool {
        self.regions.lock().contains_key(&major)
    }

    fn find_dynamic_major(regions: &BTreeMap<u32, Region>) -> Option<u32> {
        (CHRDEV_MAJOR_DYN_END..=CHRDEV_MAJOR_DYN_START)
            .rev()
            .chain((CHRDEV_MAJOR_DYN_EXT_END..=CHRDEV_MAJOR_DYN_EXT_START).rev())
            .find(|major| !regions.contains_key(major))
    }
}

impl RegionAllocator for RegionTable {
    fn reserve(&self, major_hint: u32, count: u32, name: &str) -> Result<u32, ChrdevError> {
        if count == 0 || count > MINORMASK + 1 {
            log::warn!("chrdev: invalid minor count {} for {}", count, name);
            return Err(ChrdevError::Registration);
        }
        if major_hint >= CHRDEV_MAJOR_MAX {
            log::warn!(
                "chrdev: major {} for {} exceeds maximum {}",
                major_hint,
                name,
                CHRDEV_MAJOR_MAX - 1
            );
            return Err(ChrdevError::Registration);
        }

        let mut regions = self.regions.lock();
        let major = if major_hint == 0 {
            Self::find_dynamic_major(&regions).ok_or_else(|| {
                log::warn!("chrdev: no dynamic major left for {}", name);
                ChrdevError::Registration
            })?
        } else {
            major_hint
        };

        // 所有区间都从 minor 0 开始，同一 major 上的任何已有区间都与新区间重叠
        if let Some(existing) = regions.get(&major) {
            log::warn!(
                "chrdev: major {} already registered by {}",
                major,
                existing.name
            );
            return Err(ChrdevError::Registration);
        }

        regions.insert(
            major,
            Region {
                count,
                name: name.to_string(),
            },
        );
        Ok(major)
    }

    fn release(&self, major: u32, count: u32) {
        let mut regions = self.regions.lock();
        match regions.get(&major) {
            Some(region) if region.count == count => {
                regions.remove(&major);
            }
            Some(region) => log::warn!(
                "chrdev: release of major {} with count {} does not match registered count {}",
                major,
                count,
                region.count
            ),
            None => log::warn!("chrdev: release of unregistered major {}", major),
        }
    }
}

lazy_static! {
    /// 全局设备号区间表
    ///
    /// 充当内核 `chrdevs` 表的角色；同一进程内的多个子系统实例共享它。
    pub static ref CHRDEV_REGIONS: Arc<RegionTable> = Arc::new(RegionTable::new());
}

/// 已保留的设备号区间
///
/// 析构时将区间归还给分配器。
pub struct ChrdevRegion {
    allocator: Arc<dyn RegionAllocator>,
    major: u32,
    count: u32,
}

impl ChrdevRegion {
    /// 通过分配器保留区间
    pub fn reserve(
        allocator: Arc<dyn RegionAllocator>,
        major_hint: u32,
        count: u32,
        name: &str,
    ) -> Result<Self, ChrdevError> {
        let major = allocator.reserve(major_hint, count, name).inspect_err(|_| {
            log::error!("Char device registration failed");
        })?;
        Ok(Self {
            allocator,
            major,
            count,
        })
    }

    /// 分配到的 major
    pub fn major(&self) -> u32 {
        self.major
    }

    /// 区间内的 minor 数量
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Drop for ChrdevRegion {
    fn drop(&mut self) {
        self.allocator.release(self.major, self.count);
        log::debug!(
            "chrdev: released region major {} count {}",
            self.major,
            self.count
        );
    }
}

#[cfg(test)]
impl RegionAllocator for test_support::mock::region::MockRegionAllocator {
    fn reserve(&self, major_hint: u32, count: u32, _name: &str) -> Result<u32, ChrdevError> {
        self.try_reserve(major_hint, count)
            .ok_or(ChrdevError::Registration)
    }

    fn release(&self, major: u32, count: u32) {
        self.record_release(major, count);
    }
}
