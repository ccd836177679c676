//! 设备表
//!
//! [`DeviceRegistry`] 在子系统启动时一次性创建全部设备，停止时一次性销毁。
//! 表的大小在创建后固定，`devices[i].minor() == i`。

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::ChrdevError;
use crate::device::{DEVICE_BUFFER_SIZE, Device};
use crate::devno::{DevNo, major, minor};
use crate::region::{ChrdevRegion, RegionAllocator};

/// 在区间表中登记的名称
pub const CHRDEV_NAME: &str = "CHAR DEVICE";

/// 同一 major 下的全部设备
pub struct DeviceRegistry {
    // 字段按声明顺序析构：先释放设备，再归还设备号区间
    devices: Vec<Device>,
    region: ChrdevRegion,
}

impl DeviceRegistry {
    /// 创建 `num_dev` 个设备，缓冲区容量为 [`DEVICE_BUFFER_SIZE`]
    pub fn create(
        allocator: Arc<dyn RegionAllocator>,
        major_hint: u32,
        num_dev: u32,
    ) -> Result<Self, ChrdevError> {
        Self::create_with_capacity(allocator, major_hint, num_dev, DEVICE_BUFFER_SIZE)
    }

    /// 创建 `num_dev` 个设备，使用指定的缓冲区容量
    ///
    /// 任一步骤失败时，已分配的设备和已保留的区间都会被释放。
    pub fn create_with_capacity(
        allocator: Arc<dyn RegionAllocator>,
        major_hint: u32,
        num_dev: u32,
        capacity: usize,
    ) -> Result<Self, ChrdevError> {
        Self::create_with(allocator, major_hint, num_dev, |major, minor| {
            Device::new(major, minor, capacity)
        })
    }

    /// 用 `make_device` 逐个构造设备
    fn create_with(
        allocator: Arc<dyn RegionAllocator>,
        major_hint: u32,
        num_dev: u32,
        mut make_device: impl FnMut(u32, u32) -> Result<Device, ChrdevError>,
    ) -> Result<Self, ChrdevError> {
        if num_dev == 0 {
            return Err(ChrdevError::InvalidArgument);
        }

        let region = ChrdevRegion::reserve(allocator, major_hint, num_dev, CHRDEV_NAME)?;
        let major = region.major();
        log::info!("Device major number {} minor number {}", major, 0);

        let mut devices = Vec::new();
        devices
            .try_reserve_exact(num_dev as usize)
            .map_err(|_| ChrdevError::ResourceExhausted)?;

        for minor in 0..num_dev {
            // 失败时 devices 与 region 随之析构，不留下部分构造的设备表
            let device = make_device(major, minor).inspect_err(|err| {
                log::warn!(
                    "chrdev: device {}:{} creation failed after {} devices: {}",
                    major,
                    minor,
                    devices.len(),
                    err
                );
            })?;
            devices.push(device);
        }

        log::debug!("chrdev: {} devices created under major {}", num_dev, major);
        Ok(Self { devices, region })
    }

    /// 分配到的 major
    pub fn major(&self) -> u32 {
        self.region.major()
    }

    /// 设备数量
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// 设备表是否为空（创建成功的设备表永远非空）
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// 按 (major, minor) 查找设备
    pub fn lookup(&self, major: u32, minor: u32) -> Result<&Device, ChrdevError> {
        if major != self.major() {
            return Err(ChrdevError::NoSuchDevice);
        }
        self.devices
            .get(minor as usize)
            .ok_or(ChrdevError::NoSuchDevice)
    }

    /// 按设备号查找设备
    pub fn lookup_devno(&self, dev: DevNo) -> Result<&Device, ChrdevError> {
        self.lookup(major(dev), minor(dev))
    }

    /// 按 minor 顺序遍历所有设备
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// 销毁设备表并归还设备号区间
    ///
    /// 以值接收 `self`：仍有会话借用设备时无法调用。
    pub fn destroy(self) {
        let major = self.major();
        let count = self.len();
        drop(self);
        log::info!("chrdev: destroyed {} devices under major {}", count, major);
    }
}

impl core::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("major", &self.major())
            .field("devices", &self.devices.len())
            .finish()
    }
}
