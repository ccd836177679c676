//! 多实例字符设备子系统
//!
//! 此 crate 在同一个 major 下注册一组可寻址的字符设备，
//! 通过统一的操作表分发 open/read/write，并提供一个独立的控制通道：
//!
//! - [`DeviceRegistry`] - 设备表，按 minor 索引
//! - [`OperationDispatcher`] - {open, read, write} 操作表
//! - [`FileSession`] - open 产生的会话，绑定到唯一设备
//! - [`ControlChannel`] - 可调整数参数，模拟 procfs 控制文件
//! - [`ChrdevSubsystem`] - 启动/停止的生命周期
//!
//! # 外部协作者
//!
//! 通过 trait 抽象与外部组件解耦：
//! - [`RegionAllocator`]: 设备号区间分配
//! - [`NamespaceBinder`]: 路径到设备号的映射
//! - [`TickSink`]: 控制通道诊断节拍的输出
//!
//! # 并发
//!
//! 每个设备的缓冲区各有一把锁，控制通道计数器也有自己的锁，
//! 不存在覆盖所有设备的全局锁。

#![no_std]

extern crate alloc;

pub mod client;
pub mod control;
pub mod device;
pub mod devno;
pub mod dispatcher;
pub mod error;
pub mod fd_table;
pub mod file;
pub mod flags;
pub mod namespace;
pub mod params;
pub mod region;
pub mod registry;
pub mod session;
pub mod subsystem;

// Re-export error
pub use error::ChrdevError;

// Re-export flags
pub use flags::OpenFlags;

// Re-export file
pub use file::File;

// Re-export devno
pub use devno::{DevNo, major, makedev, minor};

// Re-export device / registry
pub use device::{DEFAULT_PAYLOAD, DEVICE_BUFFER_SIZE, Device};
pub use registry::{CHRDEV_NAME, DeviceRegistry};

// Re-export region
pub use region::{CHRDEV_REGIONS, ChrdevRegion, RegionAllocator, RegionTable};

// Re-export dispatch
pub use dispatcher::OperationDispatcher;
pub use session::FileSession;

// Re-export control
pub use control::{
    CONTROL_PATH, ControlChannel, ControlFile, ControlState, DEFAULT_CONTROL_VALUE, LogTickSink,
    TickSink,
};

// Re-export namespace
pub use namespace::{NamespaceBinder, NodeTable};

// Re-export fd_table
pub use fd_table::{DEFAULT_MAX_FDS, FdTable};

// Re-export params
pub use params::{DEFAULT_NUM_DEV, ModuleParams, parse_uint};

// Re-export subsystem
pub use client::Client;
pub use subsystem::ChrdevSubsystem;
