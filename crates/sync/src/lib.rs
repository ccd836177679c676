//! 同步原语
//!
//! 向 chrdev 子系统提供基本的锁原语。
//!
//! 每个设备缓冲区、控制通道计数器、设备号区间表、节点表和文件描述符表
//! 各自持有一把 [`SpinLock`]，互不共享。
//!
//! # 锁顺序
//!
//! 同一条执行路径上不会嵌套获取两把设备锁；唯一的嵌套是
//! `FdTable` 锁内克隆出文件对象后立即释放，再去获取设备锁。

#![no_std]

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::*;
pub use spin_lock::*;
