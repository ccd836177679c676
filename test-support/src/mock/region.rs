//! 设备号区间分配器的 Mock 实现
//!
//! 注意：这里不直接依赖 `chrdev` crate（避免循环依赖）。
//! `chrdev` crate 在 `cfg(test)` 下为该类型实现 `RegionAllocator`。

use core::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering};

const NO_RELEASE: u64 = u64::MAX;

/// Mock 的区间分配器
///
/// 总是返回构造时给定的 major（除非请求了显式 major），
/// 并记录保留/归还的调用次数。
pub struct MockRegionAllocator {
    dynamic_major: AtomicU32,
    fail: AtomicBool,
    reserve_calls: AtomicUsize,
    release_calls: AtomicUsize,
    outstanding: AtomicI64,
    last_release: AtomicU64,
}

impl MockRegionAllocator {
    pub const fn new(dynamic_major: u32) -> Self {
        Self {
            dynamic_major: AtomicU32::new(dynamic_major),
            fail: AtomicBool::new(false),
            reserve_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
            outstanding: AtomicI64::new(0),
            last_release: AtomicU64::new(NO_RELEASE),
        }
    }

    /// 设置后续的保留请求是否失败
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// 尝试保留区间，失败时返回 None
    pub fn try_reserve(&self, major_hint: u32, _count: u32) -> Option<u32> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return None;
        }
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        if major_hint == 0 {
            Some(self.dynamic_major.load(Ordering::SeqCst))
        } else {
            Some(major_hint)
        }
    }

    /// 记录一次归还
    pub fn record_release(&self, major: u32, count: u32) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.last_release
            .store(((major as u64) << 32) | count as u64, Ordering::SeqCst);
    }

    pub fn reserve_calls(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    /// 尚未归还的区间数
    pub fn outstanding(&self) -> i64 {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// 最近一次归还的 (major, count)
    pub fn last_release(&self) -> Option<(u32, u32)> {
        match self.last_release.load(Ordering::SeqCst) {
            NO_RELEASE => None,
            packed => Some(((packed >> 32) as u32, packed as u32)),
        }
    }
}
