//! 控制通道节拍输出的 Mock 实现
//!
//! `chrdev` crate 在 `cfg(test)` 下为该类型实现 `TickSink`。

use core::sync::atomic::{AtomicUsize, Ordering};

/// 统计节拍次数的 Mock
pub struct MockTickCounter {
    ticks: AtomicUsize,
}

impl MockTickCounter {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicUsize::new(0),
        }
    }

    /// 记录一次节拍
    pub fn record(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    /// 累计节拍数
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    /// 取出并清零累计节拍数
    pub fn take(&self) -> usize {
        self.ticks.swap(0, Ordering::SeqCst)
    }
}

impl Default for MockTickCounter {
    fn default() -> Self {
        Self::new()
    }
}
