//! 控制通道
//!
//! 一个独立于设备表的可调整数参数，模拟 procfs/sysfs 中的控制文件。
//!
//! - 读：取走计数器的全部值并清零，每个单位发出一个诊断节拍
//! - 写：把文本解析为整数并替换计数器；格式错误的输入被忽略，但仍报告全部字节已消费
//!
//! 状态只有两种：[`ControlState::Active`]（计数器大于 0）和 [`ControlState::Drained`]（等于 0）。

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use sync::SpinLock;

use crate::params::parse_uint;
use crate::{ChrdevError, File, OpenFlags};

/// 计数器默认值
pub const DEFAULT_CONTROL_VALUE: u32 = 1;

/// 控制文件的路径
pub const CONTROL_PATH: &str = "/proc/char_device/dev_proc";

/// 诊断节拍的接收者
pub trait TickSink: Send + Sync {
    /// 发出一次节拍，`index` 为本次读取中的序号（从 0 开始）
    fn tick(&self, index: u32);
}

/// 以日志形式输出节拍
pub struct LogTickSink;

impl TickSink for LogTickSink {
    fn tick(&self, index: u32) {
        log::info!("i = {}", index);
    }
}

#[cfg(test)]
impl TickSink for test_support::mock::control::MockTickCounter {
    fn tick(&self, _index: u32) {
        self.record();
    }
}

/// 控制通道的可观察状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// 计数器大于 0
    Active,
    /// 计数器为 0
    Drained,
}

/// 控制通道
pub struct ControlChannel {
    counter: SpinLock<u32>,
    sink: Arc<dyn TickSink>,
}

impl ControlChannel {
    /// 以默认值创建控制通道
    pub fn new(sink: Arc<dyn TickSink>) -> Self {
        Self::with_value(DEFAULT_CONTROL_VALUE, sink)
    }

    /// 以指定初值创建控制通道
    pub fn with_value(value: u32, sink: Arc<dyn TickSink>) -> Self {
        Self {
            counter: SpinLock::new(value),
            sink,
        }
    }

    /// 当前计数器值
    pub fn value(&self) -> u32 {
        *self.counter.lock()
    }

    /// 当前状态
    pub fn state(&self) -> ControlState {
        if self.value() > 0 {
            ControlState::Active
        } else {
            ControlState::Drained
        }
    }

    /// 以文本形式展示当前值（末尾带换行）
    pub fn show(&self) -> String {
        format!("{}\n", self.value())
    }

    /// 耗尽计数器，返回发出的节拍数
    ///
    /// 计数器在一次加锁中被整体取走并清零，节拍在锁外发出。
    /// 读取期间的并发写入只影响之后的读取，单次读取至多发出取走时的值。
    pub fn read(&self) -> usize {
        log::info!("PROC READ FILE");
        let drained = core::mem::take(&mut *self.counter.lock());
        for index in 0..drained {
            self.sink.tick(index);
        }
        drained as usize
    }

    /// 写入新的计数器值，返回消费的字节数（总是全部输入）
    ///
    /// 无法解析的输入被忽略，计数器保持不变。
    pub fn write(&self, text: &[u8]) -> usize {
        log::info!("PROC WRITE FILE");
        match parse_uint(text) {
            Ok(value) => *self.counter.lock() = value,
            Err(_) => log::warn!("chrdev: ignoring malformed control value {:?}", text),
        }
        text.len()
    }

    /// 打开控制文件
    pub fn open(&self, flags: OpenFlags) -> ControlFile<'_> {
        ControlFile {
            channel: self,
            flags,
        }
    }
}

impl Default for ControlChannel {
    fn default() -> Self {
        Self::new(Arc::new(LogTickSink))
    }
}

/// 打开的控制文件
pub struct ControlFile<'a> {
    channel: &'a ControlChannel,
    flags: OpenFlags,
}

impl File for ControlFile<'_> {
    fn readable(&self) -> bool {
        self.flags.readable()
    }

    fn writable(&self) -> bool {
        self.flags.writable()
    }

    /// 耗尽计数器并返回 0 字节（文件结尾）
    fn read(&self, _buf: &mut [u8]) -> Result<usize, ChrdevError> {
        if !self.readable() {
            return Err(ChrdevError::PermissionDenied);
        }
        self.channel.read();
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, ChrdevError> {
        if !self.writable() {
            return Err(ChrdevError::PermissionDenied);
        }
        Ok(self.channel.write(buf))
    }

    fn flags(&self) -> OpenFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::vec::Vec;
    use test_support::mock::control::MockTickCounter;

    fn channel(value: u32) -> (ControlChannel, Arc<MockTickCounter>) {
        let counter = Arc::new(MockTickCounter::new());
        (ControlChannel::with_value(value, counter.clone()), counter)
    }

    #[test]
    fn test_default_value() {
        let chan = ControlChannel::default();
        assert_eq!(chan.value(), 1);
        assert_eq!(chan.show(), "1\n");
        assert_eq!(chan.state(), ControlState::Active);
    }

    #[test]
    fn test_read_drains_and_stays_drained() {
        let (chan, ticks) = channel(5);
        assert_eq!(chan.read(), 5);
        assert_eq!(ticks.take(), 5);
        assert_eq!(chan.state(), ControlState::Drained);
        assert_eq!(chan.read(), 0);
        assert_eq!(chan.read(), 0);
        assert_eq!(chan.read(), 0);
        assert_eq!(ticks.ticks(), 0);
    }

    #[test]
    fn test_write_replaces_value() {
        let (chan, _) = channel(9);
        assert_eq!(chan.write(b"3"), 1);
        assert_eq!(chan.value(), 3);

        chan.read();
        assert_eq!(chan.state(), ControlState::Drained);
        assert_eq!(chan.write(b"3\n"), 2);
        assert_eq!(chan.value(), 3);
        assert_eq!(chan.state(), ControlState::Active);
    }

    #[test]
    fn test_write_zero_moves_to_drained() {
        let (chan, _) = channel(4);
        chan.write(b"0");
        assert_eq!(chan.state(), ControlState::Drained);
    }

    #[test]
    fn test_malformed_write_is_ignored() {
        let (chan, _) = channel(7);
        assert_eq!(chan.write(b"seven"), 5);
        assert_eq!(chan.value(), 7);
        assert_eq!(chan.write(b"-2"), 2);
        assert_eq!(chan.value(), 7);
    }

    #[test]
    fn test_control_file_access() {
        let (chan, ticks) = channel(2);
        let file = chan.open(OpenFlags::O_RDWR);
        let mut buf = [0u8; 8];
        assert_eq!(file.read(&mut buf), Ok(0));
        assert_eq!(ticks.take(), 2);
        assert_eq!(file.write(b"0x10"), Ok(4));
        assert_eq!(chan.value(), 16);

        let ro = chan.open(OpenFlags::O_RDONLY);
        assert_eq!(ro.write(b"1"), Err(ChrdevError::PermissionDenied));
    }

    #[test]
    fn test_concurrent_reads_emit_exact_total() {
        let (chan, ticks) = channel(10_000);
        let total: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| chan.read())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(total, 10_000);
        assert_eq!(ticks.ticks(), 10_000);
        assert_eq!(chan.value(), 0);
    }

    #[test]
    fn test_read_bounded_by_counter_under_concurrent_writes() {
        let (chan, ticks) = channel(10);
        let stop = AtomicBool::new(false);
        let emitted = thread::scope(|s| {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    chan.write(b"10");
                }
            });
            let emitted = chan.read();
            stop.store(true, Ordering::Relaxed);
            emitted
        });
        assert_eq!(emitted, 10);
        assert_eq!(ticks.take(), 10);
    }
}
