//! 设备节点命名空间
//!
//! 把文件系统路径映射到设备号，相当于 `mknod` 创建的字符设备节点。
//! 节点只记录设备号：绑定一个未注册的设备号是允许的，
//! 只是随后的 open 会得到 [`ChrdevError::NoSuchDevice`]。

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use sync::SpinLock;

use crate::ChrdevError;
use crate::devno::DevNo;

/// 路径与设备号之间的绑定器
pub trait NamespaceBinder: Send + Sync {
    /// 在 `path` 创建指向 `dev` 的节点
    fn bind(&self, path: &str, dev: DevNo) -> Result<(), ChrdevError>;

    /// 解析 `path` 对应的设备号
    fn resolve(&self, path: &str) -> Result<DevNo, ChrdevError>;

    /// 删除 `path` 处的节点
    fn unbind(&self, path: &str) -> Result<(), ChrdevError>;
}

/// 内存中的节点表
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: SpinLock<BTreeMap<String, DevNo>>,
}

impl NodeTable {
    /// 创建空的节点表
    pub fn new() -> Self {
        Self {
            nodes: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 列出所有节点，按路径排序
    pub fn nodes(&self) -> Vec<(String, DevNo)> {
        self.nodes
            .lock()
            .iter()
            .map(|(path, dev)| (path.clone(), *dev))
            .collect()
    }
}

impl NamespaceBinder for NodeTable {
    fn bind(&self, path: &str, dev: DevNo) -> Result<(), ChrdevError> {
        if path.is_empty() {
            return Err(ChrdevError::InvalidArgument);
        }
        let mut nodes = self.nodes.lock();
        if nodes.contains_key(path) {
            return Err(ChrdevError::AlreadyExists);
        }
        nodes.insert(path.to_string(), dev);
        Ok(())
    }

    fn resolve(&self, path: &str) -> Result<DevNo, ChrdevError> {
        self.nodes
            .lock()
            .get(path)
            .copied()
            .ok_or(ChrdevError::NotFound)
    }

    fn unbind(&self, path: &str) -> Result<(), ChrdevError> {
        self.nodes
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or(ChrdevError::NotFound)
    }
}
