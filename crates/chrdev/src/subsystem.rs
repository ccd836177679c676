//! 子系统生命周期
//!
//! [`ChrdevSubsystem`] 拥有设备表和控制通道，在启动时一次性构造、
//! 停止时一次性销毁。所有操作都通过对它的引用进行，不存在全局可变状态。

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::ChrdevError;
use crate::control::{ControlChannel, LogTickSink, TickSink};
use crate::dispatcher::OperationDispatcher;
use crate::namespace::NamespaceBinder;
use crate::params::ModuleParams;
use crate::region::{CHRDEV_REGIONS, RegionAllocator};
use crate::registry::DeviceRegistry;

/// 字符设备子系统
pub struct ChrdevSubsystem {
    params: ModuleParams,
    registry: DeviceRegistry,
    control: ControlChannel,
}

impl ChrdevSubsystem {
    /// 启动子系统
    ///
    /// 参数校验失败返回 [`ChrdevError::InvalidArgument`]；
    /// 设备表构造失败时不保留任何状态。
    pub fn init(
        params: ModuleParams,
        allocator: Arc<dyn RegionAllocator>,
        sink: Arc<dyn TickSink>,
    ) -> Result<Self, ChrdevError> {
        log::info!("Sample character driver initialization");
        params.validate()?;

        let registry = DeviceRegistry::create(allocator, params.major, params.num_dev)?;
        let control = ControlChannel::new(sink);

        log::info!(
            "chrdev: {} device(s) ready under major {}",
            registry.len(),
            registry.major()
        );
        Ok(Self {
            params,
            registry,
            control,
        })
    }

    /// 使用全局区间表和日志节拍启动子系统
    pub fn load(params: ModuleParams) -> Result<Self, ChrdevError> {
        Self::init(params, CHRDEV_REGIONS.clone(), Arc::new(LogTickSink))
    }

    /// 启动参数
    pub fn params(&self) -> &ModuleParams {
        &self.params
    }

    /// 分配到的 major
    pub fn major(&self) -> u32 {
        self.registry.major()
    }

    /// 设备表
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// 控制通道
    pub fn control(&self) -> &ControlChannel {
        &self.control
    }

    /// 设备操作表
    pub fn dispatcher(&self) -> OperationDispatcher<'_> {
        OperationDispatcher::new(&self.registry)
    }

    /// 为每个设备创建 `"{prefix}{minor}"` 节点，返回创建的路径
    ///
    /// 中途失败时撤销本次已创建的节点。
    pub fn bind_nodes(
        &self,
        binder: &dyn NamespaceBinder,
        prefix: &str,
    ) -> Result<Vec<String>, ChrdevError> {
        let mut created: Vec<String> = Vec::with_capacity(self.registry.len());
        for device in self.registry.iter() {
            let path = format!("{}{}", prefix, device.minor());
            if let Err(err) = binder.bind(&path, device.devno()) {
                log::warn!("chrdev: failed to bind {}: {}", path, err);
                for path in &created {
                    if let Err(err) = binder.unbind(path.as_str()) {
                        log::warn!("chrdev: rollback of {} failed: {}", path, err);
                    }
                }
                return Err(err);
            }
            created.push(path);
        }
        Ok(created)
    }

    /// 删除 [`bind_nodes`](Self::bind_nodes) 创建的节点
    ///
    /// 某个节点删除失败时继续处理其余节点，最后返回遇到的第一个错误。
    pub fn unbind_nodes(
        &self,
        binder: &dyn NamespaceBinder,
        prefix: &str,
    ) -> Result<(), ChrdevError> {
        let mut first_err = None;
        for device in self.registry.iter() {
            let path = format!("{}{}", prefix, device.minor());
            if let Err(err) = binder.unbind(&path) {
                log::warn!("chrdev: failed to unbind {}: {}", path, err);
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// 停止子系统
    ///
    /// 以值接收 `self`：仍有会话或文件描述符表借用子系统时无法调用。
    pub fn exit(self) {
        let Self { registry, .. } = self;
        registry.destroy();
        log::info!("BYE!!! BYE!!!");
    }
}

impl core::fmt::Debug for ChrdevSubsystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChrdevSubsystem")
            .field("params", &self.params)
            .field("registry", &self.registry)
            .field("control", &self.control.value())
            .finish()
    }
}
