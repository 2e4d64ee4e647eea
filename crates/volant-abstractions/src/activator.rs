//! 组件激活器抽象接口
//!
//! 构造实例与调用方法的底层机制由外部激活器提供，
//! 核心只在接口边界上消费它。

use std::any::Any;
use std::sync::Arc;

use volant_common::{ActivationResult, ComponentDescriptor, InjectionPoint};

/// 被管理组件实例的不透明句柄
pub type ComponentHandle = Arc<dyn Any + Send + Sync>;

/// 组件激活器 trait
///
/// 每个操作都可能以激活错误失败，编排器会附加描述符上下文并视为致命错误。
pub trait ComponentActivator: Send + Sync {
    /// 使用描述符指定的构造方式创建新实例
    fn instantiate(&self, descriptor: &ComponentDescriptor) -> ActivationResult<ComponentHandle>;

    /// 将解析出的值应用到目标实例的注入点上
    fn apply_injection(
        &self,
        descriptor: &ComponentDescriptor,
        target: &ComponentHandle,
        point: &InjectionPoint,
        value: ComponentHandle,
    ) -> ActivationResult<()>;

    /// 调用目标实例上的一个生命周期回调方法
    fn invoke_callback(
        &self,
        descriptor: &ComponentDescriptor,
        target: &ComponentHandle,
        method: &str,
    ) -> ActivationResult<()>;
}
