//! 回调式组件激活器
//!
//! 在没有运行时反射的前提下，构造实例与调用方法的机制由组件作者
//! 以闭包形式按标识登记为"蓝图"。激活器按描述符查蓝图、按方法名
//! 查闭包，向编排器提供统一的激活接口。

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;
use volant_abstractions::{ComponentActivator, ComponentHandle};
use volant_common::{
    ActivationError, ActivationResult, ComponentDescriptor, ComponentIdentity, InjectionPoint,
};

/// 构造闭包类型
pub type ConstructorFn = Box<dyn Fn() -> ActivationResult<ComponentHandle> + Send + Sync>;
/// 注入闭包类型，参数为目标实例与解析出的值
pub type SetterFn =
    Box<dyn Fn(&ComponentHandle, ComponentHandle) -> ActivationResult<()> + Send + Sync>;
/// 回调闭包类型
pub type CallbackFn = Box<dyn Fn(&ComponentHandle) -> ActivationResult<()> + Send + Sync>;

/// 组件蓝图
///
/// 一个组件标识对应的构造、注入与回调闭包集合。
pub struct ComponentBlueprint {
    identity: ComponentIdentity,
    constructor: Option<ConstructorFn>,
    setters: HashMap<String, SetterFn>,
    callbacks: HashMap<String, CallbackFn>,
}

impl ComponentBlueprint {
    /// 创建新的组件蓝图
    pub fn new(identity: impl Into<ComponentIdentity>) -> Self {
        Self {
            identity: identity.into(),
            constructor: None,
            setters: HashMap::new(),
            callbacks: HashMap::new(),
        }
    }

    /// 登记无参构造闭包
    pub fn with_constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(move || {
            Ok(Arc::new(constructor()) as ComponentHandle)
        }));
        self
    }

    /// 登记注入闭包
    ///
    /// 目标实例与值都会先向下转型到声明的具体类型，转型失败报注入错误。
    pub fn with_setter<T, V, F>(mut self, method: impl Into<String>, setter: F) -> Self
    where
        T: Send + Sync + 'static,
        V: Send + Sync + 'static,
        F: Fn(&T, Arc<V>) -> ActivationResult<()> + Send + Sync + 'static,
    {
        let method = method.into();
        let identity = self.identity.clone();
        let method_name = method.clone();
        self.setters.insert(
            method,
            Box::new(move |target, value| {
                let target = target.downcast_ref::<T>().ok_or_else(|| {
                    ActivationError::injection(
                        identity.as_str(),
                        &method_name,
                        "目标实例类型转换失败",
                    )
                })?;
                let value = value.downcast::<V>().map_err(|_| {
                    ActivationError::injection(identity.as_str(), &method_name, "注入值类型转换失败")
                })?;
                setter(target, value)
            }),
        );
        self
    }

    /// 登记生命周期回调闭包
    pub fn with_callback<T, F>(mut self, method: impl Into<String>, callback: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T) -> ActivationResult<()> + Send + Sync + 'static,
    {
        let method = method.into();
        let identity = self.identity.clone();
        let method_name = method.clone();
        self.callbacks.insert(
            method,
            Box::new(move |target| {
                let target = target.downcast_ref::<T>().ok_or_else(|| {
                    ActivationError::callback(
                        identity.as_str(),
                        &method_name,
                        "目标实例类型转换失败",
                    )
                })?;
                callback(target)
            }),
        );
        self
    }
}

impl std::fmt::Debug for ComponentBlueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBlueprint")
            .field("identity", &self.identity)
            .field("has_constructor", &self.constructor.is_some())
            .field("setters", &self.setters.keys().collect::<Vec<_>>())
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 回调式激活器
#[derive(Debug, Default)]
pub struct CallbackActivator {
    blueprints: DashMap<ComponentIdentity, ComponentBlueprint>,
}

impl CallbackActivator {
    /// 创建空激活器
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记组件蓝图，同标识蓝图后写覆盖先写
    pub fn with_blueprint(self, blueprint: ComponentBlueprint) -> Self {
        self.blueprints.insert(blueprint.identity.clone(), blueprint);
        self
    }
}

impl ComponentActivator for CallbackActivator {
    fn instantiate(&self, descriptor: &ComponentDescriptor) -> ActivationResult<ComponentHandle> {
        trace!("实例化组件: {}", descriptor.identity);
        let blueprint = self.blueprints.get(&descriptor.identity).ok_or_else(|| {
            ActivationError::instantiation(descriptor.identity.as_str(), "未登记组件蓝图")
        })?;
        let constructor = blueprint.constructor.as_ref().ok_or_else(|| {
            ActivationError::instantiation(descriptor.identity.as_str(), "蓝图未登记构造闭包")
        })?;
        constructor()
    }

    fn apply_injection(
        &self,
        descriptor: &ComponentDescriptor,
        target: &ComponentHandle,
        point: &InjectionPoint,
        value: ComponentHandle,
    ) -> ActivationResult<()> {
        trace!("应用注入: {}.{}", descriptor.identity, point.method);
        let blueprint = self.blueprints.get(&descriptor.identity).ok_or_else(|| {
            ActivationError::injection(descriptor.identity.as_str(), &point.method, "未登记组件蓝图")
        })?;
        let setter = blueprint.setters.get(&point.method).ok_or_else(|| {
            ActivationError::injection(
                descriptor.identity.as_str(),
                &point.method,
                "蓝图未登记该注入方法",
            )
        })?;
        setter(target, value)
    }

    fn invoke_callback(
        &self,
        descriptor: &ComponentDescriptor,
        target: &ComponentHandle,
        method: &str,
    ) -> ActivationResult<()> {
        trace!("调用回调: {}.{}", descriptor.identity, method);
        let blueprint = self.blueprints.get(&descriptor.identity).ok_or_else(|| {
            ActivationError::callback(descriptor.identity.as_str(), method, "未登记组件蓝图")
        })?;
        let callback = blueprint.callbacks.get(method).ok_or_else(|| {
            ActivationError::callback(
                descriptor.identity.as_str(),
                method,
                "蓝图未登记该回调方法",
            )
        })?;
        callback(target)
    }
}
