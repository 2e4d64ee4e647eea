//! 生命周期编排器
//!
//! 驱动端到端的启动序列：扫描发现、实例化、依赖解析与注入（同时
//! 构建依赖图）、按拓扑顺序执行构造后回调。状态机只有一条前进
//! 路径，任何阶段失败都终止于 FAILED；`start` 消费容器本身，
//! 类型系统保证不可重入。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, trace};
use volant_abstractions::{ComponentActivator, ComponentHandle, ComponentScanner, ScanOutput};
use volant_common::{
    ComponentDescriptor, ComponentIdentity, ScanConfig, StartupError, StartupResult,
    TypeCatalog,
};

use crate::graph::DependencyGraph;
use crate::registry::{ComponentRegistry, RegisteredComponent};
use crate::resolver::DependencyResolver;

/// 启动阶段
///
/// `DISCOVERED → INSTANTIATED → WIRED → INJECTED → POST_CONSTRUCTED → READY`，
/// 任何迁移失败进入吸收态 `FAILED`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    /// 扫描器已产出描述符
    Discovered,
    /// 全部组件已实例化并注册
    Instantiated,
    /// 依赖图已构建
    Wired,
    /// 全部注入点已应用
    Injected,
    /// 构造后回调已按依赖顺序执行
    PostConstructed,
    /// 注册表开放稳态查询
    Ready,
    /// 不可恢复的启动失败
    Failed,
}

/// 容器构建器
pub struct ContainerBuilder {
    config: Option<ScanConfig>,
    scanner: Option<Box<dyn ComponentScanner>>,
    activator: Option<Box<dyn ComponentActivator>>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            config: None,
            scanner: None,
            activator: None,
        }
    }

    /// 设置扫描配置
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 设置组件扫描器
    pub fn with_scanner<S: ComponentScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    /// 设置组件激活器
    pub fn with_activator<A: ComponentActivator + 'static>(mut self, activator: A) -> Self {
        self.activator = Some(Box::new(activator));
        self
    }

    /// 构建容器
    pub fn build(self) -> StartupResult<Container> {
        let config = self.config.ok_or_else(|| StartupError::Configuration {
            message: "缺少扫描配置".to_string(),
        })?;
        config.validate()?;
        let scanner = self.scanner.ok_or_else(|| StartupError::Configuration {
            message: "缺少组件扫描器".to_string(),
        })?;
        let activator = self.activator.ok_or_else(|| StartupError::Configuration {
            message: "缺少组件激活器".to_string(),
        })?;
        Ok(Container {
            config,
            scanner,
            activator,
        })
    }
}

/// 组件容器
///
/// 持有配置与两个外部协作者，`start` 运行完整的启动序列。
pub struct Container {
    config: ScanConfig,
    scanner: Box<dyn ComponentScanner>,
    activator: Box<dyn ComponentActivator>,
}

impl Container {
    /// 创建容器构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 运行完整的启动序列
    ///
    /// 返回就绪的容器或第一个启动错误；启动不做部分完成，也不重试。
    pub fn start(self) -> StartupResult<ReadyContainer> {
        info!("开始启动组件容器, 扫描边界 {:?}", self.config.scan_boundaries);

        match self.run_startup() {
            Ok(ready) => Ok(ready),
            Err(err) => {
                error!("容器启动失败, 进入 {:?} 状态: {}", StartupPhase::Failed, err);
                Err(err)
            }
        }
    }

    fn run_startup(self) -> StartupResult<ReadyContainer> {
        // DISCOVERED: 扫描器一次性产出描述符与类型目录
        let ScanOutput {
            descriptors,
            catalog,
        } = self.scanner.scan(&self.config)?;
        debug!(
            "扫描器 {} 发现 {} 个组件, 阶段 {:?}",
            self.scanner.name(),
            descriptors.len(),
            StartupPhase::Discovered
        );

        // 系统标签过滤：带标签的组件只在匹配的系统下生效
        let system = self.config.system_tag();
        let mut eligible: Vec<ComponentDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if descriptor.matches_system(system) {
                eligible.push(descriptor.clone());
            } else {
                trace!(
                    "跳过组件 {}: 系统标签 {:?} 与 {} 不匹配",
                    descriptor.identity,
                    descriptor.system_tag,
                    system
                );
            }
        }

        // INSTANTIATED: 逐个激活并注册
        let registry = ComponentRegistry::new();
        let mut live: Vec<Arc<RegisteredComponent>> = Vec::with_capacity(eligible.len());
        for descriptor in &eligible {
            if !descriptor.has_default_constructor {
                return Err(StartupError::NoDefaultConstructor {
                    identity: descriptor.identity.to_string(),
                });
            }
            let handle = self.activator.instantiate(descriptor).map_err(|source| {
                StartupError::Instantiation {
                    identity: descriptor.identity.to_string(),
                    source,
                }
            })?;
            live.push(registry.register(
                descriptor.name.clone(),
                descriptor.identity.clone(),
                handle,
            ));
        }
        debug!(
            "共实例化 {} 个组件, 阶段 {:?}",
            live.len(),
            StartupPhase::Instantiated
        );

        // WIRED + INJECTED（交错执行）: 解析每个注入点, 成功即记边并应用
        let mut graph: DependencyGraph<ComponentIdentity> = DependencyGraph::new();
        let resolver = DependencyResolver::new(&registry, &catalog);
        for (descriptor, target) in eligible.iter().zip(&live) {
            if self.config.is_in_scope(&descriptor.identity) {
                graph.add_node(descriptor.identity.clone());
            }

            // 静态依赖声明先于实际注入点生效
            for dependency in &descriptor.depends_on {
                let Some(entry) = registry.lookup_by_name(dependency) else {
                    return Err(StartupError::DependsOnMissing {
                        identity: descriptor.identity.to_string(),
                        dependency: dependency.clone(),
                    });
                };
                self.add_edge(&mut graph, &descriptor.identity, &entry.identity);
            }

            for point in &descriptor.injection_points {
                let resolved = resolver.resolve(point).map_err(|source| {
                    StartupError::Wiring {
                        identity: descriptor.identity.to_string(),
                        source,
                    }
                })?;
                self.add_edge(&mut graph, &descriptor.identity, &resolved.identity);
                self.activator
                    .apply_injection(descriptor, &target.handle, point, resolved.handle.clone())
                    .map_err(|source| StartupError::Injection {
                        identity: descriptor.identity.to_string(),
                        source,
                    })?;
            }
        }
        debug!(
            "依赖图构建完成, {} 个节点, 阶段 {:?}",
            graph.node_count(),
            StartupPhase::Wired
        );

        // POST_CONSTRUCTED: 严格按拓扑顺序执行构造后回调
        let order = graph.topological_order()?;
        trace!("依赖顺序: {:?}", order.iter().map(ToString::to_string).collect::<Vec<_>>());
        for identity in &order {
            let Some(entry) = registry.lookup_by_identity(identity) else {
                continue;
            };
            let Some(descriptor) = eligible.iter().find(|d| &d.identity == identity) else {
                continue;
            };
            for method in &descriptor.post_construct_methods {
                trace!("运行组件 {} 的构造后回调 {}", identity, method);
                self.activator
                    .invoke_callback(descriptor, &entry.handle, method)
                    .map_err(|source| StartupError::Callback {
                        identity: identity.to_string(),
                        source,
                    })?;
            }
        }

        info!(
            "容器启动完成, {} 个组件进入 {:?} 状态",
            registry.len(),
            StartupPhase::Ready
        );

        // 描述符与类型目录保留给瞬时实例创建使用
        let descriptors: HashMap<ComponentIdentity, ComponentDescriptor> = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.identity.clone(), descriptor))
            .collect();

        Ok(ReadyContainer {
            registry: Arc::new(registry),
            catalog,
            activator: self.activator,
            descriptors,
        })
    }

    /// 仅当两个端点都处于配置的扫描范围内时才记录依赖边
    fn add_edge(
        &self,
        graph: &mut DependencyGraph<ComponentIdentity>,
        dependant: &ComponentIdentity,
        dependency: &ComponentIdentity,
    ) {
        if self.config.is_in_scope(dependant) && self.config.is_in_scope(dependency) {
            graph.add_dependency(dependant.clone(), dependency.clone());
        }
    }
}

/// 就绪容器
///
/// 启动完成后的稳态查询入口。查询从不 panic，未命中返回 `None`。
pub struct ReadyContainer {
    registry: Arc<ComponentRegistry>,
    catalog: TypeCatalog,
    activator: Box<dyn ComponentActivator>,
    descriptors: HashMap<ComponentIdentity, ComponentDescriptor>,
}

impl ReadyContainer {
    /// 获取注册表句柄
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// 按名称获取实例，逐级回退到可赋值名称缓存与组件标识
    pub fn get_by_name(&self, name: &str) -> Option<ComponentHandle> {
        self.registry.find_by_name(name).map(|entry| entry.handle.clone())
    }

    /// 按类型获取实例：先精确标识匹配，再查可赋值类型缓存
    pub fn get_by_type(&self, raw: &str) -> Option<ComponentHandle> {
        self.registry.lookup_by_type(raw).map(|entry| entry.handle.clone())
    }

    /// 按名称获取实例并向下转型
    pub fn get_typed<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.get_by_name(name)
            .and_then(|handle| handle.downcast::<T>().ok())
    }

    /// 全部实例的无序快照
    pub fn all_instances(&self) -> Vec<ComponentHandle> {
        self.registry.all_instances()
    }

    /// 全部已知名称的无序快照
    pub fn all_names(&self) -> Vec<String> {
        self.registry.all_names()
    }

    /// 创建瞬时实例
    ///
    /// 使用与启动注入路径相同的解析与激活机制构造、注入并执行构造后
    /// 回调，但从不注册到注册表，也不记录任何依赖边。
    pub fn create_transient(&self, type_name: &str) -> StartupResult<ComponentHandle> {
        let identity = ComponentIdentity::new(type_name);
        let descriptor =
            self.descriptors
                .get(&identity)
                .ok_or_else(|| StartupError::UnknownComponent {
                    type_name: type_name.to_string(),
                })?;
        if !descriptor.has_default_constructor {
            return Err(StartupError::NoDefaultConstructor {
                identity: descriptor.identity.to_string(),
            });
        }

        debug!("创建瞬时实例: {}", identity);
        let handle = self.activator.instantiate(descriptor).map_err(|source| {
            StartupError::Instantiation {
                identity: descriptor.identity.to_string(),
                source,
            }
        })?;

        let resolver = DependencyResolver::new(&self.registry, &self.catalog);
        for point in &descriptor.injection_points {
            let resolved = resolver.resolve(point).map_err(|source| StartupError::Wiring {
                identity: descriptor.identity.to_string(),
                source,
            })?;
            self.activator
                .apply_injection(descriptor, &handle, point, resolved.handle.clone())
                .map_err(|source| StartupError::Injection {
                    identity: descriptor.identity.to_string(),
                    source,
                })?;
        }

        for method in &descriptor.post_construct_methods {
            self.activator
                .invoke_callback(descriptor, &handle, method)
                .map_err(|source| StartupError::Callback {
                    identity: descriptor.identity.to_string(),
                    source,
                })?;
        }

        Ok(handle)
    }
}

impl std::fmt::Debug for ReadyContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyContainer")
            .field("components", &self.registry.len())
            .field("catalog_types", &self.catalog.len())
            .finish()
    }
}
