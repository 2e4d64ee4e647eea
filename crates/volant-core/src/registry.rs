//! 组件注册表
//!
//! 存活组件实例的多索引存储：按声明名称与按具体标识各一份主索引，
//! 外加解析过程中惰性填充的可赋值匹配缓存。启动完成后注册表是
//! 读多写少的结构，所有映射都支持并发读取。

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{error, trace};
use volant_abstractions::ComponentHandle;
use volant_common::{simple_name_of, ComponentIdentity};

/// 已注册组件条目
#[derive(Clone)]
pub struct RegisteredComponent {
    /// 组件标识
    pub identity: ComponentIdentity,
    /// 注册时使用的声明名称
    pub name: String,
    /// 实例句柄
    pub handle: ComponentHandle,
}

impl std::fmt::Debug for RegisteredComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredComponent")
            .field("identity", &self.identity)
            .field("name", &self.name)
            .finish()
    }
}

/// 组件注册表
///
/// 同一名称或同一标识至多保留一个存活实例，重复注册时后写覆盖先写。
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_name: DashMap<String, Arc<RegisteredComponent>>,
    by_identity: DashMap<ComponentIdentity, Arc<RegisteredComponent>>,
    assignable_by_type: DashMap<String, Arc<RegisteredComponent>>,
    assignable_by_name: DashMap<String, Arc<RegisteredComponent>>,
}

impl ComponentRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 以显式名称注册实例
    pub fn register(
        &self,
        name: impl Into<String>,
        identity: ComponentIdentity,
        handle: ComponentHandle,
    ) -> Arc<RegisteredComponent> {
        let name = name.into();
        trace!("注册组件: 名称 {} 标识 {}", name, identity);

        let entry = Arc::new(RegisteredComponent {
            identity: identity.clone(),
            name: name.clone(),
            handle,
        });
        self.by_name.insert(name, entry.clone());
        self.by_identity.insert(identity, entry.clone());
        entry
    }

    /// 以默认名称（标识的简单名称）注册实例
    pub fn register_default(
        &self,
        identity: ComponentIdentity,
        handle: ComponentHandle,
    ) -> Arc<RegisteredComponent> {
        let name = identity.simple_name().to_string();
        self.register(name, identity, handle)
    }

    /// 按声明名称查找
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<RegisteredComponent>> {
        self.by_name.get(name).map(|entry| entry.clone())
    }

    /// 按组件标识查找
    pub fn lookup_by_identity(&self, identity: &ComponentIdentity) -> Option<Arc<RegisteredComponent>> {
        self.by_identity.get(identity).map(|entry| entry.clone())
    }

    /// 按原始类型名查找：先精确标识匹配，再查可赋值类型缓存
    pub fn lookup_by_type(&self, raw: &str) -> Option<Arc<RegisteredComponent>> {
        let identity = ComponentIdentity::new(raw);
        if let Some(entry) = self.lookup_by_identity(&identity) {
            return Some(entry);
        }
        self.cached_assignable(raw)
    }

    /// 按名称查找并逐级回退：声明名称、可赋值名称缓存、组件标识
    pub fn find_by_name(&self, name: &str) -> Option<Arc<RegisteredComponent>> {
        if let Some(entry) = self.lookup_by_name(name) {
            return Some(entry);
        }
        if let Some(entry) = self.assignable_by_name.get(name) {
            return Some(entry.clone());
        }
        let found = self.lookup_by_identity(&ComponentIdentity::new(name));
        if found.is_none() {
            error!(
                "找不到组件: {}, 当前共有 {} 个命名组件",
                name,
                self.by_name.len()
            );
        }
        found
    }

    /// 查询可赋值类型缓存
    pub fn cached_assignable(&self, raw: &str) -> Option<Arc<RegisteredComponent>> {
        self.assignable_by_type.get(raw).map(|entry| entry.clone())
    }

    /// 记录一次成功且无歧义的可赋值匹配
    ///
    /// 以要求类型的原始名和简单名各建一条缓存，调用方保证唯一性。
    pub fn record_assignable(&self, required_raw: &str, entry: Arc<RegisteredComponent>) {
        trace!("缓存可赋值匹配: 类型 {} -> 组件 {}", required_raw, entry.identity);
        self.assignable_by_type
            .insert(required_raw.to_string(), entry.clone());
        self.assignable_by_name
            .insert(simple_name_of(required_raw).to_string(), entry);
    }

    /// 按标识索引快照全部条目，按标识排序以保证遍历顺序稳定
    pub fn identity_entries(&self) -> Vec<Arc<RegisteredComponent>> {
        let mut entries: Vec<Arc<RegisteredComponent>> = self
            .by_identity
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| a.identity.cmp(&b.identity));
        entries
    }

    /// 全部实例的无序快照（名称索引与标识索引的并集，按条目去重）
    pub fn all_instances(&self) -> Vec<ComponentHandle> {
        let mut seen: HashSet<*const RegisteredComponent> = HashSet::new();
        let mut handles = Vec::new();
        for entry in self.by_identity.iter().map(|e| e.value().clone()) {
            if seen.insert(Arc::as_ptr(&entry)) {
                handles.push(entry.handle.clone());
            }
        }
        for entry in self.by_name.iter().map(|e| e.value().clone()) {
            if seen.insert(Arc::as_ptr(&entry)) {
                handles.push(entry.handle.clone());
            }
        }
        handles
    }

    /// 全部已知名称的无序快照（声明名称与标识字符串的并集）
    pub fn all_names(&self) -> Vec<String> {
        let mut names: HashSet<String> = self
            .by_name
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.extend(self.by_identity.iter().map(|entry| entry.key().to_string()));
        names.into_iter().collect()
    }

    /// 已注册实例数量（按标识计）
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_of(value: u32) -> ComponentHandle {
        Arc::new(value)
    }

    #[test]
    fn re_registration_overwrites_previous_binding() {
        let registry = ComponentRegistry::new();
        registry.register("cache", ComponentIdentity::new("demo::OldCache"), handle_of(1));
        registry.register("cache", ComponentIdentity::new("demo::NewCache"), handle_of(2));

        let entry = registry.lookup_by_name("cache").unwrap();
        assert_eq!(entry.identity.as_str(), "demo::NewCache");
        // 旧标识的绑定仍然存在，名称绑定已被覆盖
        assert!(registry
            .lookup_by_identity(&ComponentIdentity::new("demo::OldCache"))
            .is_some());
    }

    #[test]
    fn lookup_by_type_prefers_exact_identity_over_cache() {
        let registry = ComponentRegistry::new();
        let exact = registry.register(
            "exact",
            ComponentIdentity::new("demo::Cache"),
            handle_of(1),
        );
        let cached = registry.register(
            "cached",
            ComponentIdentity::new("demo::MemoryCache"),
            handle_of(2),
        );
        registry.record_assignable("demo::Cache", cached);

        let found = registry.lookup_by_type("demo::Cache").unwrap();
        assert!(Arc::ptr_eq(&found, &exact));
    }

    #[test]
    fn find_by_name_falls_back_to_assignable_and_identity() {
        let registry = ComponentRegistry::new();
        let entry = registry.register(
            "memoryCache",
            ComponentIdentity::new("demo::MemoryCache"),
            handle_of(1),
        );
        registry.record_assignable("demo::Cache", entry.clone());

        // 可赋值名称缓存以简单名称为键
        let by_assignable = registry.find_by_name("Cache").unwrap();
        assert!(Arc::ptr_eq(&by_assignable, &entry));

        // 标识字符串兜底
        let by_identity = registry.find_by_name("demo::MemoryCache").unwrap();
        assert!(Arc::ptr_eq(&by_identity, &entry));

        assert!(registry.find_by_name("missing").is_none());
    }

    #[test]
    fn default_name_is_simple_type_name() {
        let registry = ComponentRegistry::new();
        registry.register_default(ComponentIdentity::new("demo::service::UserService"), handle_of(7));

        assert!(registry.lookup_by_name("UserService").is_some());
    }
}
