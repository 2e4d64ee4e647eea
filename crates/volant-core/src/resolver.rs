//! 依赖解析器
//!
//! 为单个注入点从注册表中找出恰好一个实例。策略链按固定优先级求值，
//! 命中即停：显式限定名、参数名、方法名派生名、可赋值缓存、
//! 精确标识，最后是带泛型判别的全量可赋值扫描。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::trace;
use volant_common::{
    ComponentIdentity, InjectionPoint, RequiredType, ResolveError, ResolveResult, TypeCatalog,
    TypeRef,
};

use crate::registry::{ComponentRegistry, RegisteredComponent};

/// 依赖解析器
///
/// 借用注册表与类型目录，对注入点执行匹配。
pub struct DependencyResolver<'a> {
    registry: &'a ComponentRegistry,
    catalog: &'a TypeCatalog,
}

impl<'a> DependencyResolver<'a> {
    /// 创建解析器
    pub fn new(registry: &'a ComponentRegistry, catalog: &'a TypeCatalog) -> Self {
        Self { registry, catalog }
    }

    /// 解析一个注入点，返回恰好一个匹配实例或错误
    ///
    /// 注入方法必须恰好声明一个必需参数，否则在任何匹配之前报配置错误。
    pub fn resolve(&self, point: &InjectionPoint) -> ResolveResult<Arc<RegisteredComponent>> {
        if point.params.len() != 1 {
            return Err(ResolveError::InjectionArity {
                method: point.method.clone(),
                count: point.params.len(),
            });
        }
        let param = &point.params[0];
        let required = &param.required;

        // 策略 1: 显式限定名。限定名缺席时立即失败，不落入类型匹配。
        if let Some(qualifier) = &point.qualifier {
            return self.registry.lookup_by_name(qualifier).ok_or_else(|| {
                ResolveError::QualifierNotFound {
                    qualifier: qualifier.clone(),
                    method: point.method.clone(),
                }
            });
        }

        // 策略 2: 参数名匹配，要求类型兼容
        if let Some(name) = &param.name {
            if let Some(entry) = self.registry.lookup_by_name(name) {
                if self.catalog.is_assignable(entry.identity.as_str(), &required.raw) {
                    trace!("注入点 {} 通过参数名 {} 匹配", point.method, name);
                    return Ok(entry);
                }
            }
        }

        // 策略 3: 从注入方法名派生候选名称，要求类型兼容
        if let Some(entry) = self.resolve_by_derived_name(point, required) {
            return Ok(entry);
        }

        // 策略 4: 可赋值类型缓存。缓存只按原始类型名建键, 参数化要求
        // 必须重新判别泛型实参, 不走缓存。
        if !required.is_parameterized() {
            if let Some(entry) = self.registry.cached_assignable(&required.raw) {
                return Ok(entry);
            }
        }

        // 策略 5: 精确标识匹配
        let exact = ComponentIdentity::new(required.raw.clone());
        if let Some(entry) = self.registry.lookup_by_identity(&exact) {
            return Ok(entry);
        }

        // 策略 6: 全量可赋值扫描（含泛型判别）
        let matches: Vec<Arc<RegisteredComponent>> = self
            .registry
            .identity_entries()
            .into_iter()
            .filter(|entry| self.provides_implementation(entry.identity.as_str(), required))
            .collect();

        if matches.len() > 1 {
            return Err(ResolveError::Ambiguous {
                required: required.to_string(),
                method: point.method.clone(),
                candidates: matches
                    .iter()
                    .map(|entry| entry.identity.to_string())
                    .collect(),
            });
        }

        match matches.into_iter().next() {
            Some(entry) => {
                if !required.is_parameterized() {
                    self.registry.record_assignable(&required.raw, entry.clone());
                }
                trace!(
                    "注入点 {} 通过可赋值扫描匹配到组件 {}",
                    point.method,
                    entry.identity
                );
                Ok(entry)
            }
            None => Err(ResolveError::NotFound {
                required: required.to_string(),
                method: point.method.clone(),
            }),
        }
    }

    /// 从注入方法名剥离 `set` 前缀派生候选名称，依次尝试派生名
    /// 本身与首字母小写变体
    fn resolve_by_derived_name(
        &self,
        point: &InjectionPoint,
        required: &RequiredType,
    ) -> Option<Arc<RegisteredComponent>> {
        let derived = point.method.strip_prefix("set")?.trim_start_matches('_');
        if derived.is_empty() {
            return None;
        }

        let mut candidate = self.registry.lookup_by_name(derived);
        if candidate.is_none() {
            candidate = self.registry.lookup_by_name(&lower_first(derived));
        }

        let entry = candidate?;
        if self.catalog.is_assignable(entry.identity.as_str(), &required.raw) {
            trace!("注入点 {} 通过派生名 {} 匹配", point.method, derived);
            Some(entry)
        } else {
            None
        }
    }

    /// 判断候选类型是否满足要求类型的能力契约
    ///
    /// 原始可赋值性检查在前；要求类型携带泛型实参时再做泛型判别。
    fn provides_implementation(&self, candidate: &str, required: &RequiredType) -> bool {
        if !self.catalog.is_assignable(candidate, &required.raw) {
            return false;
        }
        if !required.is_parameterized() {
            return true;
        }
        self.provides_generic_implementation(
            candidate,
            required,
            &mut HashMap::new(),
            &mut HashSet::new(),
        )
    }

    /// 沿候选类型的父类链与接口列表行走，替换沿途累积的类型变量，
    /// 直到找到要求的参数化类型或层次耗尽；已访问过的类型不再进入
    fn provides_generic_implementation(
        &self,
        check: &str,
        required: &RequiredType,
        subst: &mut HashMap<String, TypeRef>,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(check.to_string()) {
            return false;
        }
        let Some(model) = self.catalog.get(check) else {
            return false;
        };

        // 父类分支：父类的原始类型可赋值时沿父类链上行
        if let Some(TypeRef::Concrete {
            name: super_raw,
            args: super_args,
        }) = &model.superclass
        {
            if self.catalog.is_assignable(super_raw, &required.raw) {
                if super_raw == &required.raw {
                    if super_args.is_empty() {
                        // 非泛型继承要求的原始类型
                        return true;
                    }
                    if args_match(&required.args, super_args, subst) {
                        return true;
                    }
                }
                if let Some(super_model) = self.catalog.get(super_raw) {
                    for (param, arg) in super_model.type_params.iter().zip(super_args) {
                        let resolved = resolve_ref(arg, subst);
                        subst.insert(param.clone(), resolved);
                    }
                }
                return self.provides_generic_implementation(super_raw, required, subst, visited);
            }
        }

        // 接口分支：实现原始接口不等于实现要求的参数化接口，
        // 实参不同的参数化实现也不是匹配
        for iface in &model.interfaces {
            let TypeRef::Concrete {
                name: iface_raw,
                args: iface_args,
            } = iface
            else {
                continue;
            };
            if !self.catalog.is_assignable(iface_raw, &required.raw) {
                continue;
            }
            if args_match(&required.args, iface_args, subst) {
                return true;
            }
        }

        false
    }
}

/// 按位置比较要求的实参与实现方声明的实参，实现方的类型变量先经替换表解析
fn args_match(required: &[TypeRef], implemented: &[TypeRef], subst: &HashMap<String, TypeRef>) -> bool {
    if required.len() != implemented.len() {
        return false;
    }
    required
        .iter()
        .zip(implemented)
        .all(|(req, imp)| resolve_ref(imp, subst) == *req)
}

/// 沿替换表解析类型变量，未映射的变量原样返回
fn resolve_ref(arg: &TypeRef, subst: &HashMap<String, TypeRef>) -> TypeRef {
    let mut current = arg.clone();
    while let TypeRef::Variable(name) = &current {
        match subst.get(name) {
            Some(next) if *next != current => current = next.clone(),
            _ => break,
        }
    }
    current
}

/// 首字母小写变体
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
