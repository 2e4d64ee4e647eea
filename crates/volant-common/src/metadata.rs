//! 元数据定义
//!
//! 提供组件描述符以及类型层次结构的声明式元数据。
//! 类型信息由外部扫描器一次性装配，核心的可赋值性与泛型兼容性判定
//! 完全在这份元数据上进行，不依赖任何运行时类型查询设施。

use std::collections::{HashMap, HashSet};
use std::fmt;

/// 组件标识
///
/// 以完全限定类型名作为组件的稳定标识，每个存活实例唯一。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentIdentity(String);

impl ComponentIdentity {
    /// 创建新的组件标识
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 获取完全限定名
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 获取简单名称（不包含模块路径）
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.0)
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ComponentIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 从完全限定名提取简单名称
pub fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit("::").next().unwrap_or(qualified)
}

/// 类型引用
///
/// 描述类型声明中出现的一个类型位置：要么是带类型实参的具体类型，
/// 要么是一个待替换的类型变量。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// 具体类型及其类型实参
    Concrete {
        /// 完全限定的原始类型名
        name: String,
        /// 类型实参，原始（非泛型）引用时为空
        args: Vec<TypeRef>,
    },
    /// 类型变量（例如 `T`）
    Variable(String),
}

impl TypeRef {
    /// 创建不带类型实参的具体类型引用
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::Concrete {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// 创建带类型实参的具体类型引用
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Concrete {
            name: name.into(),
            args,
        }
    }

    /// 创建类型变量引用
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// 获取原始类型名，类型变量返回 `None`
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            Self::Concrete { name, .. } => Some(name),
            Self::Variable(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        arg.fmt(f)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Variable(name) => f.write_str(name),
        }
    }
}

/// 注入点要求的类型
///
/// `args` 非空时表示该注入点要求一个参数化类型，解析器在原始可赋值性
/// 检查之外还要做泛型实参的匹配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredType {
    /// 完全限定的原始类型名
    pub raw: String,
    /// 要求的泛型类型实参
    pub args: Vec<TypeRef>,
}

impl RequiredType {
    /// 创建原始类型要求
    pub fn of(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            args: Vec::new(),
        }
    }

    /// 创建参数化类型要求
    pub fn parameterized(raw: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            raw: raw.into(),
            args,
        }
    }

    /// 是否为参数化类型要求
    pub fn is_parameterized(&self) -> bool {
        !self.args.is_empty()
    }
}

impl fmt::Display for RequiredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                arg.fmt(f)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// 类型模型
///
/// 一个具体类型在类型层次中的声明信息：类型参数、泛型父类引用以及
/// 实现的泛型接口列表。
#[derive(Debug, Clone)]
pub struct TypeModel {
    /// 完全限定的类型名
    pub name: String,
    /// 声明的类型参数名
    pub type_params: Vec<String>,
    /// 泛型父类引用
    pub superclass: Option<TypeRef>,
    /// 实现的泛型接口引用
    pub interfaces: Vec<TypeRef>,
}

impl TypeModel {
    /// 创建新的类型模型
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    /// 声明类型参数
    pub fn with_type_param(mut self, param: impl Into<String>) -> Self {
        self.type_params.push(param.into());
        self
    }

    /// 设置父类引用
    pub fn with_superclass(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// 添加接口引用
    pub fn with_interface(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }
}

/// 类型目录
///
/// 原始类型名到类型模型的映射。目录中不存在的类型只与自身可赋值兼容。
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    models: HashMap<String, TypeModel>,
}

impl TypeCatalog {
    /// 创建空的类型目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入类型模型，同名模型后写覆盖先写
    pub fn insert(&mut self, model: TypeModel) {
        self.models.insert(model.name.clone(), model);
    }

    /// 获取类型模型
    pub fn get(&self, name: &str) -> Option<&TypeModel> {
        self.models.get(name)
    }

    /// 目录中的类型数量
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// 判断 `candidate` 的具体类型是否可赋值给 `required` 类型
    ///
    /// 沿父类链和接口列表做传递闭包检查，只比较原始类型名，
    /// 不考虑泛型实参（泛型匹配由解析器单独执行）。
    pub fn is_assignable(&self, candidate: &str, required: &str) -> bool {
        self.is_assignable_walk(candidate, required, &mut HashSet::new())
    }

    fn is_assignable_walk(
        &self,
        candidate: &str,
        required: &str,
        visited: &mut HashSet<String>,
    ) -> bool {
        if candidate == required {
            return true;
        }

        // 元数据由外部装配, 声明中的环不匹配而不是让行走发散
        if !visited.insert(candidate.to_string()) {
            return false;
        }

        let Some(model) = self.models.get(candidate) else {
            return false;
        };

        if let Some(name) = model.superclass.as_ref().and_then(TypeRef::raw_name) {
            if self.is_assignable_walk(name, required, visited) {
                return true;
            }
        }

        model
            .interfaces
            .iter()
            .filter_map(TypeRef::raw_name)
            .any(|name| self.is_assignable_walk(name, required, visited))
    }
}

/// 注入参数
#[derive(Debug, Clone)]
pub struct InjectionParam {
    /// 参数名，用于按名称匹配的提示
    pub name: Option<String>,
    /// 要求的类型
    pub required: RequiredType,
}

/// 注入点
///
/// 组件上声明的一个依赖槽位（setter 注入方法）。注入方法必须恰好
/// 声明一个参数，参数数量校验由解析器在匹配之前执行。
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    /// 注入方法名
    pub method: String,
    /// 显式限定名
    pub qualifier: Option<String>,
    /// 参数列表
    pub params: Vec<InjectionParam>,
}

impl InjectionPoint {
    /// 创建新的注入点
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            qualifier: None,
            params: Vec::new(),
        }
    }

    /// 创建单参数 setter 注入点
    pub fn setter(method: impl Into<String>, required: RequiredType) -> Self {
        Self::new(method).with_param(None::<String>, required)
    }

    /// 设置显式限定名
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// 添加参数
    pub fn with_param(mut self, name: Option<impl Into<String>>, required: RequiredType) -> Self {
        self.params.push(InjectionParam {
            name: name.map(Into::into),
            required,
        });
        self
    }
}

/// 组件描述符
///
/// 由外部扫描器为每个被管理组件产出一次。
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// 组件标识
    pub identity: ComponentIdentity,
    /// 声明名称，默认为类型的简单名称
    pub name: String,
    /// 系统标签，用于按系统过滤组件；空标签表示总是生效
    pub system_tag: Option<String>,
    /// 静态依赖声明（独立于实际注入点的命名依赖提示）
    pub depends_on: Vec<String>,
    /// 是否具有无参构造方式
    pub has_default_constructor: bool,
    /// setter 注入点列表
    pub injection_points: Vec<InjectionPoint>,
    /// 构造后回调方法名列表
    pub post_construct_methods: Vec<String>,
}

impl ComponentDescriptor {
    /// 创建新的组件描述符
    pub fn new(identity: impl Into<ComponentIdentity>) -> Self {
        let identity = identity.into();
        let name = identity.simple_name().to_string();
        Self {
            identity,
            name,
            system_tag: None,
            depends_on: Vec::new(),
            has_default_constructor: true,
            injection_points: Vec::new(),
            post_construct_methods: Vec::new(),
        }
    }

    /// 设置声明名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置系统标签
    pub fn with_system_tag(mut self, tag: impl Into<String>) -> Self {
        self.system_tag = Some(tag.into());
        self
    }

    /// 添加静态依赖声明
    pub fn with_depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }

    /// 标记组件没有无参构造方式
    pub fn without_default_constructor(mut self) -> Self {
        self.has_default_constructor = false;
        self
    }

    /// 添加注入点
    pub fn with_injection_point(mut self, point: InjectionPoint) -> Self {
        self.injection_points.push(point);
        self
    }

    /// 添加构造后回调方法
    pub fn with_post_construct(mut self, method: impl Into<String>) -> Self {
        self.post_construct_methods.push(method.into());
        self
    }

    /// 判断组件在指定系统下是否生效
    ///
    /// 标签比较不区分大小写，未声明或空标签的组件总是生效。
    pub fn matches_system(&self, system: &str) -> bool {
        match &self.system_tag {
            None => true,
            Some(tag) => tag.is_empty() || tag.eq_ignore_ascii_case(system),
        }
    }
}
