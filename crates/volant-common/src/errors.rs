//! 错误类型定义

use thiserror::Error;

/// 扫描错误类型
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("扫描边界不能为空")]
    EmptyScanBoundaries,

    #[error("组件描述符无效: {identity}, 原因: {message}")]
    MalformedDescriptor { identity: String, message: String },

    #[error("组件扫描失败: {message}")]
    ScanFailed { message: String },
}

impl ScanError {
    /// 创建描述符无效错误
    pub fn malformed(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// 创建扫描失败错误
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ScanFailed {
            message: message.into(),
        }
    }
}

/// 依赖解析错误类型
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("注入点 {method} 的参数数量无效: 期望 1 个, 实际 {count} 个")]
    InjectionArity { method: String, count: usize },

    #[error("找不到限定名指定的组件: 限定名 {qualifier}, 注入点 {method}")]
    QualifierNotFound { qualifier: String, method: String },

    #[error("找不到可注入的组件: 类型 {required}, 注入点 {method}")]
    NotFound { required: String, method: String },

    #[error(
        "找到多个可注入的组件: 类型 {required}, 注入点 {method}, 候选 {candidates:?}, 请使用限定名消除歧义"
    )]
    Ambiguous {
        required: String,
        method: String,
        candidates: Vec<String>,
    },
}

/// 循环依赖错误
///
/// `remaining` 列出排序结束时出度仍不为零的全部节点。这是所有仍纠缠在
/// 未解环中的节点的并集，是诊断信息而非精确的最小环路径。
#[derive(Error, Debug, Clone)]
#[error("依赖求值中检测到环, 请检查以下组件之间的循环依赖: {}", .remaining.join(", "))]
pub struct CircularDependencyError {
    /// 出度未归零的节点标识
    pub remaining: Vec<String>,
}

/// 组件激活错误类型
///
/// 由外部激活器在构造实例、调用注入方法或生命周期回调时产生。
#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("组件实例化失败: {identity}, 原因: {message}")]
    Instantiation { identity: String, message: String },

    #[error("注入调用失败: {identity}.{method}, 原因: {message}")]
    Injection {
        identity: String,
        method: String,
        message: String,
    },

    #[error("生命周期回调调用失败: {identity}.{method}, 原因: {message}")]
    Callback {
        identity: String,
        method: String,
        message: String,
    },
}

impl ActivationError {
    /// 创建实例化错误
    pub fn instantiation(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// 创建注入调用错误
    pub fn injection(
        identity: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Injection {
            identity: identity.into(),
            method: method.into(),
            message: message.into(),
        }
    }

    /// 创建回调调用错误
    pub fn callback(
        identity: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Callback {
            identity: identity.into(),
            method: method.into(),
            message: message.into(),
        }
    }
}

/// 容器启动错误类型
///
/// 启动序列中出现的第一个错误即为致命错误，容器不做部分启动也不重试。
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("容器配置无效: {message}")]
    Configuration { message: String },

    #[error("组件扫描阶段失败: {source}")]
    Scan {
        #[from]
        source: ScanError,
    },

    #[error("组件 {identity} 缺少默认构造方式, 无法自动实例化")]
    NoDefaultConstructor { identity: String },

    #[error("组件实例化阶段失败: {identity}, 原因: {source}")]
    Instantiation {
        identity: String,
        #[source]
        source: ActivationError,
    },

    #[error("静态依赖声明无效: 组件 {identity} 声明依赖 {dependency}, 但该名称未注册")]
    DependsOnMissing { identity: String, dependency: String },

    #[error("依赖解析阶段失败: 组件 {identity}, 原因: {source}")]
    Wiring {
        identity: String,
        #[source]
        source: ResolveError,
    },

    #[error("注入调用阶段失败: 组件 {identity}, 原因: {source}")]
    Injection {
        identity: String,
        #[source]
        source: ActivationError,
    },

    #[error("依赖图排序失败: {source}")]
    Cycle {
        #[from]
        source: CircularDependencyError,
    },

    #[error("生命周期回调阶段失败: 组件 {identity}, 原因: {source}")]
    Callback {
        identity: String,
        #[source]
        source: ActivationError,
    },

    #[error("未知的组件类型: {type_name}")]
    UnknownComponent { type_name: String },
}

/// 扫描结果类型别名
pub type ScanResult<T> = Result<T, ScanError>;
/// 依赖解析结果类型别名
pub type ResolveResult<T> = Result<T, ResolveError>;
/// 组件激活结果类型别名
pub type ActivationResult<T> = Result<T, ActivationError>;
/// 容器启动结果类型别名
pub type StartupResult<T> = Result<T, StartupError>;
