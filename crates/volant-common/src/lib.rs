//! # Volant Common
//!
//! 这个 crate 提供 Volant 组件容器的公共数据模型和错误类型。
//!
//! ## 核心组件
//!
//! - [`ComponentIdentity`] - 组件的稳定标识（完全限定类型名）
//! - [`ComponentDescriptor`] - 扫描器产出的组件描述符
//! - [`TypeCatalog`] - 类型层次结构的声明式元数据目录
//! - [`ScanConfig`] - 扫描边界与系统标签配置
//!
//! ## 设计原则
//!
//! - 类型层次信息由扫描器一次性装配为元数据，核心算法不依赖任何运行时反射
//! - 失败路径全部以显式的 `Result` 表达，不在启动流程中展开 panic
//! - 约定优于配置：组件名称默认取类型的简单名称

pub mod config;
pub mod errors;
pub mod metadata;

pub use config::*;
pub use errors::*;
pub use metadata::*;
