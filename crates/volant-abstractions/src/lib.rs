//! # Volant Abstractions
//!
//! 这个 crate 定义 Volant 容器与外部协作者之间的接口边界。
//!
//! ## 核心组件
//!
//! - [`ComponentScanner`] - 组件发现协作者，一次性产出描述符与类型目录
//! - [`ComponentActivator`] - 组件激活协作者，负责构造实例、调用注入方法
//!   与生命周期回调
//! - [`ComponentHandle`] - 被管理实例的不透明句柄

pub mod activator;
pub mod scanner;

pub use activator::*;
pub use scanner::*;
