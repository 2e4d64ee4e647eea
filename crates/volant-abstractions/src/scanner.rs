//! 组件扫描器抽象接口
//!
//! 提供从应用声明中发现候选组件的能力

use volant_common::{ComponentDescriptor, ScanConfig, ScanResult, TypeCatalog};

/// 扫描输出
///
/// 扫描器在启动时一次性产出的组件描述符和类型目录。
#[derive(Debug, Default)]
pub struct ScanOutput {
    /// 发现的组件描述符
    pub descriptors: Vec<ComponentDescriptor>,
    /// 类型层次元数据目录
    pub catalog: TypeCatalog,
}

/// 组件扫描器 trait
///
/// 用于从应用的组件声明中发现候选组件
pub trait ComponentScanner: Send + Sync {
    /// 按配置的扫描边界产出组件描述符与类型目录
    fn scan(&self, config: &ScanConfig) -> ScanResult<ScanOutput>;

    /// 获取扫描器名称
    fn name(&self) -> &str;
}
