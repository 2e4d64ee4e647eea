//! 静态组件扫描器
//!
//! 以编程方式装配描述符与类型目录的扫描器实现，是类路径扫描在
//! 元数据世界里的替代物。扫描时按配置的包含/排除前缀过滤候选组件。

use tracing::{debug, trace};
use volant_abstractions::{ComponentScanner, ScanOutput};
use volant_common::{ComponentDescriptor, ScanConfig, ScanResult, TypeCatalog, TypeModel};

/// 静态扫描器
///
/// 持有预先装配的组件描述符与类型模型，`scan` 时按扫描边界过滤。
#[derive(Debug, Default)]
pub struct StaticScanner {
    descriptors: Vec<ComponentDescriptor>,
    catalog: TypeCatalog,
}

impl StaticScanner {
    /// 创建空的静态扫描器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加组件描述符
    pub fn with_descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 添加类型模型
    pub fn with_type(mut self, model: TypeModel) -> Self {
        self.catalog.insert(model);
        self
    }
}

impl ComponentScanner for StaticScanner {
    fn scan(&self, config: &ScanConfig) -> ScanResult<ScanOutput> {
        config.validate()?;

        let mut descriptors = Vec::new();
        for descriptor in &self.descriptors {
            if config.is_scanned(&descriptor.identity) {
                descriptors.push(descriptor.clone());
            } else {
                trace!("组件 {} 不在扫描范围内, 已跳过", descriptor.identity);
            }
        }

        debug!(
            "静态扫描完成: {} 个候选中采集到 {} 个组件",
            self.descriptors.len(),
            descriptors.len()
        );

        Ok(ScanOutput {
            descriptors,
            catalog: self.catalog.clone(),
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_filters_by_boundaries() {
        let scanner = StaticScanner::new()
            .with_descriptor(ComponentDescriptor::new("app::ServiceA"))
            .with_descriptor(ComponentDescriptor::new("app::internal::Helper"))
            .with_descriptor(ComponentDescriptor::new("vendor::Driver"));

        let config = ScanConfig::builder()
            .include_boundary("app::")
            .exclude_boundary("app::internal::")
            .build()
            .unwrap();

        let output = scanner.scan(&config).unwrap();
        let identities: Vec<&str> = output
            .descriptors
            .iter()
            .map(|d| d.identity.as_str())
            .collect();
        assert_eq!(identities, vec!["app::ServiceA"]);
    }
}
