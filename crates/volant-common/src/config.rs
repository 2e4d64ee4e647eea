//! 扫描配置定义
//!
//! 配置容器的扫描边界（包含/排除的模块前缀）与系统标签，
//! 可通过 serde 从 TOML/JSON 配置文件加载。

use crate::errors::ScanError;
use crate::metadata::ComponentIdentity;
use serde::{Deserialize, Serialize};

/// 扫描配置
///
/// `scan_boundaries` 不能为空；通过 [`ScanConfig::builder`] 构建时会校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 包含的模块前缀，组件标识以任一前缀开头即视为处于扫描范围内
    pub scan_boundaries: Vec<String>,
    /// 排除的模块前缀，仅在扫描阶段过滤候选组件
    #[serde(default)]
    pub exclude_boundaries: Vec<String>,
    /// 系统标签，用于过滤带标签的组件；空字符串表示不过滤
    #[serde(default)]
    pub system_tag: String,
}

impl ScanConfig {
    /// 创建扫描配置构建器
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// 获取系统标签
    pub fn system_tag(&self) -> &str {
        &self.system_tag
    }

    /// 判断组件标识是否处于配置的扫描范围内
    ///
    /// 只检查包含前缀。依赖图的边过滤使用这个判定：两个端点都在
    /// 范围内时才记录边。
    pub fn is_in_scope(&self, identity: &ComponentIdentity) -> bool {
        self.scan_boundaries
            .iter()
            .any(|prefix| identity.as_str().starts_with(prefix.as_str()))
    }

    /// 判断组件标识是否应被扫描器采集
    ///
    /// 在包含前缀之上再应用排除前缀，仅供扫描阶段使用。
    pub fn is_scanned(&self, identity: &ComponentIdentity) -> bool {
        self.is_in_scope(identity)
            && !self
                .exclude_boundaries
                .iter()
                .any(|prefix| identity.as_str().starts_with(prefix.as_str()))
    }

    /// 校验配置自身的有效性
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.scan_boundaries.is_empty() {
            return Err(ScanError::EmptyScanBoundaries);
        }
        Ok(())
    }
}

/// 扫描配置构建器
#[derive(Debug, Default)]
pub struct ScanConfigBuilder {
    scan_boundaries: Vec<String>,
    exclude_boundaries: Vec<String>,
    system_tag: String,
}

impl ScanConfigBuilder {
    /// 添加包含的模块前缀
    pub fn include_boundary(mut self, prefix: impl Into<String>) -> Self {
        self.scan_boundaries.push(prefix.into());
        self
    }

    /// 添加排除的模块前缀
    pub fn exclude_boundary(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_boundaries.push(prefix.into());
        self
    }

    /// 设置系统标签
    pub fn system_tag(mut self, tag: impl Into<String>) -> Self {
        self.system_tag = tag.into();
        self
    }

    /// 构建扫描配置，扫描边界为空时返回错误
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        let config = ScanConfig {
            scan_boundaries: self.scan_boundaries,
            exclude_boundaries: self.exclude_boundaries,
            system_tag: self.system_tag,
        };
        config.validate()?;
        Ok(config)
    }
}
