//! # 组件装配演示程序
//!
//! 演示如何使用 Volant 容器完成组件发现、依赖注入与生命周期回调：
//! 以静态扫描器登记一个三层组件链，启动容器后按名称与类型查询实例，
//! 最后创建一个瞬时实例对比单例语义。

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use once_cell::sync::OnceCell;
use tracing::{info, Level};
use volant_common::{ComponentDescriptor, InjectionPoint, RequiredType, ScanConfig};
use volant_core::{CallbackActivator, ComponentBlueprint, Container, StaticScanner};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "wiring-demo")]
#[command(about = "Volant 组件容器演示")]
struct Args {
    /// 扫描配置文件路径（TOML 格式）
    #[arg(short, long, default_value = "config/scan.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 消息仓储组件
#[derive(Debug, Default)]
struct MessageRepository;

impl MessageRepository {
    fn fetch(&self) -> &'static str {
        "你好, Volant"
    }
}

/// 问候服务组件，依赖消息仓储
#[derive(Debug, Default)]
struct GreetingService {
    repository: OnceCell<Arc<MessageRepository>>,
}

impl GreetingService {
    fn greet(&self) -> String {
        match self.repository.get() {
            Some(repository) => repository.fetch().to_string(),
            None => "仓储未注入".to_string(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    info!("启动 Volant 组件装配演示");

    let config = load_scan_config(&args.config)?;
    let scanner = build_scanner();
    let activator = build_activator();

    let ready = Container::builder()
        .with_config(config)
        .with_scanner(scanner)
        .with_activator(activator)
        .build()?
        .start()?;

    info!("容器已就绪, 已注册组件: {:?}", ready.all_names());

    // 按名称查询并向下转型
    let service = ready
        .get_typed::<GreetingService>("GreetingService")
        .context("未找到问候服务")?;
    info!("问候服务输出: {}", service.greet());

    // 按类型查询
    let by_type = ready.get_by_type("demo::MessageRepository");
    info!("按类型查询消息仓储: {}", by_type.is_some());

    // 瞬时实例: 注入与回调照常执行, 但不进入注册表
    let transient = ready.create_transient("demo::GreetingService")?;
    let transient = transient
        .downcast::<GreetingService>()
        .ok()
        .context("瞬时实例类型转换失败")?;
    info!("瞬时实例输出: {}", transient.greet());
    info!(
        "瞬时实例与单例是否同一实例: {}",
        Arc::ptr_eq(&service, &transient)
    );

    info!("演示结束");
    Ok(())
}

/// 加载扫描配置，文件不存在时退回默认边界
fn load_scan_config(path: &str) -> anyhow::Result<ScanConfig> {
    if std::path::Path::new(path).exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {path}"))?;
        let config: ScanConfig =
            toml::from_str(&raw).with_context(|| format!("解析配置文件失败: {path}"))?;
        config.validate()?;
        info!("已从 {} 加载扫描配置", path);
        Ok(config)
    } else {
        info!("配置文件 {} 不存在, 使用默认扫描边界 demo::", path);
        Ok(ScanConfig::builder().include_boundary("demo::").build()?)
    }
}

/// 登记演示组件的描述符
fn build_scanner() -> StaticScanner {
    StaticScanner::new()
        .with_descriptor(ComponentDescriptor::new("demo::MessageRepository"))
        .with_descriptor(
            ComponentDescriptor::new("demo::GreetingService")
                .with_injection_point(InjectionPoint::setter(
                    "set_message_repository",
                    RequiredType::of("demo::MessageRepository"),
                ))
                .with_post_construct("init"),
        )
}

/// 登记演示组件的构造、注入与回调闭包
fn build_activator() -> CallbackActivator {
    CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("demo::MessageRepository")
                .with_constructor(MessageRepository::default),
        )
        .with_blueprint(
            ComponentBlueprint::new("demo::GreetingService")
                .with_constructor(GreetingService::default)
                .with_setter(
                    "set_message_repository",
                    |service: &GreetingService, repository: Arc<MessageRepository>| {
                        let _ = service.repository.set(repository);
                        Ok(())
                    },
                )
                .with_callback("init", |_: &GreetingService| {
                    info!("问候服务构造后回调已执行");
                    Ok(())
                }),
        )
}

/// 解析日志级别
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
