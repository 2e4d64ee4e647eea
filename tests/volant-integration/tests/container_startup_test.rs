//! 容器端到端集成测试
//!
//! 以静态扫描器和回调式激活器搭建完整的组件装配场景，覆盖启动序列、
//! 回调顺序、循环依赖、系统标签过滤、限定名解析与瞬时实例创建。

use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use volant_common::{
    ActivationError, ComponentDescriptor, InjectionPoint, RequiredType, ScanConfig, StartupError,
};
use volant_core::{CallbackActivator, ComponentBlueprint, Container, StaticScanner};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// 记录构造后回调执行顺序的共享日志
type CallbackLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default)]
struct UserRepository;

#[derive(Debug, Default)]
struct UserService {
    repo: OnceCell<Arc<UserRepository>>,
}

#[derive(Debug, Default)]
struct UserController {
    service: OnceCell<Arc<UserService>>,
}

/// 搭建三层链路 Controller -> Service -> Repository 的扫描器与激活器。
/// 描述符故意按依赖的反序登记，验证启动顺序只由依赖图决定。
fn three_tier_fixture(log: &CallbackLog) -> (StaticScanner, CallbackActivator) {
    let scanner = StaticScanner::new()
        .with_descriptor(
            ComponentDescriptor::new("shop::api::UserController")
                .with_injection_point(InjectionPoint::setter(
                    "set_user_service",
                    RequiredType::of("shop::service::UserService"),
                ))
                .with_post_construct("init"),
        )
        .with_descriptor(
            ComponentDescriptor::new("shop::service::UserService")
                .with_injection_point(InjectionPoint::setter(
                    "set_user_repository",
                    RequiredType::of("shop::repo::UserRepository"),
                ))
                .with_post_construct("init"),
        )
        .with_descriptor(
            ComponentDescriptor::new("shop::repo::UserRepository").with_post_construct("init"),
        );

    let repo_log = log.clone();
    let service_log = log.clone();
    let controller_log = log.clone();
    let activator = CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("shop::repo::UserRepository")
                .with_constructor(UserRepository::default)
                .with_callback("init", move |_: &UserRepository| {
                    repo_log.lock().unwrap().push("repo".to_string());
                    Ok(())
                }),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::service::UserService")
                .with_constructor(UserService::default)
                .with_setter(
                    "set_user_repository",
                    |service: &UserService, repo: Arc<UserRepository>| {
                        service.repo.set(repo).map_err(|_| {
                            ActivationError::injection(
                                "shop::service::UserService",
                                "set_user_repository",
                                "重复注入",
                            )
                        })
                    },
                )
                .with_callback("init", move |_: &UserService| {
                    service_log.lock().unwrap().push("service".to_string());
                    Ok(())
                }),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::api::UserController")
                .with_constructor(UserController::default)
                .with_setter(
                    "set_user_service",
                    |controller: &UserController, service: Arc<UserService>| {
                        controller.service.set(service).map_err(|_| {
                            ActivationError::injection(
                                "shop::api::UserController",
                                "set_user_service",
                                "重复注入",
                            )
                        })
                    },
                )
                .with_callback("init", move |_: &UserController| {
                    controller_log.lock().unwrap().push("controller".to_string());
                    Ok(())
                }),
        );

    (scanner, activator)
}

fn shop_config() -> ScanConfig {
    ScanConfig::builder().include_boundary("shop::").build().unwrap()
}

#[test]
fn startup_wires_chain_and_runs_callbacks_in_dependency_order() {
    init_tracing();
    let log: CallbackLog = Arc::new(Mutex::new(Vec::new()));
    let (scanner, activator) = three_tier_fixture(&log);

    let ready = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap();

    // 回调顺序由依赖图决定, 与描述符登记顺序无关
    assert_eq!(
        *log.lock().unwrap(),
        vec!["repo".to_string(), "service".to_string(), "controller".to_string()]
    );

    // 注入已经生效
    let controller = ready.get_typed::<UserController>("UserController").unwrap();
    let service = controller.service.get().unwrap();
    assert!(service.repo.get().is_some());

    assert_eq!(ready.all_instances().len(), 3);
}

#[test]
fn dependency_cycle_aborts_startup() {
    init_tracing();

    #[derive(Debug, Default)]
    struct CycleA {
        b: OnceCell<Arc<CycleB>>,
    }
    #[derive(Debug, Default)]
    struct CycleB {
        a: OnceCell<Arc<CycleA>>,
    }

    let scanner = StaticScanner::new()
        .with_descriptor(
            ComponentDescriptor::new("shop::CycleA").with_injection_point(InjectionPoint::setter(
                "set_b",
                RequiredType::of("shop::CycleB"),
            )),
        )
        .with_descriptor(
            ComponentDescriptor::new("shop::CycleB").with_injection_point(InjectionPoint::setter(
                "set_a",
                RequiredType::of("shop::CycleA"),
            )),
        );

    let activator = CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("shop::CycleA")
                .with_constructor(CycleA::default)
                .with_setter("set_b", |a: &CycleA, b: Arc<CycleB>| {
                    let _ = a.b.set(b);
                    Ok(())
                }),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::CycleB")
                .with_constructor(CycleB::default)
                .with_setter("set_a", |b: &CycleB, a: Arc<CycleA>| {
                    let _ = b.a.set(a);
                    Ok(())
                }),
        );

    let err = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap_err();

    match err {
        StartupError::Cycle { source } => {
            assert!(source.remaining.contains(&"shop::CycleA".to_string()));
            assert!(source.remaining.contains(&"shop::CycleB".to_string()));
        }
        other => panic!("期望循环依赖错误, 实际 {other:?}"),
    }
}

#[test]
fn depends_on_hint_orders_callbacks_without_injection_points() {
    init_tracing();
    let log: CallbackLog = Arc::new(Mutex::new(Vec::new()));

    #[derive(Debug, Default)]
    struct Early;
    #[derive(Debug, Default)]
    struct Late;

    // 两个组件之间没有任何注入点, 顺序只能来自静态依赖声明;
    // 依赖方故意先登记
    let scanner = StaticScanner::new()
        .with_descriptor(
            ComponentDescriptor::new("shop::Late")
                .with_depends_on("Early")
                .with_post_construct("init"),
        )
        .with_descriptor(ComponentDescriptor::new("shop::Early").with_post_construct("init"));

    let late_log = log.clone();
    let early_log = log.clone();
    let activator = CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("shop::Late")
                .with_constructor(Late::default)
                .with_callback("init", move |_: &Late| {
                    late_log.lock().unwrap().push("late".to_string());
                    Ok(())
                }),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::Early")
                .with_constructor(Early::default)
                .with_callback("init", move |_: &Early| {
                    early_log.lock().unwrap().push("early".to_string());
                    Ok(())
                }),
        );

    Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["early".to_string(), "late".to_string()]);
}

#[test]
fn missing_depends_on_name_is_fatal() {
    init_tracing();

    #[derive(Debug, Default)]
    struct Solo;

    let scanner = StaticScanner::new()
        .with_descriptor(ComponentDescriptor::new("shop::Solo").with_depends_on("ghost"));
    let activator = CallbackActivator::new().with_blueprint(
        ComponentBlueprint::new("shop::Solo").with_constructor(Solo::default),
    );

    let err = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap_err();

    match err {
        StartupError::DependsOnMissing { identity, dependency } => {
            assert_eq!(identity, "shop::Solo");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("期望静态依赖声明错误, 实际 {other:?}"),
    }
}

#[test]
fn component_without_default_constructor_is_fatal() {
    init_tracing();

    let scanner = StaticScanner::new()
        .with_descriptor(ComponentDescriptor::new("shop::Manual").without_default_constructor());
    // 实例化在检查之前不会发生, 激活器无需登记蓝图
    let activator = CallbackActivator::new();

    let err = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap_err();

    assert!(matches!(err, StartupError::NoDefaultConstructor { .. }));
}

#[test]
fn system_tag_filters_out_foreign_components() {
    init_tracing();

    #[derive(Debug, Default)]
    struct WebHandler;
    #[derive(Debug, Default)]
    struct BatchJob;

    let scanner = StaticScanner::new()
        .with_descriptor(ComponentDescriptor::new("shop::WebHandler").with_system_tag("WEB"))
        .with_descriptor(ComponentDescriptor::new("shop::BatchJob").with_system_tag("batch"));

    let activator = CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("shop::WebHandler").with_constructor(WebHandler::default),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::BatchJob").with_constructor(BatchJob::default),
        );

    let config = ScanConfig::builder()
        .include_boundary("shop::")
        .system_tag("web")
        .build()
        .unwrap();

    let ready = Container::builder()
        .with_config(config)
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap();

    // 标签比较不区分大小写: WEB 命中 web, batch 被过滤
    assert!(ready.get_by_name("WebHandler").is_some());
    assert!(ready.get_by_name("BatchJob").is_none());
    assert_eq!(ready.all_instances().len(), 1);
}

#[test]
fn qualifier_selects_named_candidate() {
    init_tracing();

    #[derive(Debug, Default)]
    struct MemoryCache;
    #[derive(Debug, Default)]
    struct DiskCache;
    #[derive(Debug, Default)]
    struct ReportService {
        cache: OnceCell<Arc<DiskCache>>,
    }

    let scanner = StaticScanner::new()
        .with_descriptor(ComponentDescriptor::new("shop::cache::MemoryCache").with_name("memoryCache"))
        .with_descriptor(ComponentDescriptor::new("shop::cache::DiskCache").with_name("diskCache"))
        .with_descriptor(
            ComponentDescriptor::new("shop::ReportService").with_injection_point(
                InjectionPoint::setter("set_cache", RequiredType::of("shop::cache::Cache"))
                    .with_qualifier("diskCache"),
            ),
        );

    let activator = CallbackActivator::new()
        .with_blueprint(
            ComponentBlueprint::new("shop::cache::MemoryCache")
                .with_constructor(MemoryCache::default),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::cache::DiskCache").with_constructor(DiskCache::default),
        )
        .with_blueprint(
            ComponentBlueprint::new("shop::ReportService")
                .with_constructor(ReportService::default)
                .with_setter("set_cache", |service: &ReportService, cache: Arc<DiskCache>| {
                    let _ = service.cache.set(cache);
                    Ok(())
                }),
        );

    let ready = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap();

    let service = ready.get_typed::<ReportService>("ReportService").unwrap();
    assert!(service.cache.get().is_some());
}

#[test]
fn transient_instances_are_wired_but_never_registered() {
    init_tracing();
    let log: CallbackLog = Arc::new(Mutex::new(Vec::new()));
    let (scanner, activator) = three_tier_fixture(&log);

    let ready = Container::builder()
        .with_config(shop_config())
        .with_scanner(scanner)
        .with_activator(activator)
        .build()
        .unwrap()
        .start()
        .unwrap();
    let registered = ready.all_instances().len();
    let callbacks_after_startup = log.lock().unwrap().len();

    let transient = ready.create_transient("shop::service::UserService").unwrap();
    let transient = transient.downcast::<UserService>().ok().unwrap();

    // 瞬时实例走同样的注入与回调路径
    assert!(transient.repo.get().is_some());
    assert_eq!(log.lock().unwrap().len(), callbacks_after_startup + 1);

    // 但从不进入注册表, 与单例是不同的实例
    assert_eq!(ready.all_instances().len(), registered);
    let singleton = ready.get_typed::<UserService>("UserService").unwrap();
    assert!(!Arc::ptr_eq(&singleton, &transient));

    // 未知类型报错而不是 panic
    let err = ready.create_transient("shop::Nope").unwrap_err();
    assert!(matches!(err, StartupError::UnknownComponent { .. }));
}
