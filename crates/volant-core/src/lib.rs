//! # Volant 容器核心实现
//!
//! 提供组件注册表、依赖图、依赖解析器以及容器启动编排器的具体实现。
//!
//! 典型用法：
//!
//! ```ignore
//! let container = Container::builder()
//!     .with_config(config)
//!     .with_scanner(scanner)
//!     .with_activator(activator)
//!     .build()?;
//! let ready = container.start()?;
//! let service = ready.get_typed::<OrderService>("orderService");
//! ```

pub mod activator;
pub mod graph;
pub mod orchestrator;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use activator::{CallbackActivator, ComponentBlueprint};
pub use graph::DependencyGraph;
pub use orchestrator::{Container, ContainerBuilder, ReadyContainer, StartupPhase};
pub use registry::{ComponentRegistry, RegisteredComponent};
pub use resolver::DependencyResolver;
pub use scanner::StaticScanner;
