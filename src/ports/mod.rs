pub mod chart_renderer;
pub mod container_runtime;
pub mod run_sink;

pub use chart_renderer::ChartRenderer;
pub use container_runtime::{ContainerRuntime, RuntimeError};
pub use run_sink::{RunSink, SinkError, SinkResult};
