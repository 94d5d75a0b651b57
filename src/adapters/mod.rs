pub mod chart;
pub mod docker;
pub mod store;

pub use chart::PlottersChart;
pub use docker::DockerAdapter;
pub use store::FileSink;
