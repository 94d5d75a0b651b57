mod monitoring;
mod sampler;

pub use monitoring::MonitoringService;
pub use sampler::SnapshotSampler;
