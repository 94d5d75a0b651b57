use std::sync::Arc;

use chrono::Local;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::domain::{ContainerId, Sample};
use crate::error::{MonitorError, MonitorResult};
use crate::ports::ContainerRuntime;

/// Takes one timestamped, normalized sample per call
pub struct SnapshotSampler {
    runtime: Arc<dyn ContainerRuntime>,
    retry: RetryPolicy,
}

impl SnapshotSampler {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, retry: RetryPolicy) -> Self {
        Self { runtime, retry }
    }

    /// Query and parse the stats table, retrying up to the policy's limit
    pub async fn sample(&self, id: &ContainerId) -> MonitorResult<Sample> {
        let mut attempt = 0;
        loop {
            match self.try_sample(id).await {
                Ok(sample) => return Ok(sample),
                Err(reason) if attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(
                        "Stats query failed ({}), retry {}/{} in {:?}",
                        reason, attempt, self.retry.max_retries, self.retry.delay
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(reason) => {
                    return Err(MonitorError::QueryFailed {
                        id: id.clone(),
                        reason,
                    })
                }
            }
        }
    }

    async fn try_sample(&self, id: &ContainerId) -> Result<Sample, String> {
        // Sampling time, not arrival time
        let timepoint = Local::now();
        let output = self.runtime.stats_table(id).await.map_err(|e| e.to_string())?;
        let sample = Sample::parse_output(&output, timepoint).map_err(|e| e.to_string())?;
        debug!(cpu = sample.cpu_percent, mem_mb = sample.mem_usage, pids = sample.pids, "Sampled");
        Ok(sample)
    }
}
