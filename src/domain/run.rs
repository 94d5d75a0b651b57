use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ContainerId, Sample};

/// Lifecycle of a polling session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Starting,
    Polling,
    /// Container still exists but is no longer running
    Stopped,
    /// Container was absent when polling started
    NotFound,
    /// Container disappeared while being polled
    Vanished,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::NotFound | Self::Vanished)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Stopped => "stopped",
            Self::NotFound => "not_found",
            Self::Vanished => "vanished",
        };
        f.write_str(label)
    }
}

/// Ordered samples of one polling session, append-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub container_id: ContainerId,
    samples: Vec<Sample>,
}

impl Run {
    pub fn new(container_id: ContainerId) -> Self {
        Self {
            container_id,
            samples: Vec::new(),
        }
    }

    /// Append a sample. Samples older than the latest one are rejected.
    pub fn push(&mut self, sample: Sample) -> bool {
        if let Some(last) = self.samples.last() {
            if sample.timepoint < last.timepoint {
                return false;
            }
        }
        self.samples.push(sample);
        true
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Final result of a polling session
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: RunState,
    pub run: Run,
}

impl RunReport {
    pub fn new(state: RunState, run: Run) -> Self {
        Self { state, run }
    }
}
