use crate::domain::Sample;

use super::run_sink::SinkResult;

/// Port for drawing the summary chart of a finished run
pub trait ChartRenderer {
    /// Render `samples` to an image named after `stem`
    fn render(&self, stem: &str, samples: &[Sample]) -> SinkResult<()>;
}
