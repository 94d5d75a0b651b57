use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::RetryPolicy;
use crate::domain::{Container, ContainerId, Run, RunReport, RunState, COLUMNS};
use crate::error::{MonitorError, MonitorResult};
use crate::ports::{ChartRenderer, ContainerRuntime, RunSink, RuntimeError};

use super::SnapshotSampler;

/// Polls one container until it stops or disappears, then exports the run
pub struct MonitoringService {
    runtime: Arc<dyn ContainerRuntime>,
    sampler: SnapshotSampler,
    sink: Box<dyn RunSink>,
    chart: Box<dyn ChartRenderer>,
    poll_interval: Duration,
}

impl MonitoringService {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        sink: Box<dyn RunSink>,
        chart: Box<dyn ChartRenderer>,
        poll_interval: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            sampler: SnapshotSampler::new(runtime.clone(), retry),
            runtime,
            sink,
            chart,
            poll_interval,
        }
    }

    /// Run a full polling session for `id`.
    ///
    /// Returns the terminal state together with the samples taken. A missing
    /// container is reported through the state, not as an error; query and
    /// sink failures abort the session.
    pub async fn run(&mut self, id: &ContainerId) -> MonitorResult<RunReport> {
        let span = info_span!("run", container_id = %id);
        self.poll(id).instrument(span).await
    }

    async fn poll(&mut self, id: &ContainerId) -> MonitorResult<RunReport> {
        let mut state = RunState::Starting;
        let mut run = Run::new(id.clone());

        let container = match self.resolve(id).await? {
            Some(container) => container,
            None => {
                // No name to go by, so the header-only record is named after the ID
                self.sink.write_header(id.as_str(), &COLUMNS)?;
                transition(&mut state, RunState::NotFound);
                return Ok(RunReport::new(state, run));
            }
        };

        info!("Monitoring {} ({}) every {:?}", container.name, container.image, self.poll_interval);
        self.sink.write_header(&container.name, &COLUMNS)?;
        transition(&mut state, RunState::Polling);

        while !state.is_terminal() {
            let current = match self.resolve(id).await? {
                Some(current) => current,
                None => {
                    transition(&mut state, RunState::Vanished);
                    break;
                }
            };
            if !current.is_running() {
                info!("Container {} is {}, stopping", current.name, current.state);
                transition(&mut state, RunState::Stopped);
                break;
            }

            let sample = self.sampler.sample(&current.id).await?;
            if run.push(sample) {
                self.sink.append(run.samples())?;
            } else {
                warn!("Dropped a sample older than the previous one");
            }

            println!("{} {} {}", current.name, current.image, current.state);
            tokio::time::sleep(self.poll_interval).await;
        }

        self.finish(&container, &run)?;
        Ok(RunReport::new(state, run))
    }

    /// Look the container up; `None` when the daemon reports it missing
    async fn resolve(&self, id: &ContainerId) -> MonitorResult<Option<Container>> {
        match self.runtime.inspect(id).await {
            Ok(container) => Ok(Some(container)),
            Err(err @ RuntimeError::NotFound(_)) => {
                error!("[{}] {}", id, err);
                Ok(None)
            }
            Err(source) => Err(MonitorError::Runtime { id: id.clone(), source }),
        }
    }

    fn finish(&mut self, container: &Container, run: &Run) -> MonitorResult<()> {
        self.sink.export(run.samples())?;
        if run.is_empty() {
            info!("No samples collected, skipping chart");
            return Ok(());
        }
        self.chart.render(&container.name, run.samples())?;
        Ok(())
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = %state, to = %next, "Run state change");
    *state = next;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::FileSink;
    use crate::config::RecordMode;
    use crate::domain::{ContainerState, Sample};
    use crate::ports::{SinkError, SinkResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;

    const TABLE: &str = "CONTAINER ID   NAME   CPU %   MEM USAGE / LIMIT   MEM %   NET I/O   BLOCK I/O   PIDS\n\
                         abc   web   12.5%   512MiB / 1GiB   3.02%   1.2kB / 800B   10.5MB / 2GB   7\n";

    /// Lookup outcome for one `inspect` call
    pub(crate) enum Lookup {
        Running,
        Exited,
        Missing,
        Broken,
    }

    /// Runtime that replays scripted lookups and stats outputs in order.
    /// Exhausted lookups report the container missing; exhausted stats
    /// return a valid table.
    pub(crate) struct ScriptedRuntime {
        lookups: Mutex<VecDeque<Lookup>>,
        stats: Mutex<VecDeque<Result<String, String>>>,
        stats_calls: AtomicUsize,
    }

    impl ScriptedRuntime {
        pub(crate) fn new(lookups: Vec<Lookup>) -> Self {
            Self {
                lookups: Mutex::new(lookups.into()),
                stats: Mutex::new(VecDeque::new()),
                stats_calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn with_stats(self, stats: Vec<Result<String, String>>) -> Self {
            *self.stats.lock().unwrap() = stats.into();
            self
        }

        pub(crate) fn stats_calls(&self) -> usize {
            self.stats_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContainerRuntime for ScriptedRuntime {
        async fn inspect(&self, id: &ContainerId) -> Result<Container, RuntimeError> {
            let state = match self.lookups.lock().unwrap().pop_front() {
                Some(Lookup::Running) => ContainerState::Running,
                Some(Lookup::Exited) => ContainerState::Stopped,
                Some(Lookup::Broken) => {
                    return Err(RuntimeError::Docker("connection reset".to_string()));
                }
                Some(Lookup::Missing) | None => return Err(RuntimeError::NotFound(id.to_string())),
            };
            Ok(Container::new(id.clone(), "web", "nginx:latest", state))
        }

        async fn stats_table(&self, _id: &ContainerId) -> Result<String, RuntimeError> {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            match self.stats.lock().unwrap().pop_front() {
                Some(Ok(table)) => Ok(table),
                Some(Err(reason)) => Err(RuntimeError::Query(reason)),
                None => Ok(TABLE.to_string()),
            }
        }
    }

    #[derive(Debug, Default)]
    struct SinkLog {
        headers: Vec<String>,
        appends: Vec<usize>,
        exports: Vec<usize>,
        charts: Vec<(String, usize)>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<SinkLog>>);

    impl Recorder {
        fn log(&self) -> std::sync::MutexGuard<'_, SinkLog> {
            self.0.lock().unwrap()
        }
    }

    impl RunSink for Recorder {
        fn write_header(&mut self, stem: &str, columns: &[&str]) -> SinkResult<()> {
            assert_eq!(columns.len(), 12);
            self.log().headers.push(stem.to_string());
            Ok(())
        }

        fn append(&mut self, samples: &[Sample]) -> SinkResult<()> {
            self.log().appends.push(samples.len());
            Ok(())
        }

        fn export(&mut self, samples: &[Sample]) -> SinkResult<()> {
            self.log().exports.push(samples.len());
            Ok(())
        }
    }

    impl ChartRenderer for Recorder {
        fn render(&self, stem: &str, samples: &[Sample]) -> SinkResult<()> {
            if samples.is_empty() {
                return Err(SinkError::Chart("no samples to plot".to_string()));
            }
            self.log().charts.push((stem.to_string(), samples.len()));
            Ok(())
        }
    }

    fn service(runtime: ScriptedRuntime, retry: RetryPolicy) -> (MonitoringService, Recorder) {
        let recorder = Recorder::default();
        let service = MonitoringService::new(
            Arc::new(runtime),
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
            Duration::ZERO,
            retry,
        );
        (service, recorder)
    }

    #[tokio::test]
    async fn test_two_ticks_then_stopped() {
        let runtime = ScriptedRuntime::new(vec![
            Lookup::Running,
            Lookup::Running,
            Lookup::Running,
            Lookup::Exited,
        ]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::Stopped);
        assert_eq!(report.run.len(), 2);
        let log = recorder.log();
        assert_eq!(log.headers, vec!["web".to_string()]);
        assert_eq!(log.appends, vec![1, 2]);
        assert_eq!(log.exports, vec![2]);
        assert_eq!(log.charts, vec![("web".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_absent_at_start() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Missing]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::NotFound);
        assert!(report.run.is_empty());
        let log = recorder.log();
        assert_eq!(log.headers, vec!["abc".to_string()]);
        assert!(log.appends.is_empty());
        assert!(log.exports.is_empty());
        assert!(log.charts.is_empty());
    }

    #[tokio::test]
    async fn test_vanishes_after_first_tick() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Running, Lookup::Running, Lookup::Missing]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::Vanished);
        assert_eq!(report.run.len(), 1);
        let log = recorder.log();
        assert_eq!(log.exports, vec![1]);
        assert_eq!(log.charts, vec![("web".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_stopped_before_first_sample_skips_chart() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Exited, Lookup::Exited]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::Stopped);
        assert!(report.run.is_empty());
        let log = recorder.log();
        assert_eq!(log.headers, vec!["web".to_string()]);
        assert_eq!(log.exports, vec![0]);
        assert!(log.charts.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_aborts_without_export() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Running, Lookup::Running, Lookup::Running])
            .with_stats(vec![Ok(TABLE.to_string()), Err("cannot connect".to_string())]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let err = service.run(&ContainerId::new("abc")).await.unwrap_err();

        assert!(matches!(err, MonitorError::QueryFailed { .. }));
        let log = recorder.log();
        assert_eq!(log.appends, vec![1]);
        assert!(log.exports.is_empty());
        assert!(log.charts.is_empty());
    }

    #[tokio::test]
    async fn test_retry_policy_keeps_the_run_alive() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Running, Lookup::Running, Lookup::Exited])
            .with_stats(vec![Err("cannot connect".to_string())]);
        let (mut service, recorder) = service(runtime, RetryPolicy::new(1, Duration::ZERO));

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::Stopped);
        assert_eq!(report.run.len(), 1);
        assert_eq!(recorder.log().exports, vec![1]);
    }

    #[tokio::test]
    async fn test_daemon_error_propagates() {
        let runtime = ScriptedRuntime::new(vec![Lookup::Broken]);
        let (mut service, recorder) = service(runtime, RetryPolicy::none());

        let err = service.run(&ContainerId::new("abc")).await.unwrap_err();

        assert!(matches!(err, MonitorError::Runtime { .. }));
        assert!(recorder.log().headers.is_empty());
    }

    #[tokio::test]
    async fn test_files_for_a_two_tick_run() {
        let dir = tempdir().unwrap();
        let chart = Recorder::default();
        let runtime = ScriptedRuntime::new(vec![
            Lookup::Running,
            Lookup::Running,
            Lookup::Running,
            Lookup::Exited,
        ]);
        let mut service = MonitoringService::new(
            Arc::new(runtime),
            Box::new(FileSink::new(dir.path(), RecordMode::Cumulative)),
            Box::new(chart.clone()),
            Duration::ZERO,
            RetryPolicy::none(),
        );

        let report = service.run(&ContainerId::new("abc")).await.unwrap();
        assert_eq!(report.run.len(), 2);

        let record = fs::read_to_string(dir.path().join("web.txt")).unwrap();
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(record.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), COLUMNS.len());
        let widths: Vec<usize> = reader.records().map(|r| r.unwrap().len()).collect();
        assert_eq!(widths, vec![1, 2]);

        assert!(dir.path().join("web.xlsx").is_file());
        assert_eq!(chart.log().charts, vec![("web".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_absent_at_start_leaves_header_only_record() {
        let dir = tempdir().unwrap();
        let mut service = MonitoringService::new(
            Arc::new(ScriptedRuntime::new(vec![])),
            Box::new(FileSink::new(dir.path(), RecordMode::Cumulative)),
            Box::new(Recorder::default()),
            Duration::ZERO,
            RetryPolicy::none(),
        );

        let report = service.run(&ContainerId::new("abc")).await.unwrap();

        assert_eq!(report.state, RunState::NotFound);
        let record = fs::read_to_string(dir.path().join("abc.txt")).unwrap();
        assert_eq!(record.lines().count(), 1);
        assert!(!dir.path().join("abc.xlsx").exists());
    }
}
