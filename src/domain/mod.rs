pub mod container;
pub mod run;
pub mod sample;
pub mod units;

pub use container::{Container, ContainerId, ContainerState};
pub use run::{Run, RunReport, RunState};
pub use sample::{Sample, COLUMNS};
