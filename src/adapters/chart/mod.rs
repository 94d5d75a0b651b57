mod plot;

pub use plot::PlottersChart;
