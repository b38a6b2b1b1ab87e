//! Performance analytics over closed trade history.

mod calculator;

pub use calculator::PerformanceCalculator;
