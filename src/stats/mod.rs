//! Stats module - price summaries and binning

mod calculator;

pub use calculator::{BinEdges, GroupStats, PriceSummary, StatsCalculator};
