//! Exploratory data analysis: summary statistics over a [`Frame`] and
//! terminal renderings of them (bar charts, heatmaps, scatter grids).
//!
//! [`Frame`]: rebalance_io::Frame

pub mod stats;
pub mod plot;

pub use stats::*;
pub use plot::*;
