//! Image analysis scopes.

pub mod histogram;

pub use histogram::{ChannelAnalysis, ChannelStats, Histogram, HistogramAnalysis};
