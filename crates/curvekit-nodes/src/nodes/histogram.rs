//! Histogram analysis. The image passes through unchanged; the analysis is a
//! side output.

use curvekit_core::scopes::HistogramAnalysis;
use curvekit_core::scopes::histogram::DEFAULT_BINS;
use curvekit_core::{ChannelSelector, Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::node::{Node, NodeContext};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub channel: ChannelSelector,
    /// Clamped to `[64, 1024]`.
    pub histogram_bins: usize,
    pub show_statistics: bool,
    /// Include the CSV table in the report.
    pub export_data: bool,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSelector::Rgb,
            histogram_bins: DEFAULT_BINS,
            show_statistics: true,
            export_data: false,
        }
    }
}

/// Text outputs of one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramReport {
    pub analysis: HistogramAnalysis,
    /// Histogram data as JSON.
    pub data: String,
    pub statistics: Option<String>,
    /// CSV table, when exporting.
    pub raw_data: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HistogramNode {
    config: HistogramConfig,
}

impl HistogramNode {
    pub fn new(config: HistogramConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, image: &PixelBuffer) -> HistogramAnalysis {
        HistogramAnalysis::analyze(image, self.config.channel, self.config.histogram_bins)
    }

    pub fn report(&self, image: &PixelBuffer) -> Result<HistogramReport, NodeError> {
        let analysis = self.analyze(image);
        Ok(HistogramReport {
            data: analysis.to_json().map_err(NodeError::Report)?,
            statistics: self.config.show_statistics.then(|| analysis.statistics_report()),
            raw_data: self.config.export_data.then(|| analysis.to_csv()),
            analysis,
        })
    }
}

impl Node for HistogramNode {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn process(&self, image: &PixelBuffer, _mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        Ok(image.clone())
    }
}
