//! Histogram and per-channel statistics over the 0–255 value range.
//!
//! Binning matches the usual half-open convention: `bins` equal-width bins
//! over `[0, 255]`, the last bin closed so that 255 is counted. Values
//! outside the range are ignored.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::channel::{ChannelSelector, LUMA_REC601, luma};

pub const MIN_BINS: usize = 64;
pub const MAX_BINS: usize = 1024;
pub const DEFAULT_BINS: usize = 256;

const RANGE_MAX: f32 = 255.0;

/// Bin counts over `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    #[serde(rename = "histogram")]
    pub counts: Vec<u64>,
    /// `bins + 1` edges from 0 to 255.
    pub bin_edges: Vec<f32>,
    /// Number of samples offered, including any that fell outside the range.
    #[serde(rename = "total_pixels")]
    pub total: usize,
}

impl Histogram {
    /// Bin `values` (0–255 scale). `bins` is clamped to at least 1.
    pub fn compute(values: impl IntoIterator<Item = f32>, bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0u64; bins];
        let mut total = 0;
        for v in values {
            total += 1;
            if !(0.0..=RANGE_MAX).contains(&v) {
                continue;
            }
            let idx = ((v / RANGE_MAX * bins as f32) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let bin_edges = (0..=bins).map(|i| i as f32 * RANGE_MAX / bins as f32).collect();
        Self {
            counts,
            bin_edges,
            total,
        }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_centers(&self) -> Vec<f32> {
        self.bin_edges.windows(2).map(|w| (w[0] + w[1]) * 0.5).collect()
    }

    pub fn peak(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Normalised cumulative distribution. All zeros for an empty histogram.
    pub fn cdf(&self) -> Vec<f64> {
        let sum: u64 = self.counts.iter().sum();
        let mut acc = 0u64;
        self.counts
            .iter()
            .map(|&c| {
                acc += c;
                if sum == 0 { 0.0 } else { acc as f64 / sum as f64 }
            })
            .collect()
    }

    /// Left edge of the first bin whose CDF reaches `fraction`.
    pub fn quantile_edge(&self, fraction: f64) -> f32 {
        self.cdf()
            .iter()
            .position(|&c| c >= fraction)
            .map_or(RANGE_MAX, |i| self.bin_edges[i])
    }
}

/// Descriptive statistics of one channel (0–255 scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Biased sample skewness; 0 for constant data.
    pub skewness: f64,
    /// Excess (Fisher) kurtosis; 0 for constant data.
    pub kurtosis: f64,
}

impl ChannelStats {
    /// `None` for an empty sample.
    pub fn compute(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) * 0.5
        } else {
            sorted[mid]
        };

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for v in &sorted {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let (skewness, kurtosis) = if m2 > 1e-12 {
            (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
        } else {
            (0.0, 0.0)
        };
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Some(Self {
            mean,
            median,
            std: m2.sqrt(),
            min,
            max,
            range: max - min,
            skewness,
            kurtosis,
        })
    }
}

/// One analysed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelAnalysis {
    /// `R`, `G`, `B`, `Luminance` or `Gray`.
    pub label: &'static str,
    pub histogram: Histogram,
    pub stats: Option<ChannelStats>,
}

/// Histogram and statistics for the channels picked by a selector.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAnalysis {
    pub channels: Vec<ChannelAnalysis>,
}

/// Samples of the selected channel(s) scaled to 0–255 and clamped.
///
/// `Rgb` yields three planes; gray images yield their single plane.
pub fn channel_samples(image: &PixelBuffer, selector: ChannelSelector) -> Vec<(&'static str, Vec<f32>)> {
    let scaled = |v: f32| (v * RANGE_MAX).clamp(0.0, RANGE_MAX);
    let plane = |c: usize| image.pixels().map(|px| scaled(px[c])).collect::<Vec<_>>();

    if image.color_channels() < 3 {
        return vec![("Gray", plane(0))];
    }
    match selector {
        ChannelSelector::Rgb => vec![("R", plane(0)), ("G", plane(1)), ("B", plane(2))],
        ChannelSelector::Red => vec![("R", plane(0))],
        ChannelSelector::Green => vec![("G", plane(1))],
        ChannelSelector::Blue => vec![("B", plane(2))],
        ChannelSelector::Luminance => vec![(
            "Luminance",
            image.pixels().map(|px| scaled(luma(px, LUMA_REC601))).collect(),
        )],
    }
}

impl HistogramAnalysis {
    /// Analyse `image`. `bins` is clamped to `[MIN_BINS, MAX_BINS]`.
    pub fn analyze(image: &PixelBuffer, selector: ChannelSelector, bins: usize) -> Self {
        let bins = bins.clamp(MIN_BINS, MAX_BINS);
        let channels = channel_samples(image, selector)
            .into_iter()
            .map(|(label, samples)| ChannelAnalysis {
                label,
                stats: ChannelStats::compute(&samples),
                histogram: Histogram::compute(samples, bins),
            })
            .collect();
        Self { channels }
    }

    /// `{ "<label>": { histogram, bin_edges, total_pixels } }`, pretty-printed.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let map: BTreeMap<&str, &Histogram> =
            self.channels.iter().map(|c| (c.label, &c.histogram)).collect();
        serde_json::to_string_pretty(&map)
    }

    /// One row per bin: centre followed by each channel's count.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Bin_Center");
        for c in &self.channels {
            let _ = write!(out, ",{}_Count", long_label(c.label, self.channels.len()));
        }
        let Some(first) = self.channels.first() else {
            return out;
        };
        for (i, center) in first.histogram.bin_centers().iter().enumerate() {
            let _ = write!(out, "\n{center:.1}");
            for c in &self.channels {
                let _ = write!(out, ",{}", c.histogram.counts[i]);
            }
        }
        out
    }

    /// Human-readable statistics block per channel.
    pub fn statistics_report(&self) -> String {
        let mut out = String::new();
        for c in &self.channels {
            let Some(s) = &c.stats else {
                let _ = writeln!(out, "{} Channel Statistics: no samples\n", c.label);
                continue;
            };
            let _ = writeln!(out, "{} Channel Statistics:", c.label);
            let _ = writeln!(out, "  Mean: {:.2}", s.mean);
            let _ = writeln!(out, "  Median: {:.2}", s.median);
            let _ = writeln!(out, "  Std Dev: {:.2}", s.std);
            let _ = writeln!(out, "  Min: {:.0}", s.min);
            let _ = writeln!(out, "  Max: {:.0}", s.max);
            let _ = writeln!(out, "  Range: {:.0}", s.range);
            let _ = writeln!(out, "  Skewness: {:.3}", s.skewness);
            let _ = writeln!(out, "  Kurtosis: {:.3}", s.kurtosis);
            out.push('\n');
        }
        out
    }
}

fn long_label(label: &str, channel_count: usize) -> &str {
    if channel_count == 1 {
        return label;
    }
    match label {
        "R" => "Red",
        "G" => "Green",
        "B" => "Blue",
        other => other,
    }
}
