//! Label sets for generated series.

use crate::churn::generation_id;
use crate::config::GenerationConfig;
use crate::types::{Label, Rank, Timestamp};

/// Reserved label carrying the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Metric name shared by every generated series.
pub const METRIC_NAME: &str = "cortex_load_generator_sine_wave";

/// Label carrying the series rank.
pub const WAVE_LABEL: &str = "wave";

/// Suffix of the churn label; the full name is `label_prefix + CHURN_LABEL_SUFFIX`.
pub const CHURN_LABEL_SUFFIX: &str = "churn";

/// Number of host addresses in `10.0.0.0/8`.
const IPV4_HOST_SPACE: Rank = 1 << 24;

/// How a metadata label derives its value from the series rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataValue {
    /// `"{stem}-{rank}"`.
    Named(&'static str),
    /// The low 24 bits of the rank rendered as an address in `10.0.0.0/8`.
    ///
    /// The `/8` holds 2^24 addresses, so ranks that differ by a multiple of 2^24 share one.
    Ipv4,
}

/// One entry of the metadata label pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataLabel {
    pub suffix: &'static str,
    pub value: MetadataValue,
}

impl MetadataLabel {
    const fn named(suffix: &'static str, stem: &'static str) -> Self {
        MetadataLabel {
            suffix,
            value: MetadataValue::Named(stem),
        }
    }

    /// Value for `rank`. Depends on the rank only, so it never changes between ticks.
    pub fn value_for(&self, rank: Rank) -> String {
        match self.value {
            MetadataValue::Named(stem) => format!("{}-{}", stem, rank),
            MetadataValue::Ipv4 => {
                let r = (rank % IPV4_HOST_SPACE) as u32;
                format!("10.{}.{}.{}", (r >> 16) & 0xff, (r >> 8) & 0xff, r & 0xff)
            }
        }
    }
}

/// Ordered pool of metadata label suffixes. `num_extra_labels = k` takes the first `k` entries.
pub const METADATA_LABEL_POOL: &[MetadataLabel] = &[
    MetadataLabel::named("asserts__service", "service"),
    MetadataLabel {
        suffix: "node__ip",
        value: MetadataValue::Ipv4,
    },
    MetadataLabel::named("node__name", "name"),
    MetadataLabel::named("pod__name", "name"),
    MetadataLabel::named("container__name", "name"),
    MetadataLabel::named("namespace", "namespace"),
    MetadataLabel::named("availability_zone", "availability-zone"),
    MetadataLabel::named("region", "region"),
];

/// Builds the label set of series `rank` at tick `t`, sorted ascending by name.
///
/// Assumes `config` passed [`GenerationConfig::validate`]; an oversized `num_extra_labels`
/// would otherwise be capped at the pool size.
pub fn series_labels(rank: Rank, t: Timestamp, config: &GenerationConfig) -> Vec<Label> {
    let extra = config.num_extra_labels.min(METADATA_LABEL_POOL.len());
    let mut labels = Vec::with_capacity(3 + extra);

    labels.push(Label::new(METRIC_NAME_LABEL, METRIC_NAME));
    labels.push(Label::new(WAVE_LABEL, rank.to_string()));

    if let Some(id) = generation_id(rank, t, config.churn_period, config.num_series) {
        labels.push(Label::new(
            format!("{}{}", config.label_prefix, CHURN_LABEL_SUFFIX),
            id.to_string(),
        ));
    }

    for meta in &METADATA_LABEL_POOL[..extra] {
        labels.push(Label::new(
            format!("{}{}", config.label_prefix, meta.suffix),
            meta.value_for(rank),
        ));
    }

    // Remote-write receivers require label names in ascending order.
    labels.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    labels
}
