use serde::Serialize;

/// Timestamp type (milliseconds since epoch, signed so pre-epoch instants floor correctly).
pub type Timestamp = i64;

/// Value type.
pub type Value = f64;

/// Series rank (the "wave" identity), 1-indexed.
pub type Rank = usize;

/// A single name/value label attached to a series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Label {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One sampled value at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: Value,
}

/// A generated series: labels sorted ascending by name plus its samples for the tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub labels: Vec<Label>,
    pub samples: Vec<Sample>,
}

impl TimeSeries {
    /// Returns the value of the label with the given name, if present.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .binary_search_by(|l| l.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.labels[idx].value.as_str())
    }

    /// Returns true if label names are strictly increasing (sorted and unique).
    pub fn labels_sorted(&self) -> bool {
        self.labels.windows(2).all(|w| w[0].name < w[1].name)
    }
}
