//! Sample data model.
//!
//! Defines the label set and sample structures the metrics generator hands
//! to the time-series storage layer. A sample is one `(labels, timestamp,
//! value)` point; labels are an ordered list of name/value pairs following
//! the usual time-series conventions (`__name__` for the metric name, `le`
//! for histogram bucket bounds).

use serde::{Deserialize, Serialize};

/// The reserved label carrying the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// The reserved label carrying a histogram bucket's upper bound.
pub const BUCKET_BOUND_LABEL: &str = "le";

/// A single label: one dimension of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The label name.
    pub name: String,
    /// The label value.
    pub value: String,
}

impl Label {
    /// Creates a new label.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered set of labels identifying one time series.
///
/// Order is preserved as given; the generator relies on this to keep the
/// identity dimensions of a series stable across emissions.
///
/// # Example
///
/// ```
/// use shared::models::{Labels, METRIC_NAME_LABEL};
///
/// let labels = Labels::new()
///     .with_label("service", "api")
///     .with_label(METRIC_NAME_LABEL, "tracelight_calls_total");
///
/// assert_eq!(labels.get("service"), Some("api"));
/// assert_eq!(labels.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Labels(Vec<Label>);

impl Labels {
    /// Creates an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label.
    #[must_use]
    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a label in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Label::new(name, value));
    }

    /// Returns the value of the first label with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single time-series sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The labels identifying the series this sample belongs to.
    pub labels: Labels,

    /// Sample timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// The sample value.
    pub value: f64,
}

impl Sample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(labels: Labels, timestamp_ms: i64, value: f64) -> Self {
        Self {
            labels,
            timestamp_ms,
            value,
        }
    }

    /// Returns the metric name from the `__name__` label, if present.
    #[must_use]
    pub fn metric_name(&self) -> Option<&str> {
        self.labels.get(METRIC_NAME_LABEL)
    }
}
