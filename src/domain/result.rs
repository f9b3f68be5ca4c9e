//! Classification results.

use serde::Serialize;
use std::fmt;

/// Diagnosis label produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    Benign,
    Malignant,
}

impl Label {
    /// Class names in model output order.
    pub const CLASS_NAMES: [Label; 2] = [Label::Benign, Label::Malignant];

    /// The label for a score-vector index. Indices past the known classes are benign.
    pub fn from_class_index(index: usize) -> Self {
        Self::CLASS_NAMES
            .get(index)
            .copied()
            .unwrap_or(Label::Benign)
    }

    /// The label as displayed to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Benign => "Benign",
            Label::Malignant => "Malignant",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical outcome of classifying one image.
///
/// `confidence_value` is the probability mass of the chosen label, which is not
/// necessarily the probability of malignancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// The chosen label.
    pub label: Label,
    /// Probability assigned to `label`, in [0.0, 1.0].
    pub confidence_value: f64,
    /// `confidence_value` as a percentage with one decimal and a `%` sign.
    pub confidence: String,
    /// `confidence_value` as a percentage with one decimal, no sign.
    pub prediction_score: String,
}

impl ClassificationResult {
    /// Builds a result, deriving both display strings from `confidence_value`.
    pub fn new(label: Label, confidence_value: f64) -> Self {
        let percent = confidence_value * 100.0;
        Self {
            label,
            confidence_value,
            confidence: format!("{percent:.1}%"),
            prediction_score: format!("{percent:.1}"),
        }
    }
}
