//! Adapting assembled vectors to an artifact's declared input width.

use serde::{Deserialize, Serialize};

/// What the reconciler did to a vector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WidthAdjustment {
    Unchanged,
    /// Trailing elements dropped
    Cropped { from: usize, to: usize },
    /// Trailing zeros appended
    Padded { from: usize, to: usize },
}

/// Crops or zero-pads vectors to a fixed width. Never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionReconciler {
    expected: usize,
}

impl DimensionReconciler {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    pub fn expected_width(&self) -> usize {
        self.expected
    }

    /// What reconciling a vector of `width` elements would do.
    pub fn adjustment(&self, width: usize) -> WidthAdjustment {
        let to = self.expected;
        if width > to {
            WidthAdjustment::Cropped { from: width, to }
        } else if width < to {
            WidthAdjustment::Padded { from: width, to }
        } else {
            WidthAdjustment::Unchanged
        }
    }

    /// Reconcile `values` to the expected width, keeping the leading prefix.
    pub fn reconcile(&self, mut values: Vec<f32>) -> (Vec<f32>, WidthAdjustment) {
        let adjustment = self.adjustment(values.len());

        match adjustment {
            WidthAdjustment::Cropped { from, to } => {
                values.truncate(to);
                tracing::warn!(
                    features = from,
                    expected = to,
                    "Feature vector wider than model input, cropping"
                );
            }
            WidthAdjustment::Padded { from, to } => {
                values.resize(to, 0.0);
                tracing::warn!(
                    features = from,
                    expected = to,
                    "Feature vector narrower than model input, padding with zeros"
                );
            }
            WidthAdjustment::Unchanged => {}
        }

        (values, adjustment)
    }
}

impl WidthAdjustment {
    /// Caller-facing description, `None` when nothing changed.
    pub fn note(&self) -> Option<String> {
        match self {
            WidthAdjustment::Unchanged => None,
            WidthAdjustment::Cropped { from, to } => Some(format!(
                "Feature vector cropped from {} to {} inputs to fit the scoring model",
                from, to
            )),
            WidthAdjustment::Padded { from, to } => Some(format!(
                "Feature vector padded from {} to {} inputs to fit the scoring model",
                from, to
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        let (v, adj) = DimensionReconciler::new(3).reconcile(vec![1.0, 2.0, 3.0]);
        assert_eq!(v, vec![1.0, 2.0, 3.0]);
        assert_eq!(adj, WidthAdjustment::Unchanged);
    }

    #[test]
    fn test_crop_keeps_prefix() {
        let input: Vec<f32> = (0..120).map(|i| i as f32).collect();
        let (v, adj) = DimensionReconciler::new(106).reconcile(input.clone());
        assert_eq!(v, &input[..106]);
        assert_eq!(adj, WidthAdjustment::Cropped { from: 120, to: 106 });
    }

    #[test]
    fn test_pad_with_zeros() {
        let (v, adj) = DimensionReconciler::new(5).reconcile(vec![0.5, 0.25]);
        assert_eq!(v, vec![0.5, 0.25, 0.0, 0.0, 0.0]);
        assert_eq!(adj, WidthAdjustment::Padded { from: 2, to: 5 });
    }

    #[test]
    fn test_adjustment_notes() {
        let reconciler = DimensionReconciler::new(106);
        assert_eq!(reconciler.adjustment(106).note(), None);
        assert_eq!(
            reconciler.adjustment(109).note().unwrap(),
            "Feature vector cropped from 109 to 106 inputs to fit the scoring model"
        );
        assert_eq!(
            reconciler.adjustment(100),
            WidthAdjustment::Padded { from: 100, to: 106 }
        );
    }

    #[test]
    fn test_zero_width() {
        let (v, _) = DimensionReconciler::new(0).reconcile(vec![1.0]);
        assert!(v.is_empty());
    }
}
