//! Boundary-compliance policies, reports and safety labels.
//!
//! A [`ComplianceReport`] summarises how much of a route's sampled polyline
//! falls outside the territory. Whether that is acceptable depends on the
//! [`CompliancePolicy`] in force: a strict policy for accepting single legs,
//! a looser one while searching between candidates, and a display cutoff that
//! separates `warning` from `danger`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BoundaryAccuracy;

/// Upper bound (exclusive) of the fraction outside for a [`SafetyLabel::Safe`] route.
pub const SAFE_FRACTION_LIMIT: f64 = 0.03;

/// Lower bound (exclusive) of the fraction outside for a [`SafetyLabel::Danger`] route.
pub const DANGER_FRACTION_LIMIT: f64 = 0.10;

/// Pass threshold applied to a route's fraction of points outside the territory.
///
/// # Examples
/// ```
/// use waymark_core::CompliancePolicy;
///
/// let strict = CompliancePolicy::strict();
/// assert!(strict.accepts(0.02));
/// assert!(!strict.accepts(0.03));
/// assert!(CompliancePolicy::search().accepts(0.04));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompliancePolicy {
    pass_threshold: f64,
}

/// Errors returned by [`CompliancePolicy::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompliancePolicyError {
    /// The threshold was not a fraction in `(0, 1]`.
    #[error("pass threshold {threshold} must be within (0, 1]")]
    OutOfRange {
        /// Rejected threshold.
        threshold: f64,
    },
}

impl CompliancePolicy {
    /// Accept routes with less than 3% of sampled points outside.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            pass_threshold: SAFE_FRACTION_LIMIT,
        }
    }

    /// Accept routes with less than 5% outside while comparing candidates.
    #[must_use]
    pub const fn search() -> Self {
        Self {
            pass_threshold: 0.05,
        }
    }

    /// Accept routes with less than 10% outside; anything above is `danger`.
    #[must_use]
    pub const fn display() -> Self {
        Self {
            pass_threshold: DANGER_FRACTION_LIMIT,
        }
    }

    /// Build a policy with a custom threshold.
    ///
    /// # Errors
    /// Returns [`CompliancePolicyError::OutOfRange`] unless `0 < threshold <= 1`.
    pub const fn new(threshold: f64) -> Result<Self, CompliancePolicyError> {
        if threshold > 0.0 && threshold <= 1.0 {
            Ok(Self {
                pass_threshold: threshold,
            })
        } else {
            Err(CompliancePolicyError::OutOfRange { threshold })
        }
    }

    /// The configured threshold as a fraction.
    #[must_use]
    pub const fn pass_threshold(&self) -> f64 {
        self.pass_threshold
    }

    /// Whether a route with `fraction_outside` passes this policy.
    #[must_use]
    pub const fn accepts(&self, fraction_outside: f64) -> bool {
        fraction_outside < self.pass_threshold
    }
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Controls how densely a polyline is sampled during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Polylines with more points than this are sampled with `stride`.
    pub long_route_threshold: usize,
    /// Step between sampled points on long polylines.
    pub stride: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            long_route_threshold: 200,
            stride: 5,
        }
    }
}

impl SamplingPolicy {
    /// Step to use for a polyline of `len` points.
    ///
    /// A zero stride is treated as one.
    #[must_use]
    pub const fn step_for(&self, len: usize) -> usize {
        if len <= self.long_route_threshold || self.stride == 0 {
            1
        } else {
            self.stride
        }
    }
}

/// Coarse safety classification of a route for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLabel {
    /// Less than 3% outside.
    Safe,
    /// Between 3% and 10% outside.
    Warning,
    /// More than 10% outside.
    Danger,
}

impl SafetyLabel {
    /// Classify a fraction of points outside the territory.
    ///
    /// # Examples
    /// ```
    /// use waymark_core::SafetyLabel;
    ///
    /// assert_eq!(SafetyLabel::from_fraction(0.0), SafetyLabel::Safe);
    /// assert_eq!(SafetyLabel::from_fraction(0.05), SafetyLabel::Warning);
    /// assert_eq!(SafetyLabel::from_fraction(0.5), SafetyLabel::Danger);
    /// ```
    #[must_use]
    pub const fn from_fraction(fraction_outside: f64) -> Self {
        if fraction_outside < SAFE_FRACTION_LIMIT {
            Self::Safe
        } else if fraction_outside > DANGER_FRACTION_LIMIT {
            Self::Danger
        } else {
            Self::Warning
        }
    }
}

/// Result of testing a route polyline against the territory boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Number of points in the evaluated polyline.
    pub total_points: usize,
    /// Number of points actually tested.
    pub sampled_points: usize,
    /// Number of sampled points outside the territory.
    pub outside_points: usize,
    /// `outside_points / sampled_points`, or zero when nothing was sampled.
    pub fraction_outside: f64,
    /// Whether the route passed the policy it was evaluated under.
    pub is_valid: bool,
    /// Threshold of that policy.
    pub pass_threshold: f64,
    /// Human-readable warning for failing routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Accuracy tier of the boundary used for the evaluation.
    pub accuracy: BoundaryAccuracy,
}

impl ComplianceReport {
    /// Build a report from raw counts.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "point counts are far below f64's exact integer range"
    )]
    pub fn from_counts(
        total_points: usize,
        sampled_points: usize,
        outside_points: usize,
        policy: CompliancePolicy,
        accuracy: BoundaryAccuracy,
    ) -> Self {
        let fraction_outside = if sampled_points == 0 {
            0.0
        } else {
            outside_points as f64 / sampled_points as f64
        };
        let is_valid = policy.accepts(fraction_outside);
        let warning = (!is_valid).then(|| {
            format!(
                "Route crosses the border ({:.1}% of sampled points outside the territory)",
                fraction_outside * 100.0
            )
        });
        Self {
            total_points,
            sampled_points,
            outside_points,
            fraction_outside,
            is_valid,
            pass_threshold: policy.pass_threshold(),
            warning,
            accuracy,
        }
    }

    /// Fraction outside expressed as a percentage.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "percentage conversion")]
    pub const fn percentage_outside(&self) -> f64 {
        self.fraction_outside * 100.0
    }

    /// Display label derived from the fraction outside.
    #[must_use]
    pub const fn safety(&self) -> SafetyLabel {
        SafetyLabel::from_fraction(self.fraction_outside)
    }

    /// True when the boundary used was a fallback approximation.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.accuracy.is_degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn custom_policy_rejects_bad_thresholds(#[case] threshold: f64) {
        assert!(CompliancePolicy::new(threshold).is_err());
    }

    #[rstest]
    fn presets_are_ordered() {
        assert!(
            CompliancePolicy::strict().pass_threshold()
                < CompliancePolicy::search().pass_threshold()
        );
        assert!(
            CompliancePolicy::search().pass_threshold()
                < CompliancePolicy::display().pass_threshold()
        );
    }

    #[rstest]
    #[case(0.029, SafetyLabel::Safe)]
    #[case(0.03, SafetyLabel::Warning)]
    #[case(0.10, SafetyLabel::Warning)]
    #[case(0.101, SafetyLabel::Danger)]
    fn labels_follow_display_thresholds(#[case] fraction: f64, #[case] expected: SafetyLabel) {
        assert_eq!(SafetyLabel::from_fraction(fraction), expected);
    }

    #[rstest]
    fn failing_report_carries_warning() {
        let report = ComplianceReport::from_counts(
            10,
            10,
            2,
            CompliancePolicy::strict(),
            BoundaryAccuracy::Authoritative,
        );
        assert!(!report.is_valid);
        assert!((report.fraction_outside - 0.2).abs() < 1e-12);
        let warning = report.warning.expect("failing report should warn");
        assert!(warning.contains("20.0%"), "unexpected warning {warning}");
    }

    #[rstest]
    fn empty_sample_is_valid() {
        let report = ComplianceReport::from_counts(
            0,
            0,
            0,
            CompliancePolicy::strict(),
            BoundaryAccuracy::CoarsePolygon,
        );
        assert!(report.is_valid);
        assert!(report.warning.is_none());
        assert!(report.is_degraded());
    }

    #[rstest]
    #[case(200, 1)]
    #[case(201, 5)]
    fn sampling_stride_kicks_in_above_threshold(#[case] len: usize, #[case] step: usize) {
        assert_eq!(SamplingPolicy::default().step_for(len), step);
    }
}
