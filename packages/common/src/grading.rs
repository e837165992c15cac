use serde::{Deserialize, Serialize};

/// Component weights from a grade configuration, expressed as percentages.
///
/// Weights are validated to sum to 100 at configuration-create time, so a
/// composite of component scores in [0, 100] stays in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeWeights {
    pub reporting: f64,
    pub recitation: f64,
    pub quiz: f64,
}

impl GradeWeights {
    pub fn sum(&self) -> f64 {
        self.reporting + self.recitation + self.quiz
    }
}

/// Pass/fail label attached to a computed composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Remarks {
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "FAILED")]
    Failed,
    /// No underlying graded records exist for the student in the requested
    /// range. Distinct from a genuine failing score of 0.
    #[serde(rename = "NO GRADE")]
    NoGrade,
}

impl Remarks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Remarks::Passed => "PASSED",
            Remarks::Failed => "FAILED",
            Remarks::NoGrade => "NO GRADE",
        }
    }
}

impl std::fmt::Display for Remarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A computed composite score for one student in one course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Composite {
    pub reporting: f64,
    pub recitation: f64,
    pub quiz: f64,
    pub total: f64,
    pub remarks: Remarks,
}

/// Mean of a slice, 0.0 when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute the weighted composite and the pass/fail remark.
///
/// `total = reporting*wr/100 + recitation*wrc/100 + quiz*wq/100`, and the
/// boundary case `total == threshold` is a pass.
pub fn compute_composite(
    weights: GradeWeights,
    threshold: f64,
    reporting_avg: f64,
    recitation_avg: f64,
    quiz_avg: f64,
) -> Composite {
    let total = reporting_avg * weights.reporting / 100.0
        + recitation_avg * weights.recitation / 100.0
        + quiz_avg * weights.quiz / 100.0;
    let remarks = if total >= threshold {
        Remarks::Passed
    } else {
        Remarks::Failed
    };
    Composite {
        reporting: reporting_avg,
        recitation: recitation_avg,
        quiz: quiz_avg,
        total,
        remarks,
    }
}

/// Like [`compute_composite`], but a student with zero underlying records is
/// reported as `NO GRADE` rather than compared against the threshold.
pub fn compute_composite_for_records(
    weights: GradeWeights,
    threshold: f64,
    reporting_avg: f64,
    recitation_avg: f64,
    quiz_avg: f64,
    record_count: usize,
) -> Composite {
    let mut composite =
        compute_composite(weights, threshold, reporting_avg, recitation_avg, quiz_avg);
    if record_count == 0 {
        composite.remarks = Remarks::NoGrade;
    }
    composite
}
