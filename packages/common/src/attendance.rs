use serde::{Deserialize, Serialize};

/// Status of a single attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Excused => "excused",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Some(AttendanceStatus::Present),
            "late" => Some(AttendanceStatus::Late),
            "absent" => Some(AttendanceStatus::Absent),
            "excused" => Some(AttendanceStatus::Excused),
            _ => None,
        }
    }
}

/// Per-student record counts within a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct AttendanceCounts {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub excused: u64,
}

impl AttendanceCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }
}

/// Attendance rate as a percentage: `(present + late) / total_classes * 100`.
///
/// `total_classes` is the number of distinct class dates in the range; when it
/// is 0 the rate is 0 regardless of record counts.
pub fn attendance_rate(counts: AttendanceCounts, total_classes: u64) -> f64 {
    if total_classes == 0 {
        return 0.0;
    }
    (counts.present + counts.late) as f64 / total_classes as f64 * 100.0
}
