//! Wire types for the attendance endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Derived work status for a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Present,
    Partial,
    Absent,
}

impl WorkStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Partial => "partial",
            Self::Absent => "absent",
        }
    }

    pub(crate) fn from_str(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "partial" => Some(Self::Partial),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Hours required for a day to count as fully present.
pub(crate) const FULL_DAY_HOURS: f64 = 8.0;

/// How many days back `GET /attendance/mine` reaches.
pub(crate) const RECENT_WINDOW_DAYS: u64 = 7;

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub day: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: WorkStatus,
    pub hours_worked: f64,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub message: String,
    pub check_in_time: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutResponse {
    pub message: String,
    pub check_out_time: DateTime<Utc>,
    pub hours_worked: f64,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyAttendanceResponse {
    pub today: Option<AttendanceRecord>,
    pub recent: Vec<AttendanceRecord>,
}

/// Identity summary joined onto admin log rows.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub job_title: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLogRow {
    pub day: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: WorkStatus,
    pub hours_worked: f64,
    pub user: OwnerSummary,
}

/// Admin log filters. `all` is accepted as "no filter" for employee and
/// status.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LogsQuery {
    pub employee: Option<String>,
    pub day: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::TimeZone;

    #[test]
    fn test_work_status_round_trips_lowercase() -> Result<()> {
        for (status, text) in [
            (WorkStatus::Present, "present"),
            (WorkStatus::Partial, "partial"),
            (WorkStatus::Absent, "absent"),
        ] {
            assert_eq!(status.as_str(), text);
            assert_eq!(WorkStatus::from_str(text), Some(status));
            assert_eq!(serde_json::to_value(status)?, serde_json::json!(text));
        }
        assert_eq!(WorkStatus::from_str("late"), None);
        Ok(())
    }

    #[test]
    fn test_attendance_record_serializes_camel_case() -> Result<()> {
        let check_in = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).single();
        let record = AttendanceRecord {
            day: NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date"),
            check_in,
            check_out: None,
            status: WorkStatus::Present,
            hours_worked: 0.0,
        };
        let value = serde_json::to_value(&record)?;
        assert!(value.get("checkIn").is_some());
        assert!(value.get("checkOut").is_some());
        assert!(value.get("hoursWorked").is_some());
        assert_eq!(value["status"], serde_json::json!("present"));
        Ok(())
    }

    #[test]
    fn test_check_out_response_keys() -> Result<()> {
        let response = CheckOutResponse {
            message: "Checked out successfully".to_string(),
            check_out_time: Utc.with_ymd_and_hms(2025, 8, 1, 17, 30, 0).single().expect("valid"),
            hours_worked: 8.5,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("checkOutTime").is_some());
        assert_eq!(value["hoursWorked"], serde_json::json!(8.5));
        Ok(())
    }
}
